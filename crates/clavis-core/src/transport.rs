//! Transport state machine.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    #[default]
    Stopped,
    Rolling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    Play,
    Stop,
    /// The scheduler reported completion
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    None,
    MotionChanged(MotionState),
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct TransportFSM {
    motion: MotionState,
}

impl TransportFSM {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transition(&mut self, event: TransportEvent) -> TransitionResult {
        use TransportEvent::*;

        match (event, self.motion) {
            // Play while rolling restarts; the caller resets the scheduler
            (Play, _) => {
                self.motion = MotionState::Rolling;
                TransitionResult::MotionChanged(MotionState::Rolling)
            }
            (Stop, MotionState::Rolling) => {
                self.motion = MotionState::Stopped;
                TransitionResult::MotionChanged(MotionState::Stopped)
            }
            (Finish, MotionState::Rolling) => {
                self.motion = MotionState::Stopped;
                TransitionResult::Finished
            }
            (Stop | Finish, MotionState::Stopped) => TransitionResult::None,
        }
    }

    pub fn motion(&self) -> MotionState {
        self.motion
    }

    pub fn is_rolling(&self) -> bool {
        self.motion == MotionState::Rolling
    }
}
