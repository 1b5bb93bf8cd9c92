//! Random input sequences against the engine's voice bookkeeping.

use crate::helpers::*;
use clavis::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Input(InputEvent),
    /// Let playback time pass, then tick
    Wait(u64),
    Play,
    Stop,
}

fn step() -> impl Strategy<Value = Step> {
    let key = prop::sample::select(vec!['a', 'w', 's', 'd', 'k', 'z']);
    prop_oneof![
        3 => key.clone().prop_map(|k| Step::Input(InputEvent::KeyDown(k))),
        3 => key.prop_map(|k| Step::Input(InputEvent::KeyUp(k))),
        1 => Just(Step::Input(InputEvent::PedalDown)),
        1 => Just(Step::Input(InputEvent::PedalUp)),
        2 => (0.0f32..150.0, 0.0f32..110.0)
            .prop_map(|(x, y)| Step::Input(InputEvent::PointerDown { x, y })),
        1 => Just(Step::Input(InputEvent::PointerUp)),
        2 => (0u64..800).prop_map(Step::Wait),
        1 => Just(Step::Play),
        1 => Just(Step::Stop),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn voices_are_accounted_for(steps in prop::collection::vec(step(), 0..60)) {
        let (mut engine, audio, clock) = test_engine();
        engine.load_sequence(two_note_sequence());

        for step in steps {
            match step {
                Step::Input(event) => {
                    let pedal_up = event == InputEvent::PedalUp;
                    engine.handle_input(event).unwrap();
                    if pedal_up {
                        prop_assert_eq!(engine.sustained_notes().count(), 0);
                    }
                }
                Step::Wait(ms) => {
                    clock.advance(ms);
                    engine.tick();
                }
                Step::Play => engine.play().unwrap(),
                Step::Stop => engine.stop(),
            }

            let tracked = engine.channels().held_count() + engine.channels().sustained_count();
            prop_assert_eq!(audio.sounding().len(), tracked);
            prop_assert_eq!(audio.leaked(), 0);
        }

        drop(engine);
        prop_assert_eq!(audio.leaked(), 0);
        prop_assert!(audio.sounding().is_empty());
    }
}
