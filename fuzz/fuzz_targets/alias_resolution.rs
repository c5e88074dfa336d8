#![no_main]

use ferrous_container::{Concrete, Container, DiError};
use libfuzzer_sys::fuzz_target;

const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

// Each byte pair drives one operation; resolution must never panic and
// alias cycles must surface as errors rather than hangs.
fuzz_target!(|data: &[u8]| {
    let container = Container::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 5;
        let first = NAMES[(pair[0] as usize / 5) % NAMES.len()];
        let second = NAMES[pair[1] as usize % NAMES.len()];

        match op {
            0 => {
                let _ = container.bind(first, Concrete::value(pair[1]), pair[1] % 2 == 0);
            }
            1 => {
                let _ = container.bind(first, second, false);
            }
            2 => {
                if let Err(DiError::SelfAlias(_)) = container.alias(first, second) {
                    assert_eq!(first, second);
                }
            }
            3 => {
                if let Ok(value) = container.make(first) {
                    assert!(value.is::<u8>());
                }
            }
            _ => {
                container.forget_instance(first);
            }
        }
    }
});
