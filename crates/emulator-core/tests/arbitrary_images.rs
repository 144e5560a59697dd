//! Arbitrary byte images never panic the machine or the disassembler.

use log as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use tempfile as _;
use thiserror as _;

use proptest::prelude::*;
use qproc_core::{
    disassemble, EmulatorConfig, Host, Machine, ProgramImage, RunBoundary, ScriptedConsole,
    PROGRAM_MEMORY_BYTES,
};

fn bounded_config() -> EmulatorConfig {
    EmulatorConfig {
        max_steps: Some(2_000),
        data_stack_capacity: 64,
        instruction_stack_capacity: 64,
    }
}

proptest! {
    #[test]
    fn machine_stops_cleanly_on_any_image(
        bytes in proptest::collection::vec(any::<u8>(), 0..256),
        inputs in proptest::collection::vec(any::<i32>(), 0..8),
    ) {
        let image = ProgramImage::from_bytes(bytes).expect("small image fits");
        let mut machine = Machine::new(&image, bounded_config());
        let mut console = ScriptedConsole::new(inputs);

        match machine.run(&mut Host::new(&mut console)) {
            Ok(outcome) => {
                prop_assert!(outcome.steps <= 2_000);
                if outcome.boundary == RunBoundary::StepLimit {
                    prop_assert_eq!(outcome.steps, 2_000);
                }
            }
            Err(fault) => {
                prop_assert!(fault.address < PROGRAM_MEMORY_BYTES);
                prop_assert_eq!(fault.snapshot, machine.snapshot());
                prop_assert!(machine.data_stack().len() <= 64);
            }
        }
    }

    #[test]
    fn disassembly_rows_tile_the_image(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        if let Ok(rows) = disassemble(&bytes) {
            let mut expected = 0;
            for row in &rows {
                prop_assert_eq!(row.addr, expected);
                expected += row.encoded_len();
            }
            prop_assert!(expected <= bytes.len());
        }
    }

    #[test]
    fn addition_matches_wrapping_add(x in any::<i32>(), y in any::<i32>()) {
        let mut bytes = vec![0x0D];
        bytes.extend_from_slice(&x.to_be_bytes());
        bytes.push(0x0D);
        bytes.extend_from_slice(&y.to_be_bytes());
        bytes.extend_from_slice(&[0x01, 0x16]);
        let image = ProgramImage::from_bytes(bytes).expect("fits");
        let mut machine = Machine::new(&image, EmulatorConfig::default());
        let mut console = ScriptedConsole::default();

        machine.run(&mut Host::new(&mut console)).expect("halts");
        prop_assert_eq!(machine.data_stack().as_slice(), &[x.wrapping_add(y)]);
    }
}
