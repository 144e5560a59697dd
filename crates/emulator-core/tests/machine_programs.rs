//! Whole programs, written as raw bytes, run on the machine.

use log as _;
use proptest as _;
#[cfg(feature = "serde")]
use serde as _;
use tempfile as _;
use thiserror as _;

use std::io::Cursor;

use qproc_core::{
    EmulatorConfig, FaultCode, FrameCapture, Host, Machine, Opcode, ProgramImage, Rgb,
    RunBoundary, RunState, ScriptedConsole, StdConsole, FRAME_BUFFER_START,
    PROGRAM_MEMORY_BYTES,
};
use rstest::rstest;

fn push(value: i32) -> Vec<u8> {
    let mut bytes = vec![Opcode::Push.as_u8()];
    bytes.extend_from_slice(&value.to_be_bytes());
    bytes
}

fn program(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

fn machine(bytes: Vec<u8>) -> Machine {
    let image = ProgramImage::from_bytes(bytes).expect("image fits");
    Machine::new(&image, EmulatorConfig::default())
}

const HALT: u8 = 0x16;

#[test]
fn subtraction_is_first_pushed_minus_second() {
    let mut machine = machine(program(&[&push(5), &push(3), &[0x02, HALT]]));
    let mut console = ScriptedConsole::default();

    let outcome = machine
        .run(&mut Host::new(&mut console))
        .expect("program halts");

    assert_eq!(outcome.boundary, RunBoundary::Halted);
    assert_eq!(machine.data_stack().top(), Some(2));
}

// PUSH tested, PUSH 17, Jx, PUSH 99, HALT, 17: HALT
#[rstest]
#[case::jz_zero_jumps(0x0B, 0, &[])]
#[case::jz_nonzero_falls_through(0x0B, 1, &[99])]
#[case::jnz_nonzero_jumps(0x0C, -4, &[])]
#[case::jnz_zero_falls_through(0x0C, 0, &[99])]
fn conditional_jump_boundary(#[case] opcode: u8, #[case] tested: i32, #[case] expected: &[i32]) {
    let bytes = program(&[&push(tested), &push(17), &[opcode], &push(99), &[HALT, HALT]]);
    let mut machine = machine(bytes);
    let mut console = ScriptedConsole::default();

    machine
        .run(&mut Host::new(&mut console))
        .expect("program halts");

    assert_eq!(machine.data_stack().as_slice(), expected);
    let halted_at = if expected.is_empty() { 18 } else { 17 };
    assert_eq!(machine.ip(), halted_at);
}

#[test]
fn call_sequence_returns_after_the_jump() {
    // 0: PUSH 12, PUSHIP, PUSH 13, JMP ; 12: HALT ; 13: PUSH 7, POPIP
    let bytes = program(&[&push(12), &[0x0F], &push(13), &[0x0A, HALT], &push(7), &[0x10]]);
    let mut machine = machine(bytes);
    let mut console = ScriptedConsole::default();

    let outcome = machine
        .run(&mut Host::new(&mut console))
        .expect("program halts");

    assert_eq!(outcome.boundary, RunBoundary::Halted);
    assert_eq!(machine.ip(), 13);
    assert_eq!(machine.data_stack().as_slice(), &[7]);
    assert!(machine.instruction_stack().is_empty());
}

#[test]
fn empty_data_stack_fault_names_instruction_zero() {
    let mut machine = machine(vec![0x01]);
    let mut console = ScriptedConsole::default();

    let fault = machine
        .run(&mut Host::new(&mut console))
        .expect_err("ADD on empty stack faults");

    assert_eq!(fault.code, FaultCode::DataStackUnderflow);
    assert_eq!(fault.address, 0);
    assert_eq!(
        fault.to_string(),
        "attempted to pop empty data stack ; instruction #0"
    );
}

#[test]
fn words_round_trip_through_program_memory() {
    let bytes = program(&[&push(100), &push(-5), &[0x13], &push(100), &[0x12, HALT]]);
    let mut machine = machine(bytes);
    let mut console = ScriptedConsole::default();

    machine
        .run(&mut Host::new(&mut console))
        .expect("program halts");

    assert_eq!(machine.data_stack().as_slice(), &[-5]);
    assert_eq!(
        &machine.memory().as_slice()[100..104],
        &[0xFF, 0xFF, 0xFF, 0xFB]
    );
}

#[rstest]
#[case::negative(-1)]
#[case::last_partial_window(PROGRAM_MEMORY_BYTES as i32 - 3)]
#[case::past_the_end(PROGRAM_MEMORY_BYTES as i32)]
fn pushpm_rejects_addresses_outside_memory(#[case] addr: i32) {
    let bytes = program(&[&push(addr), &[0x12]]);
    let mut machine = machine(bytes);
    let mut console = ScriptedConsole::default();

    let fault = machine
        .run(&mut Host::new(&mut console))
        .expect_err("out-of-bounds read faults");

    assert_eq!(
        fault.code,
        FaultCode::AddressOutOfBounds {
            address: i64::from(addr)
        }
    );
    assert_eq!(fault.address, 5);
}

#[test]
fn last_full_word_is_addressable() {
    let last = PROGRAM_MEMORY_BYTES as i32 - 4;
    let bytes = program(&[&push(last), &push(9), &[0x13], &push(last), &[0x12, HALT]]);
    let mut machine = machine(bytes);
    let mut console = ScriptedConsole::default();

    machine
        .run(&mut Host::new(&mut console))
        .expect("program halts");

    assert_eq!(machine.data_stack().as_slice(), &[9]);
}

#[test]
fn input_values_are_added_and_peeked() {
    let bytes = vec![0x14, 0x14, 0x01, 0x15, HALT];
    let mut machine = machine(bytes);
    let mut console = ScriptedConsole::new([4, 5]);

    machine
        .run(&mut Host::new(&mut console))
        .expect("program halts");

    assert_eq!(console.outputs(), &[9]);
    assert_eq!(machine.data_stack().as_slice(), &[9]);
}

#[test]
fn malformed_input_faults() {
    let mut machine = machine(vec![0x14, HALT]);
    let mut console = StdConsole::new(Cursor::new("twelve\n"), Vec::new());

    let fault = machine
        .run(&mut Host::new(&mut console))
        .expect_err("non-numeric input faults");

    assert_eq!(fault.code, FaultCode::MalformedInput);
    assert!(machine.data_stack().is_empty());
}

#[test]
fn peek_on_empty_stack_faults() {
    let mut machine = machine(vec![0x15]);
    let mut console = ScriptedConsole::default();

    let fault = machine
        .run(&mut Host::new(&mut console))
        .expect_err("nothing to peek");

    assert_eq!(fault.code, FaultCode::DataStackUnderflow);
    assert!(console.outputs().is_empty());
}

#[test]
fn stack_capacity_is_enforced() {
    let image = ProgramImage::from_bytes(program(&[&push(1), &push(2), &[HALT]])).expect("fits");
    let config = EmulatorConfig {
        data_stack_capacity: 1,
        ..EmulatorConfig::default()
    };
    let mut machine = Machine::new(&image, config);
    let mut console = ScriptedConsole::default();

    let fault = machine
        .run(&mut Host::new(&mut console))
        .expect_err("second push overflows");

    assert_eq!(fault.code, FaultCode::StackOverflow);
    assert_eq!(fault.address, 5);
    assert_eq!(fault.snapshot.data_stack, vec![1]);
}

#[test]
fn unknown_opcode_faults_at_its_address() {
    let mut machine = machine(vec![0x00, 0x17]);
    let mut console = ScriptedConsole::default();

    let fault = machine
        .run(&mut Host::new(&mut console))
        .expect_err("0x17 is not an instruction");

    assert_eq!(fault.code, FaultCode::UnknownOpcode(0x17));
    assert_eq!(fault.address, 1);
}

#[test]
fn push_without_room_for_operand_faults() {
    let target = PROGRAM_MEMORY_BYTES - 2;
    let mut bytes = program(&[&push(i32::try_from(target).expect("fits i32")), &[0x0A]]);
    bytes.resize(target, 0);
    bytes.push(Opcode::Push.as_u8());
    let mut machine = machine(bytes);
    let mut console = ScriptedConsole::default();

    let fault = machine
        .run(&mut Host::new(&mut console))
        .expect_err("operand is cut off by the end of memory");

    assert_eq!(fault.code, FaultCode::TruncatedOperand);
    assert_eq!(fault.address, target);
}

#[test]
fn popip_to_address_outside_memory_faults() {
    let bytes = program(&[&push(PROGRAM_MEMORY_BYTES as i32), &[0x0F, 0x10]]);
    let mut machine = machine(bytes);
    let mut console = ScriptedConsole::default();

    let fault = machine
        .run(&mut Host::new(&mut console))
        .expect_err("return address is out of bounds");

    assert!(matches!(fault.code, FaultCode::AddressOutOfBounds { .. }));
    assert_eq!(fault.address, 6);
    assert_eq!(fault.snapshot.instruction_stack, vec![PROGRAM_MEMORY_BYTES]);
}

#[test]
fn rmip_on_empty_instruction_stack_faults() {
    let mut machine = machine(vec![0x11]);
    let mut console = ScriptedConsole::default();

    let fault = machine
        .run(&mut Host::new(&mut console))
        .expect_err("nothing to discard");

    assert_eq!(fault.code, FaultCode::InstructionStackUnderflow);
    assert_eq!(
        machine.run_state(),
        RunState::FaultLatched(FaultCode::InstructionStackUnderflow)
    );
}

#[test]
fn frame_buffer_writes_are_visible_to_the_display() {
    let start = i32::try_from(FRAME_BUFFER_START).expect("fits i32");
    // Pixel (0,0) = bright white, pixel (1,0) = red.
    let bytes = program(&[&push(start), &push(0x0F04_0000), &[0x13, HALT]]);
    let mut machine = machine(bytes);
    let mut console = ScriptedConsole::default();
    let mut frames = FrameCapture::default();

    machine
        .run(&mut Host::new(&mut console).with_frame(&mut frames))
        .expect("program halts");

    let frame = frames.last_frame().expect("a frame was presented");
    assert_eq!(frame.pixel(0, 0), Some(Rgb { r: 0xFF, g: 0xFF, b: 0xFF }));
    assert_eq!(frame.pixel(1, 0), Some(Rgb { r: 0xAA, g: 0, b: 0 }));
    assert_eq!(frame.pixel(2, 0), Some(Rgb::default()));
    assert_eq!(frames.presented(), 4);
}
