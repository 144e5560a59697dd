//! Instruction execution pipeline.
//!
//! Execution is split in two phases. [`execute_instruction`] reads operands
//! without popping them, validates every address and checks stack room, and
//! describes the instruction's effects in an [`ExecuteState`].
//! [`commit_execution`] then applies those effects. A fault is raised only
//! from the first phase, so a faulting instruction leaves stacks, memory and
//! IP exactly as they were.

mod helpers;

pub use helpers::{shift_left, shift_right, BinaryOp, UnaryOp};

use crate::api::Console;
use crate::decoder::DecodedInstruction;
use crate::encoding::Opcode;
use crate::machine::Machine;
use crate::memory::{validate_code_address, validate_word_address};
use crate::state::BoundedStack;
use crate::FaultCode;

/// Pending change to the instruction stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnStackOp {
    /// Instruction stack untouched.
    #[default]
    None,
    /// Push this return address.
    Push(usize),
    /// Discard the top entry.
    Pop,
}

/// Side effects of one instruction, computed before anything is mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteState {
    /// Entries to pop from the data stack.
    pub data_pops: usize,
    /// Value to push after popping.
    pub data_push: Option<i32>,
    /// Instruction stack update.
    pub return_op: ReturnStackOp,
    /// Big-endian word store as `(address, value)`.
    pub memory_write: Option<(usize, i32)>,
    /// Address of the next instruction.
    pub next_ip: usize,
    /// `HALT` retired.
    pub halt: bool,
}

impl ExecuteState {
    /// Effects of an instruction that only advances IP.
    #[must_use]
    pub const fn advance(next_ip: usize) -> Self {
        Self {
            data_pops: 0,
            data_push: None,
            return_op: ReturnStackOp::None,
            memory_write: None,
            next_ip,
            halt: false,
        }
    }
}

/// Computes the effects of `instr`, located at the machine's current IP.
///
/// `INPUT` and `PEEK` talk to `console` during this phase, after every other
/// check for the instruction has passed.
///
/// # Errors
///
/// Returns the [`FaultCode`] the instruction raises. No machine state has
/// changed when this happens.
pub fn execute_instruction(
    instr: &DecodedInstruction,
    machine: &Machine,
    console: &mut dyn Console,
) -> Result<ExecuteState, FaultCode> {
    let data = machine.data_stack();
    let next_ip = machine.ip() + instr.len;
    let mut exec = ExecuteState::advance(next_ip);

    match instr.opcode {
        Opcode::Add
        | Opcode::Sub
        | Opcode::Shl
        | Opcode::Shr
        | Opcode::And
        | Opcode::Or
        | Opcode::Xor => {
            let y = operand(data, 0)?;
            let x = operand(data, 1)?;
            exec.data_pops = 2;
            exec.data_push = BinaryOp::from_opcode(instr.opcode).map(|op| op.apply(x, y));
        }
        Opcode::Neg | Opcode::Not => {
            let x = operand(data, 0)?;
            exec.data_pops = 1;
            exec.data_push = UnaryOp::from_opcode(instr.opcode).map(|op| op.apply(x));
        }
        Opcode::Nop => {}
        Opcode::Halt => exec.halt = true,
        Opcode::Jmp => {
            let target = operand(data, 0)?;
            exec.data_pops = 1;
            exec.next_ip = validate_code_address(i64::from(target))?;
        }
        Opcode::Jz | Opcode::Jnz => {
            let target = operand(data, 0)?;
            let tested = operand(data, 1)?;
            let target = validate_code_address(i64::from(target))?;
            exec.data_pops = 2;
            if (tested == 0) == (instr.opcode == Opcode::Jz) {
                exec.next_ip = target;
            }
        }
        Opcode::Push => {
            ensure_room(data, 0, 1)?;
            exec.data_push = Some(instr.operand.ok_or(FaultCode::TruncatedOperand)?);
        }
        Opcode::Rm => {
            operand(data, 0)?;
            exec.data_pops = 1;
        }
        Opcode::PushIp => {
            let target = operand(data, 0)?;
            let target = usize::try_from(target).map_err(|_| FaultCode::AddressOutOfBounds {
                address: i64::from(target),
            })?;
            ensure_room(machine.instruction_stack(), 0, 1)?;
            exec.data_pops = 1;
            exec.return_op = ReturnStackOp::Push(target);
        }
        Opcode::PopIp => {
            let target = machine
                .instruction_stack()
                .top()
                .ok_or(FaultCode::InstructionStackUnderflow)?;
            exec.next_ip = validate_code_address(i64::try_from(target).unwrap_or(i64::MAX))?;
            exec.return_op = ReturnStackOp::Pop;
        }
        Opcode::RmIp => {
            if machine.instruction_stack().is_empty() {
                return Err(FaultCode::InstructionStackUnderflow);
            }
            exec.return_op = ReturnStackOp::Pop;
        }
        Opcode::PushPm => {
            let raw = operand(data, 0)?;
            let addr = validate_word_address(i64::from(raw))?;
            let value = machine
                .memory()
                .read_word(addr)
                .ok_or(FaultCode::AddressOutOfBounds {
                    address: i64::from(raw),
                })?;
            exec.data_pops = 1;
            exec.data_push = Some(value);
        }
        Opcode::PopPm => {
            let value = operand(data, 0)?;
            let addr = operand(data, 1)?;
            let addr = validate_word_address(i64::from(addr))?;
            exec.data_pops = 2;
            exec.memory_write = Some((addr, value));
        }
        Opcode::Input => {
            ensure_room(data, 0, 1)?;
            let value = console
                .read_value()
                .map_err(|_| FaultCode::MalformedInput)?;
            exec.data_push = Some(value);
        }
        Opcode::Peek => {
            let top = operand(data, 0)?;
            console
                .write_value(top)
                .map_err(|_| FaultCode::OutputFailed)?;
        }
    }

    Ok(exec)
}

/// Applies the effects described by `exec`.
///
/// Only call this with a state returned by [`execute_instruction`] for the
/// machine's current instruction.
pub fn commit_execution(machine: &mut Machine, exec: &ExecuteState) {
    machine.commit(exec);
}

fn operand(data: &BoundedStack<i32>, depth: usize) -> Result<i32, FaultCode> {
    data.peek(depth).ok_or(FaultCode::DataStackUnderflow)
}

fn ensure_room<T: Copy>(stack: &BoundedStack<T>, pops: usize, count: usize) -> Result<(), FaultCode> {
    if stack.has_room(pops, count) {
        Ok(())
    } else {
        Err(FaultCode::StackOverflow)
    }
}
