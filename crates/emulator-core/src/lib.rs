//! Core crate for the QProc stack computer: opcode table, program images,
//! the machine and the disassembler.

/// Program memory and fixed frame-buffer layout.
pub mod memory;
pub use memory::{
    read_i32_be, validate_code_address, validate_word_address, write_i32_be, ProgramMemory,
    FRAME_BUFFER_BYTES, FRAME_BUFFER_START, FRAME_HEIGHT, FRAME_WIDTH, PROGRAM_MEMORY_BYTES,
    WORD_BYTES,
};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    Console, ConsoleError, EmulatorConfig, FrameSink, Host, RunBoundary, RunOutcome, StepOutcome,
    TraceEvent, TraceSink,
};

/// Stacks, run state and snapshots.
pub mod state;
pub use state::{BoundedStack, MachineSnapshot, RunState, DEFAULT_STACK_CAPACITY};

/// The closed opcode table.
pub mod encoding;
pub use encoding::{Opcode, OPCODE_COUNT, OPCODE_TABLE, OPERAND_BYTES};

/// Instruction decoder.
pub mod decoder;
pub use decoder::{decode_at, DecodeError, DecodedInstruction};

/// Runtime fault taxonomy.
pub mod fault;
pub use fault::{Fault, FaultClass, FaultCode};

/// Program image codec.
pub mod image;
pub use image::{ImageError, ProgramImage};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{commit_execution, execute_instruction, ExecuteState, ReturnStackOp};

/// Fetch loop.
pub mod machine;
pub use machine::Machine;

/// Console and video devices.
pub mod peripherals;
pub use peripherals::{decode_pixel, Frame, FrameCapture, Rgb, ScriptedConsole, StdConsole};

/// Linear disassembler.
pub mod disasm;
pub use disasm::{disassemble, render_listing, DisasmError, DisassemblyRow};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
