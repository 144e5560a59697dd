//! Public host-facing API contracts for embedding the machine.

use thiserror::Error;

use crate::encoding::Opcode;
use crate::peripherals::video::Frame;
use crate::state::DEFAULT_STACK_CAPACITY;
use crate::FaultCode;

/// Top-level immutable configuration for a machine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct EmulatorConfig {
    /// Stop a single `run` call after this many instructions. `None` runs to
    /// completion.
    pub max_steps: Option<u64>,
    /// Maximum data stack depth.
    pub data_stack_capacity: usize,
    /// Maximum instruction stack depth.
    pub instruction_stack_capacity: usize,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            data_stack_capacity: DEFAULT_STACK_CAPACITY,
            instruction_stack_capacity: DEFAULT_STACK_CAPACITY,
        }
    }
}

/// Console transport failures.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Input token is not a signed 32-bit integer.
    #[error("not a 32-bit integer: {0:?}")]
    Malformed(String),
    /// Input stream is exhausted.
    #[error("input stream closed")]
    Closed,
    /// Underlying stream failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// External integer stream used by `INPUT` and `PEEK`.
pub trait Console {
    /// Blocks until one signed integer is available.
    ///
    /// # Errors
    ///
    /// Returns a [`ConsoleError`] when the next token is malformed or the
    /// stream ends.
    fn read_value(&mut self) -> Result<i32, ConsoleError>;

    /// Emits one value.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Io`] when the sink cannot be written.
    fn write_value(&mut self, value: i32) -> Result<(), ConsoleError>;
}

/// Receives the frame buffer before every instruction fetch.
pub trait FrameSink {
    /// Presents the current frame.
    fn present(&mut self, frame: &Frame<'_>);
}

/// Deterministic trace events emitted at instruction boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Instruction decoded and about to execute.
    InstructionStart {
        /// Address of the opcode.
        ip: usize,
        /// Decoded instruction.
        opcode: Opcode,
        /// `PUSH` operand, if any.
        operand: Option<i32>,
    },
    /// Instruction retired.
    InstructionRetired {
        /// Address of the opcode.
        ip: usize,
        /// Address execution continues at.
        next_ip: usize,
        /// Data stack depth after retirement.
        data_depth: usize,
    },
    /// Fault emission event.
    FaultRaised {
        /// Raised fault code.
        cause: FaultCode,
        /// Address of the faulting opcode.
        ip: usize,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Everything outside the machine that an instruction may touch.
pub struct Host<'a> {
    pub(crate) console: &'a mut dyn Console,
    pub(crate) frame: Option<&'a mut dyn FrameSink>,
    pub(crate) trace: Option<&'a mut dyn TraceSink>,
}

impl<'a> Host<'a> {
    /// Headless host with only a console.
    pub fn new(console: &'a mut dyn Console) -> Self {
        Self {
            console,
            frame: None,
            trace: None,
        }
    }

    /// Enables video output into `sink`.
    #[must_use]
    pub fn with_frame(mut self, sink: &'a mut dyn FrameSink) -> Self {
        self.frame = Some(sink);
        self
    }

    /// Enables trace events into `sink`.
    #[must_use]
    pub fn with_trace(mut self, sink: &'a mut dyn TraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    pub(crate) fn emit(&mut self, event: TraceEvent) {
        if let Some(trace) = self.trace.as_deref_mut() {
            trace.on_event(event);
        }
    }
}

/// Output status from one instruction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction retired; the machine is still running.
    Retired {
        /// The retired instruction.
        opcode: Opcode,
    },
    /// `HALT` retired, or had retired earlier.
    Halted,
    /// Execution ran past the last byte of program memory.
    EndOfMemory,
    /// A fault was raised now or is latched from earlier.
    Fault {
        /// Raised fault code.
        cause: FaultCode,
    },
}

/// Why a non-faulting run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunBoundary {
    /// `HALT` retired.
    Halted,
    /// Execution ran past the last byte of program memory.
    EndOfMemory,
    /// The configured step limit was reached; the machine can be resumed.
    StepLimit,
}

/// Aggregated outcome of a `run` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Instructions retired during this call.
    pub steps: u64,
    /// Where the run stopped.
    pub boundary: RunBoundary,
}
