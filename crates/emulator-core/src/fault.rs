use thiserror::Error;

use crate::state::MachineSnapshot;

/// Broad fault category, shown in fault reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Data or instruction stack discipline violation.
    Stack,
    /// Address outside program memory.
    Memory,
    /// Byte at IP is not an instruction, or its operand is cut off.
    Decode,
    /// External console failure or malformed input.
    Console,
}

impl std::fmt::Display for FaultClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Stack => "stack",
            Self::Memory => "memory",
            Self::Decode => "decode",
            Self::Console => "console",
        })
    }
}

/// Runtime fault taxonomy. Every fault aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultCode {
    /// Pop from an empty data stack.
    #[error("attempted to pop empty data stack")]
    DataStackUnderflow,
    /// Pop from an empty instruction stack.
    #[error("attempted to pop empty instruction stack")]
    InstructionStackUnderflow,
    /// Push onto a stack at capacity.
    #[error("stack capacity exceeded")]
    StackOverflow,
    /// A jump target, return address or memory word lies outside program memory.
    #[error("address {address} is out of bounds")]
    AddressOutOfBounds {
        /// The offending address as popped.
        address: i64,
    },
    /// Byte at IP does not name an instruction.
    #[error("unknown instruction 0x{0:02X}")]
    UnknownOpcode(u8),
    /// `PUSH` too close to the end of memory to carry its operand.
    #[error("PUSH used without a proper operand")]
    TruncatedOperand,
    /// `INPUT` could not obtain a signed 32-bit integer.
    #[error("invalid input")]
    MalformedInput,
    /// `PEEK` could not write to the output sink.
    #[error("failed to write output")]
    OutputFailed,
}

impl FaultCode {
    /// Returns the reporting class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::DataStackUnderflow | Self::InstructionStackUnderflow | Self::StackOverflow => {
                FaultClass::Stack
            }
            Self::AddressOutOfBounds { .. } => FaultClass::Memory,
            Self::UnknownOpcode(_) | Self::TruncatedOperand => FaultClass::Decode,
            Self::MalformedInput | Self::OutputFailed => FaultClass::Console,
        }
    }
}

/// A latched runtime fault with the failing instruction's address and the
/// machine state at the moment it was raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[error("{code} ; instruction #{address}")]
pub struct Fault {
    /// What went wrong.
    pub code: FaultCode,
    /// Address of the opcode that faulted.
    pub address: usize,
    /// Stacks and counters captured before any partial effect of the faulting
    /// instruction became visible.
    pub snapshot: MachineSnapshot,
}
