use crate::FaultCode;

/// Deterministic run-state machine for one machine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the instruction at IP.
    #[default]
    Running,
    /// `HALT` retired.
    Halted,
    /// IP moved past the last byte of program memory.
    EndOfMemory,
    /// A fault is latched; no further progress is possible.
    FaultLatched(FaultCode),
}

impl RunState {
    /// Returns `true` once the machine can no longer execute.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}
