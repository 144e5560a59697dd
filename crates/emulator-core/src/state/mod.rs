//! Machine state primitives: bounded stacks, run state and snapshots.

/// Deterministic run-state machine.
pub mod run_state;
/// Capacity-checked LIFO storage for the data and instruction stacks.
pub mod stack;

pub use run_state::RunState;
pub use stack::{BoundedStack, DEFAULT_STACK_CAPACITY};

/// Point-in-time copy of the machine registers and stacks, bottom of each
/// stack first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineSnapshot {
    /// Instruction pointer.
    pub ip: usize,
    /// Data stack contents.
    pub data_stack: Vec<i32>,
    /// Instruction (return) stack contents.
    pub instruction_stack: Vec<usize>,
    /// Instructions retired so far.
    pub steps: u64,
}

impl std::fmt::Display for MachineSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "IP = {}  steps = {}", self.ip, self.steps)?;
        write!(f, "DS (bottom..top):")?;
        for value in &self.data_stack {
            write!(f, " {value}")?;
        }
        writeln!(f)?;
        write!(f, "IS (bottom..top):")?;
        for addr in &self.instruction_stack {
            write!(f, " {addr}")?;
        }
        Ok(())
    }
}
