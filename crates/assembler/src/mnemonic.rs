//! Mnemonic resolution derived from the core opcode table.

use std::sync::OnceLock;

use qproc_core::{Opcode, OPCODE_TABLE};

/// The `CALL` macro keyword.
pub const CALL_MNEMONIC: &str = "CALL";

/// What a statement keyword stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    /// A machine instruction.
    Instruction(Opcode),
    /// The `CALL` macro.
    Call,
}

impl Mnemonic {
    /// Keyword as written in source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Instruction(opcode) => opcode.mnemonic(),
            Self::Call => CALL_MNEMONIC,
        }
    }

    /// Returns `true` when the keyword takes one operand token.
    #[must_use]
    pub fn takes_operand(self) -> bool {
        match self {
            Self::Instruction(opcode) => opcode.operand_bytes() > 0,
            Self::Call => true,
        }
    }
}

fn entries_verified_against_core() -> &'static [(&'static str, Mnemonic)] {
    static VERIFIED_ENTRIES: OnceLock<Vec<(&'static str, Mnemonic)>> = OnceLock::new();
    VERIFIED_ENTRIES.get_or_init(|| {
        let mut entries: Vec<_> = OPCODE_TABLE
            .iter()
            .filter(|opcode| {
                let round_trips = Opcode::from_u8(opcode.as_u8()) == Some(**opcode)
                    && Opcode::from_mnemonic(opcode.mnemonic()) == Some(**opcode);
                debug_assert!(round_trips, "opcode table entry {opcode} does not round-trip");
                round_trips
            })
            .map(|opcode| (opcode.mnemonic(), Mnemonic::Instruction(*opcode)))
            .collect();
        entries.push((CALL_MNEMONIC, Mnemonic::Call));
        entries
    })
}

/// Resolves a statement keyword. Matching is exact and case-sensitive.
#[must_use]
pub fn resolve_mnemonic(name: &str) -> Option<Mnemonic> {
    entries_verified_against_core()
        .iter()
        .find(|(entry, _)| *entry == name)
        .map(|(_, mnemonic)| *mnemonic)
}

/// Returns `true` for words that cannot name a label.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    resolve_mnemonic(name).is_some()
}
