/// The closed QProc instruction set, one byte per opcode.
///
/// Values are stable and shared byte-for-byte between the assembler and the
/// machine. Any byte outside `0x00..=0x16` is illegal by definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Nop = 0x00,
    Add = 0x01,
    Sub = 0x02,
    Neg = 0x03,
    Shl = 0x04,
    Shr = 0x05,
    And = 0x06,
    Or = 0x07,
    Xor = 0x08,
    Not = 0x09,
    Jmp = 0x0A,
    Jz = 0x0B,
    Jnz = 0x0C,
    Push = 0x0D,
    Rm = 0x0E,
    PushIp = 0x0F,
    PopIp = 0x10,
    RmIp = 0x11,
    PushPm = 0x12,
    PopPm = 0x13,
    Input = 0x14,
    Peek = 0x15,
    Halt = 0x16,
}

/// Number of assigned opcodes.
pub const OPCODE_COUNT: usize = 23;

/// Width in bytes of the only instruction operand (`PUSH`).
pub const OPERAND_BYTES: usize = 4;

/// Single source-of-truth opcode table, ordered by opcode value.
pub const OPCODE_TABLE: [Opcode; OPCODE_COUNT] = [
    Opcode::Nop,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Neg,
    Opcode::Shl,
    Opcode::Shr,
    Opcode::And,
    Opcode::Or,
    Opcode::Xor,
    Opcode::Not,
    Opcode::Jmp,
    Opcode::Jz,
    Opcode::Jnz,
    Opcode::Push,
    Opcode::Rm,
    Opcode::PushIp,
    Opcode::PopIp,
    Opcode::RmIp,
    Opcode::PushPm,
    Opcode::PopPm,
    Opcode::Input,
    Opcode::Peek,
    Opcode::Halt,
];

impl Opcode {
    /// Decodes a raw program byte.
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<Self> {
        OPCODE_TABLE.get(usize::from(byte)).copied()
    }

    /// Returns the encoded byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Neg => "NEG",
            Self::Shl => "SHL",
            Self::Shr => "SHR",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Not => "NOT",
            Self::Jmp => "JMP",
            Self::Jz => "JZ",
            Self::Jnz => "JNZ",
            Self::Push => "PUSH",
            Self::Rm => "RM",
            Self::PushIp => "PUSHIP",
            Self::PopIp => "POPIP",
            Self::RmIp => "RMIP",
            Self::PushPm => "PUSHPM",
            Self::PopPm => "POPPM",
            Self::Input => "INPUT",
            Self::Peek => "PEEK",
            Self::Halt => "HALT",
        }
    }

    /// Resolves a mnemonic. Matching is exact and case-sensitive.
    #[must_use]
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        OPCODE_TABLE
            .iter()
            .copied()
            .find(|opcode| opcode.mnemonic() == name)
    }

    /// Number of operand bytes following the opcode byte.
    #[must_use]
    pub const fn operand_bytes(self) -> usize {
        match self {
            Self::Push => OPERAND_BYTES,
            _ => 0,
        }
    }

    /// Total encoded length including the opcode byte.
    #[must_use]
    pub const fn encoded_len(self) -> usize {
        1 + self.operand_bytes()
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
