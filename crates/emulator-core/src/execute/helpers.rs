//! Pure arithmetic used by the execute stage.

use crate::encoding::Opcode;

/// Two-operand data stack operations. `x` is the deeper operand, `y` the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Shl,
    Shr,
    And,
    Or,
    Xor,
}

/// One-operand data stack operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl BinaryOp {
    /// Maps an opcode to its binary operation, if it is one.
    #[must_use]
    pub const fn from_opcode(opcode: Opcode) -> Option<Self> {
        match opcode {
            Opcode::Add => Some(Self::Add),
            Opcode::Sub => Some(Self::Sub),
            Opcode::Shl => Some(Self::Shl),
            Opcode::Shr => Some(Self::Shr),
            Opcode::And => Some(Self::And),
            Opcode::Or => Some(Self::Or),
            Opcode::Xor => Some(Self::Xor),
            _ => None,
        }
    }

    /// Computes `x op y`.
    #[must_use]
    pub fn apply(self, x: i32, y: i32) -> i32 {
        match self {
            Self::Add => x.wrapping_add(y),
            Self::Sub => x.wrapping_sub(y),
            Self::Shl => shift_left(x, y),
            Self::Shr => shift_right(x, y),
            Self::And => x & y,
            Self::Or => x | y,
            Self::Xor => x ^ y,
        }
    }
}

impl UnaryOp {
    /// Maps an opcode to its unary operation, if it is one.
    #[must_use]
    pub const fn from_opcode(opcode: Opcode) -> Option<Self> {
        match opcode {
            Opcode::Neg => Some(Self::Neg),
            Opcode::Not => Some(Self::Not),
            _ => None,
        }
    }

    /// Computes `op x`.
    #[must_use]
    pub const fn apply(self, x: i32) -> i32 {
        match self {
            Self::Neg => x.wrapping_neg(),
            Self::Not => !x,
        }
    }
}

/// Logical left shift; amounts outside `0..32` shift everything out.
#[must_use]
pub fn shift_left(value: i32, amount: i32) -> i32 {
    u32::try_from(amount)
        .ok()
        .and_then(|amount| value.checked_shl(amount))
        .unwrap_or(0)
}

/// Arithmetic right shift; amounts outside `0..32` leave only the sign fill.
#[must_use]
pub fn shift_right(value: i32, amount: i32) -> i32 {
    u32::try_from(amount)
        .ok()
        .and_then(|amount| value.checked_shr(amount))
        .unwrap_or(if value < 0 { -1 } else { 0 })
}
