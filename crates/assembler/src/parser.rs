//! Token classification.
//!
//! Every token is classified by one ordered set of pattern checks, in one of
//! two positions: a statement (what the token does) or an operand (the value
//! following `PUSH` or `CALL`).

use crate::errors::AssembleErrorKind;
use crate::mnemonic::{is_reserved, resolve_mnemonic, Mnemonic};

/// A token in statement position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'a> {
    /// Machine instruction or the `CALL` macro.
    Mnemonic(Mnemonic),
    /// `name:` declares `name` at the current offset.
    LabelDecl(&'a str),
    /// Not a valid statement.
    Invalid(AssembleErrorKind),
}

/// A token in operand position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand<'a> {
    /// Literal value.
    IntegerLiteral(i32),
    /// Reference to a label, resolved after the last token.
    LabelRef(&'a str),
    /// Not a valid operand.
    Invalid(AssembleErrorKind),
}

/// Classifies a token in statement position.
#[must_use]
pub fn classify_statement(token: &str) -> Statement<'_> {
    if let Some(mnemonic) = resolve_mnemonic(token) {
        return Statement::Mnemonic(mnemonic);
    }
    let Some(name) = token.strip_suffix(':') else {
        return Statement::Invalid(AssembleErrorKind::UnknownSymbol(token.to_string()));
    };
    if name.is_empty() {
        Statement::Invalid(AssembleErrorKind::EmptyToken)
    } else if is_reserved(name) {
        Statement::Invalid(AssembleErrorKind::ReservedLabel(name.to_string()))
    } else {
        Statement::LabelDecl(name)
    }
}

/// Classifies the operand of `owner` (`PUSH` or `CALL`).
#[must_use]
pub fn classify_operand<'a>(token: &'a str, owner: Mnemonic) -> Operand<'a> {
    if is_reserved(token) {
        return Operand::Invalid(AssembleErrorKind::OperandIsMnemonic(token.to_string()));
    }
    if token.ends_with(':') {
        return Operand::Invalid(AssembleErrorKind::MissingOperand(owner.name()));
    }
    match parse_integer(token) {
        Some(Some(value)) => Operand::IntegerLiteral(value),
        Some(None) => Operand::Invalid(AssembleErrorKind::IntegerOutOfRange(token.to_string())),
        None => Operand::LabelRef(token),
    }
}

/// Parses an integer literal: optional sign, then decimal digits or `0x`
/// followed by hex digits.
///
/// Returns `None` when `token` is not a literal at all and `Some(None)` when
/// it is one but does not fit in `i32`.
#[must_use]
pub fn parse_integer(token: &str) -> Option<Option<i32>> {
    let (negative, body) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let (digits, radix) = match body.get(..2) {
        Some("0x" | "0X") => (&body[2..], 16),
        _ => (body, 10),
    };
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_digit(radix)) {
        return None;
    }

    let magnitude = i64::from_str_radix(digits, radix).ok();
    let value = magnitude
        .map(|magnitude| if negative { -magnitude } else { magnitude })
        .and_then(|value| i32::try_from(value).ok());
    Some(value)
}
