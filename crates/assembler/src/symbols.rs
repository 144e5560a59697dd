//! Label table with deferred fix-ups.
//!
//! Each label keeps every byte offset where its address must be written and,
//! once seen, the offset it was declared at. Usages may come before or after
//! the declaration; addresses are written only after the last token.

use std::collections::BTreeMap;

use crate::errors::{SourceLocation, SymbolError};

/// A place in the output where a label's address goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// Offset of the reserved 4-byte operand.
    pub offset: usize,
    /// Operand token position.
    pub location: SourceLocation,
}

/// A label and everything known about it so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Label {
    /// Operand slots to patch.
    pub usages: Vec<Usage>,
    /// Declared address and declaration position.
    pub declaration: Option<(usize, SourceLocation)>,
}

/// All labels of one assembly run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    labels: BTreeMap<String, Label>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError::DuplicateLabel`] if `name` was already declared.
    pub fn declare(
        &mut self,
        name: &str,
        address: usize,
        location: SourceLocation,
    ) -> Result<(), SymbolError> {
        let label = self.labels.entry(name.to_string()).or_default();
        if let Some((_, first)) = label.declaration {
            return Err(SymbolError::DuplicateLabel {
                name: name.to_string(),
                first,
            });
        }
        label.declaration = Some((address, location));
        Ok(())
    }

    /// Records that the 4 bytes at `offset` hold the address of `name`.
    pub fn record_usage(&mut self, name: &str, offset: usize, location: SourceLocation) {
        self.labels
            .entry(name.to_string())
            .or_default()
            .usages
            .push(Usage { offset, location });
    }

    /// Looks up a label.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    /// Resolves every label to its declared address.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError::UndeclaredLabel`] for the undeclared label used
    /// earliest in the source, together with that usage's position.
    pub fn resolve(&self) -> Result<BTreeMap<String, usize>, (SymbolError, SourceLocation)> {
        let first_undeclared = self
            .labels
            .iter()
            .filter(|(_, label)| label.declaration.is_none())
            .filter_map(|(name, label)| {
                label
                    .usages
                    .iter()
                    .map(|usage| usage.location)
                    .min()
                    .map(|location| (location, name))
            })
            .min();
        if let Some((location, name)) = first_undeclared {
            return Err((SymbolError::UndeclaredLabel(name.clone()), location));
        }

        Ok(self
            .labels
            .iter()
            .filter_map(|(name, label)| {
                label
                    .declaration
                    .map(|(address, _)| (name.clone(), address))
            })
            .collect())
    }

    /// Every `(offset, address)` pair to patch, in label-name order.
    ///
    /// Usages of undeclared labels are skipped; call [`Self::resolve`] first.
    pub fn fixups(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.labels.values().flat_map(|label| {
            label
                .declaration
                .into_iter()
                .flat_map(move |(address, _)| {
                    label.usages.iter().map(move |usage| (usage.offset, address))
                })
        })
    }
}
