// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FunctionalUnitEntry, ProcessRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountEdit {
    Updated { previous: f64, current: f64 },
    Rejected,
    OutOfRange,
}

/// Parses a user-typed amount. Only finite numbers are accepted.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// The session-scoped list of weighted reference flows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionalUnit {
    entries: Vec<FunctionalUnitEntry>,
}

impl FunctionalUnit {
    pub fn entries(&self) -> &[FunctionalUnitEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, record: &ProcessRecord) -> bool {
        self.entries.iter().any(|entry| entry.represents(record))
    }

    /// Appends one entry per record not yet in the unit, in input order.
    /// Returns the newly added entries.
    pub fn add_from_selection<'a, I>(&mut self, records: I) -> Vec<FunctionalUnitEntry>
    where
        I: IntoIterator<Item = &'a ProcessRecord>,
    {
        let start = self.entries.len();
        for record in records {
            if self.contains(record) {
                continue;
            }
            self.entries.push(FunctionalUnitEntry::from_record(record));
        }
        self.entries[start..].to_vec()
    }

    pub fn delete_entry(&mut self, index: usize) -> Option<FunctionalUnitEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn edit_amount(&mut self, index: usize, raw: &str) -> AmountEdit {
        let Some(entry) = self.entries.get_mut(index) else {
            return AmountEdit::OutOfRange;
        };
        let Some(current) = parse_amount(raw) else {
            return AmountEdit::Rejected;
        };
        let previous = entry.amount;
        entry.amount = current;
        AmountEdit::Updated { previous, current }
    }
}
