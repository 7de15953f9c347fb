// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::borrow::Cow;

use crate::{Column, FunctionalUnitEntry, ProcessRecord};

/// Row access by column name. `None` means the column is not part of the
/// row's schema.
pub trait Record {
    fn field(&self, column: &str) -> Option<Cow<'_, str>>;
}

impl Record for ProcessRecord {
    fn field(&self, column: &str) -> Option<Cow<'_, str>> {
        match Column::parse(column)? {
            Column::Product => Some(Cow::Borrowed(&self.product)),
            Column::Process => Some(Cow::Borrowed(&self.process)),
            Column::Location => Some(Cow::Borrowed(&self.location)),
            Column::Amount => None,
        }
    }
}

impl Record for FunctionalUnitEntry {
    fn field(&self, column: &str) -> Option<Cow<'_, str>> {
        match Column::parse(column)? {
            Column::Amount => Some(Cow::Owned(self.amount.to_string())),
            Column::Product => Some(Cow::Borrowed(&self.product)),
            Column::Process => Some(Cow::Borrowed(&self.process)),
            Column::Location => Some(Cow::Borrowed(&self.location)),
        }
    }
}

/// Splits a filter pattern into lower-cased tokens: every non-empty
/// `"quoted phrase"` first, then the whitespace-separated words left over once
/// the phrases are cut out.
pub fn tokenize(pattern: &str) -> Vec<String> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Vec::new();
    }

    let mut phrases = Vec::new();
    let mut remainder = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(open) = rest.find('"') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('"') else {
            break;
        };
        if close == 0 {
            // `""` never forms a phrase; the first quote stays a literal and
            // the second may still open one.
            remainder.push_str(&rest[..=open]);
            rest = after_open;
            continue;
        }

        remainder.push_str(&rest[..open]);
        remainder.push(' ');
        let phrase = after_open[..close].trim().to_lowercase();
        if !phrase.is_empty() {
            phrases.push(phrase);
        }
        rest = &after_open[close + 1..];
    }
    remainder.push_str(rest);

    phrases.extend(remainder.split_whitespace().map(str::to_lowercase));
    phrases
}

/// AND over tokens. Unknown columns and empty token lists never exclude a row.
pub fn matches<R: Record + ?Sized>(record: &R, column: &str, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let Some(value) = record.field(column) else {
        return true;
    };
    let haystack = value.to_lowercase();
    tokens.iter().all(|token| haystack.contains(token.as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPredicate {
    pub column: String,
    pub tokens: Vec<String>,
}

impl FilterPredicate {
    pub fn new(column: impl Into<String>, pattern: &str) -> Self {
        Self {
            column: column.into(),
            tokens: tokenize(pattern),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        matches(record, &self.column, &self.tokens)
    }
}

/// The Product/Process/Location text inputs of the process browser. Live
/// overlays and explicit apply both evaluate through [`FilterSet::matches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    inputs: [String; 3],
    predicates: [FilterPredicate; 3],
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            inputs: Default::default(),
            predicates: Column::PROCESS_TABLE.map(|column| FilterPredicate::new(column.as_str(), "")),
        }
    }
}

impl FilterSet {
    fn slot(column: Column) -> Option<usize> {
        Column::PROCESS_TABLE
            .iter()
            .position(|candidate| *candidate == column)
    }

    pub fn input(&self, column: Column) -> &str {
        Self::slot(column)
            .map(|index| self.inputs[index].as_str())
            .unwrap_or("")
    }

    /// Returns false for columns the process table does not filter on.
    pub fn set_input(&mut self, column: Column, text: impl Into<String>) -> bool {
        let Some(index) = Self::slot(column) else {
            return false;
        };
        let text = text.into();
        self.predicates[index] = FilterPredicate::new(column.as_str(), &text);
        self.inputs[index] = text;
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_identity(&self) -> bool {
        self.predicates.iter().all(FilterPredicate::is_identity)
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(record))
    }

    /// Live mode: indices of `rows` that pass, leaving `rows` untouched.
    pub fn overlay<R: Record>(&self, rows: &[R]) -> Vec<usize> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| self.matches(*row))
            .map(|(index, _)| index)
            .collect()
    }

    /// Explicit mode: recompute the displayed rows from the full base table.
    pub fn apply<R: Record + Clone>(&self, base: &[R]) -> Vec<R> {
        base.iter().filter(|row| self.matches(*row)).cloned().collect()
    }
}
