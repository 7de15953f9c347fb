// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Amount,
    Product,
    Process,
    Location,
}

impl Column {
    pub const PROCESS_TABLE: [Self; 3] = [Self::Product, Self::Process, Self::Location];
    pub const FUNCTIONAL_UNIT: [Self; 4] =
        [Self::Amount, Self::Product, Self::Process, Self::Location];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amount => "Amount",
            Self::Product => "Product",
            Self::Process => "Process",
            Self::Location => "Location",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Amount" => Some(Self::Amount),
            "Product" => Some(Self::Product),
            "Process" => Some(Self::Process),
            "Location" => Some(Self::Location),
            _ => None,
        }
    }
}

/// One row of a database listing. Never mutated after the listing is taken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub product: String,
    pub process: String,
    pub location: String,
}

impl ProcessRecord {
    pub fn new(
        product: impl Into<String>,
        process: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            process: process.into(),
            location: location.into(),
        }
    }

    /// Listing services may omit the reference product or location.
    pub fn from_listing(product: Option<String>, process: String, location: Option<String>) -> Self {
        Self {
            product: product.unwrap_or_default(),
            process,
            location: location.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalUnitEntry {
    pub amount: f64,
    pub product: String,
    pub process: String,
    pub location: String,
}

impl FunctionalUnitEntry {
    pub const DEFAULT_AMOUNT: f64 = 1.0;

    pub fn from_record(record: &ProcessRecord) -> Self {
        Self {
            amount: Self::DEFAULT_AMOUNT,
            product: record.product.clone(),
            process: record.process.clone(),
            location: record.location.clone(),
        }
    }

    pub fn represents(&self, record: &ProcessRecord) -> bool {
        self.product == record.product
            && self.process == record.process
            && self.location == record.location
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteScheme {
    Hash,
    Query,
    Path,
}

impl RouteScheme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::Query => "query",
            Self::Path => "path",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hash" => Some(Self::Hash),
            "query" => Some(Self::Query),
            "path" => Some(Self::Path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Column, FunctionalUnitEntry, ProcessRecord, RouteScheme, Theme};

    #[test]
    fn column_names_round_trip_case_sensitively() {
        for column in Column::FUNCTIONAL_UNIT {
            assert_eq!(Column::parse(column.as_str()), Some(column));
        }
        assert_eq!(Column::parse("product"), None);
    }

    #[test]
    fn listing_rows_stringify_missing_fields() {
        let record = ProcessRecord::from_listing(None, "market for water".to_owned(), None);
        assert_eq!(record.product, "");
        assert_eq!(record.location, "");
        assert_eq!(record.process, "market for water");
    }

    #[test]
    fn functional_unit_entry_copies_record_with_default_amount() {
        let record = ProcessRecord::new("Steel", "Smelting", "US");
        let entry = FunctionalUnitEntry::from_record(&record);
        assert_eq!(entry.amount, 1.0);
        assert!(entry.represents(&record));
        assert!(!entry.represents(&ProcessRecord::new("Steel", "Smelting", "DE")));
    }

    #[test]
    fn scheme_and_theme_parse_loosely() {
        assert_eq!(RouteScheme::parse(" Query "), Some(RouteScheme::Query));
        assert_eq!(RouteScheme::parse("fragment"), None);
        assert_eq!(Theme::parse("LIGHT"), Some(Theme::Light));
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
