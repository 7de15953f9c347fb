// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::ProcessRecord;

/// Source of projects, databases and their process listings. The current
/// project is catalog-side state set by [`ProcessCatalog::set_current_project`].
pub trait ProcessCatalog {
    fn list_projects(&mut self) -> Result<Vec<String>>;
    fn set_current_project(&mut self, name: &str) -> Result<()>;
    /// Databases of the current project, in display order.
    fn list_databases(&mut self) -> Result<Vec<String>>;
    fn list_processes(&mut self, database: &str) -> Result<Vec<ProcessRecord>>;
    /// Rows of `database` whose process name or product contains `term`,
    /// ignoring case.
    fn search_processes(&mut self, database: &str, term: &str) -> Result<Vec<ProcessRecord>>;
    /// Distinct process names in `database`, sorted.
    fn process_names(&mut self, database: &str) -> Result<Vec<String>>;
}

impl<T: ProcessCatalog + ?Sized> ProcessCatalog for &mut T {
    fn list_projects(&mut self) -> Result<Vec<String>> {
        (**self).list_projects()
    }

    fn set_current_project(&mut self, name: &str) -> Result<()> {
        (**self).set_current_project(name)
    }

    fn list_databases(&mut self) -> Result<Vec<String>> {
        (**self).list_databases()
    }

    fn list_processes(&mut self, database: &str) -> Result<Vec<ProcessRecord>> {
        (**self).list_processes(database)
    }

    fn search_processes(&mut self, database: &str, term: &str) -> Result<Vec<ProcessRecord>> {
        (**self).search_processes(database, term)
    }

    fn process_names(&mut self, database: &str) -> Result<Vec<String>> {
        (**self).process_names(database)
    }
}
