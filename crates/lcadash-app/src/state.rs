// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{info, warn};

use crate::{
    AmountEdit, Column, FilterSet, FunctionalUnit, FunctionalUnitEntry, Notice, ProcessCatalog,
    ProcessRecord, Theme,
};

/// Everything the calculation setup workflow knows about the current session.
/// Handlers receive it explicitly; there is no global instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub theme: Theme,
    pub notice: Option<Notice>,
    projects: Vec<String>,
    project: Option<String>,
    databases: Vec<String>,
    database: Option<String>,
    base: Vec<ProcessRecord>,
    displayed: Vec<ProcessRecord>,
    // Distinct process names of the current database, sorted.
    process_names: Vec<String>,
    search: Option<String>,
    filters: FilterSet,
    // Indices into `displayed`, in the order they were toggled on.
    selection: Vec<usize>,
    unit: FunctionalUnit,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Theme::Dark)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    SetFilter { column: Column, text: String },
    ApplyFilters,
    ClearFilters,
    ToggleRow(usize),
    ClearSelection,
    AddSelection,
    EditAmount { index: usize, raw: String },
    DeleteEntry(usize),
    ToggleTheme,
    SetNotice(Notice),
    ClearNotice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ProjectsLoaded(usize),
    ProjectSelected(String),
    DatabasesLoaded(usize),
    DatabaseSelected { name: String, rows: usize },
    Searched { term: String, rows: usize },
    CatalogUnavailable(String),
    FilterChanged { column: Column, visible: usize },
    DisplayedReplaced(usize),
    SelectionChanged(usize),
    EntriesAdded(Vec<FunctionalUnitEntry>),
    AmountEdited { index: usize, outcome: AmountEdit },
    EntryDeleted { index: usize, entry: FunctionalUnitEntry },
    ThemeChanged(Theme),
    NoticeSet(Notice),
    NoticeCleared,
}

impl Session {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            notice: None,
            projects: Vec::new(),
            project: None,
            databases: Vec::new(),
            database: None,
            base: Vec::new(),
            displayed: Vec::new(),
            process_names: Vec::new(),
            search: None,
            filters: FilterSet::default(),
            selection: Vec::new(),
            unit: FunctionalUnit::default(),
        }
    }

    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn databases(&self) -> &[String] {
        &self.databases
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn has_database(&self) -> bool {
        self.database.is_some()
    }

    pub fn base(&self) -> &[ProcessRecord] {
        &self.base
    }

    pub fn displayed(&self) -> &[ProcessRecord] {
        &self.displayed
    }

    pub fn process_names(&self) -> &[String] {
        &self.process_names
    }

    /// The catalog search the base table came from, if any.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// First process name starting with `prefix`, falling back to the first
    /// one containing it. Case is ignored.
    pub fn complete_process(&self, prefix: &str) -> Option<&str> {
        let needle = prefix.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let lowered = |name: &&String| name.to_lowercase();
        self.process_names
            .iter()
            .find(|name| lowered(name).starts_with(&needle))
            .or_else(|| {
                self.process_names
                    .iter()
                    .find(|name| lowered(name).contains(&needle))
            })
            .map(String::as_str)
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn unit(&self) -> &FunctionalUnit {
        &self.unit
    }

    /// Indices into [`Session::displayed`] that pass the live filter overlay.
    pub fn visible_rows(&self) -> Vec<usize> {
        self.filters.overlay(&self.displayed)
    }

    pub fn is_selected(&self, row: usize) -> bool {
        self.selection.contains(&row)
    }

    /// Selected rows that are currently visible, in toggle order.
    pub fn selected_records(&self) -> Vec<&ProcessRecord> {
        let visible = self.visible_rows();
        self.selection
            .iter()
            .filter(|row| visible.contains(row))
            .filter_map(|row| self.displayed.get(*row))
            .collect()
    }

    pub fn load_projects<P>(&mut self, catalog: &mut P) -> Vec<SessionEvent>
    where
        P: ProcessCatalog + ?Sized,
    {
        match catalog.list_projects() {
            Ok(projects) => {
                self.projects = projects;
                vec![SessionEvent::ProjectsLoaded(self.projects.len())]
            }
            Err(error) => {
                self.projects.clear();
                self.catalog_failed("list projects", &error)
            }
        }
    }

    /// Makes `name` current in the catalog and loads its databases. The
    /// previous database choice and its table are dropped; the functional
    /// unit is kept.
    pub fn select_project<P>(&mut self, catalog: &mut P, name: &str) -> Vec<SessionEvent>
    where
        P: ProcessCatalog + ?Sized,
    {
        self.database = None;
        self.databases.clear();
        self.process_names.clear();
        let mut events = self.replace_table(Vec::new());

        if let Err(error) = catalog.set_current_project(name) {
            self.project = None;
            events.extend(self.catalog_failed(&format!("open project `{name}`"), &error));
            return events;
        }
        info!(project = name, "project selected");
        self.project = Some(name.to_owned());
        events.push(SessionEvent::ProjectSelected(name.to_owned()));

        match catalog.list_databases() {
            Ok(databases) => {
                self.databases = databases;
                events.push(SessionEvent::DatabasesLoaded(self.databases.len()));
            }
            Err(error) => {
                events.extend(self.catalog_failed(&format!("list databases of `{name}`"), &error));
            }
        }
        events
    }

    /// Loads the process listing of `name` as the new base table. Filter
    /// inputs survive; the selection does not.
    pub fn select_database<P>(&mut self, catalog: &mut P, name: &str) -> Vec<SessionEvent>
    where
        P: ProcessCatalog + ?Sized,
    {
        self.database = Some(name.to_owned());
        self.search = None;
        self.process_names.clear();
        let mut events = match catalog.list_processes(name) {
            Ok(rows) => {
                info!(database = name, rows = rows.len(), "database selected");
                let count = rows.len();
                let mut events = self.replace_table(rows);
                events.push(SessionEvent::DatabaseSelected {
                    name: name.to_owned(),
                    rows: count,
                });
                events
            }
            Err(error) => {
                let mut events = self.replace_table(Vec::new());
                events.extend(self.catalog_failed(&format!("list processes of `{name}`"), &error));
                return events;
            }
        };

        match catalog.process_names(name) {
            Ok(names) => self.process_names = names,
            Err(error) => {
                let action = format!("list process names of `{name}`");
                events.extend(self.catalog_failed(&action, &error));
            }
        }
        events
    }

    /// Replaces the base table with the catalog's matches for `term` in the
    /// current database. A blank term reloads the full listing. Filter inputs
    /// survive; the selection does not.
    pub fn search_database<P>(&mut self, catalog: &mut P, term: &str) -> Vec<SessionEvent>
    where
        P: ProcessCatalog + ?Sized,
    {
        let Some(database) = self.database.clone() else {
            return vec![self.set_notice(Notice::info("select a database first"))];
        };
        let term = term.trim();
        let result = if term.is_empty() {
            catalog.list_processes(&database)
        } else {
            catalog.search_processes(&database, term)
        };

        match result {
            Ok(rows) => {
                info!(database = %database, term, rows = rows.len(), "catalog search");
                self.search = (!term.is_empty()).then(|| term.to_owned());
                let count = rows.len();
                let mut events = self.replace_table(rows);
                events.push(SessionEvent::Searched {
                    term: term.to_owned(),
                    rows: count,
                });
                events
            }
            Err(error) => {
                self.search = None;
                let mut events = self.replace_table(Vec::new());
                events.extend(self.catalog_failed(&format!("search `{database}`"), &error));
                events
            }
        }
    }

    pub fn dispatch(&mut self, command: SessionCommand) -> Vec<SessionEvent> {
        match command {
            SessionCommand::SetFilter { column, text } => {
                if !self.filters.set_input(column, text) {
                    return Vec::new();
                }
                vec![SessionEvent::FilterChanged {
                    column,
                    visible: self.visible_rows().len(),
                }]
            }
            SessionCommand::ApplyFilters => {
                let rows = self.filters.apply(&self.base);
                self.replace_displayed(rows)
            }
            SessionCommand::ClearFilters => {
                self.filters.clear();
                let rows = self.base.clone();
                self.replace_displayed(rows)
            }
            SessionCommand::ToggleRow(row) => {
                if !self.visible_rows().contains(&row) {
                    return Vec::new();
                }
                match self.selection.iter().position(|selected| *selected == row) {
                    Some(position) => {
                        self.selection.remove(position);
                    }
                    None => self.selection.push(row),
                }
                vec![SessionEvent::SelectionChanged(self.selection.len())]
            }
            SessionCommand::ClearSelection => {
                if self.selection.is_empty() {
                    return Vec::new();
                }
                self.selection.clear();
                vec![SessionEvent::SelectionChanged(0)]
            }
            SessionCommand::AddSelection => {
                let records = self
                    .selected_records()
                    .into_iter()
                    .cloned()
                    .collect::<Vec<_>>();
                let added = self.unit.add_from_selection(&records);
                let message = match added.len() {
                    0 => "nothing new to add".to_owned(),
                    1 => "added 1 process".to_owned(),
                    count => format!("added {count} processes"),
                };
                vec![SessionEvent::EntriesAdded(added), self.set_notice(Notice::info(message))]
            }
            SessionCommand::EditAmount { index, raw } => {
                let outcome = self.unit.edit_amount(index, &raw);
                let mut events = vec![SessionEvent::AmountEdited { index, outcome }];
                if outcome == AmountEdit::Rejected {
                    events.push(self.set_notice(Notice::warning(format!(
                        "`{}` is not a number; amount unchanged",
                        raw.trim()
                    ))));
                }
                events
            }
            SessionCommand::DeleteEntry(index) => match self.unit.delete_entry(index) {
                Some(entry) => vec![SessionEvent::EntryDeleted { index, entry }],
                None => Vec::new(),
            },
            SessionCommand::ToggleTheme => {
                self.theme = self.theme.toggled();
                vec![SessionEvent::ThemeChanged(self.theme)]
            }
            SessionCommand::SetNotice(notice) => vec![self.set_notice(notice)],
            SessionCommand::ClearNotice => {
                self.notice = None;
                vec![SessionEvent::NoticeCleared]
            }
        }
    }

    fn replace_table(&mut self, rows: Vec<ProcessRecord>) -> Vec<SessionEvent> {
        self.base = rows;
        let rows = self.base.clone();
        self.replace_displayed(rows)
    }

    fn replace_displayed(&mut self, rows: Vec<ProcessRecord>) -> Vec<SessionEvent> {
        self.displayed = rows;
        let mut events = vec![SessionEvent::DisplayedReplaced(self.displayed.len())];
        if !self.selection.is_empty() {
            self.selection.clear();
            events.push(SessionEvent::SelectionChanged(0));
        }
        events
    }

    fn catalog_failed(&mut self, action: &str, error: &anyhow::Error) -> Vec<SessionEvent> {
        warn!(action, error = %format!("{error:#}"), "catalog request failed");
        let message = format!("could not {action}: {error:#}");
        vec![
            SessionEvent::CatalogUnavailable(message.clone()),
            self.set_notice(Notice::warning(message)),
        ]
    }

    fn set_notice(&mut self, notice: Notice) -> SessionEvent {
        self.notice = Some(notice.clone());
        SessionEvent::NoticeSet(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, SessionCommand, SessionEvent};
    use crate::{AmountEdit, Column, NoticeLevel, ProcessCatalog, ProcessRecord, Theme};
    use anyhow::{Result, bail};

    #[derive(Debug, Default)]
    struct FakeCatalog {
        current: Option<String>,
        broken_listing: bool,
        broken_names: bool,
    }

    impl ProcessCatalog for FakeCatalog {
        fn list_projects(&mut self) -> Result<Vec<String>> {
            Ok(vec!["default".to_owned(), "chemistry".to_owned()])
        }

        fn set_current_project(&mut self, name: &str) -> Result<()> {
            if name == "missing" {
                bail!("project `missing` does not exist");
            }
            self.current = Some(name.to_owned());
            Ok(())
        }

        fn list_databases(&mut self) -> Result<Vec<String>> {
            Ok(vec!["metals".to_owned()])
        }

        fn list_processes(&mut self, database: &str) -> Result<Vec<ProcessRecord>> {
            if self.broken_listing {
                bail!("database `{database}` is locked");
            }
            Ok(vec![
                ProcessRecord::new("Steel", "Smelting", "US"),
                ProcessRecord::new("Water", "Pumping", "US"),
            ])
        }

        fn search_processes(&mut self, database: &str, term: &str) -> Result<Vec<ProcessRecord>> {
            let term = term.to_lowercase();
            Ok(self
                .list_processes(database)?
                .into_iter()
                .filter(|record| {
                    record.process.to_lowercase().contains(&term)
                        || record.product.to_lowercase().contains(&term)
                })
                .collect())
        }

        fn process_names(&mut self, _database: &str) -> Result<Vec<String>> {
            if self.broken_names {
                bail!("names index is missing");
            }
            Ok(vec!["Pumping".to_owned(), "Smelting".to_owned()])
        }
    }

    fn loaded() -> Session {
        let mut catalog = FakeCatalog::default();
        let mut session = Session::default();
        session.load_projects(&mut catalog);
        session.select_project(&mut catalog, "chemistry");
        session.select_database(&mut catalog, "metals");
        session
    }

    #[test]
    fn project_then_database_loads_table() {
        let mut catalog = FakeCatalog::default();
        let mut session = Session::default();
        assert_eq!(session.load_projects(&mut catalog), vec![SessionEvent::ProjectsLoaded(2)]);

        let events = session.select_project(&mut catalog, "chemistry");
        assert!(events.contains(&SessionEvent::ProjectSelected("chemistry".to_owned())));
        assert_eq!(catalog.current.as_deref(), Some("chemistry"));
        assert!(!session.has_database());

        session.select_database(&mut catalog, "metals");
        assert_eq!(session.displayed().len(), 2);
        assert_eq!(session.base(), session.displayed());
    }

    #[test]
    fn product_filter_then_select_and_transfer() {
        let mut session = loaded();
        session.dispatch(SessionCommand::SetFilter {
            column: Column::Product,
            text: "steel".to_owned(),
        });
        session.dispatch(SessionCommand::ApplyFilters);
        assert_eq!(
            session.displayed(),
            &[ProcessRecord::new("Steel", "Smelting", "US")]
        );

        session.dispatch(SessionCommand::ToggleRow(0));
        session.dispatch(SessionCommand::AddSelection);
        let entries = session.unit().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!((entries[0].amount, entries[0].product.as_str()), (1.0, "Steel"));

        let edited = session.dispatch(SessionCommand::EditAmount {
            index: 0,
            raw: "2.5".to_owned(),
        });
        assert_eq!(
            edited,
            vec![SessionEvent::AmountEdited {
                index: 0,
                outcome: AmountEdit::Updated {
                    previous: 1.0,
                    current: 2.5
                }
            }]
        );
        assert_eq!(session.unit().entries()[0].amount, 2.5);

        session.dispatch(SessionCommand::DeleteEntry(0));
        assert!(session.unit().is_empty());
    }

    #[test]
    fn live_filter_hides_rows_without_touching_table() {
        let mut session = loaded();
        let events = session.dispatch(SessionCommand::SetFilter {
            column: Column::Process,
            text: "pump".to_owned(),
        });
        assert_eq!(
            events,
            vec![SessionEvent::FilterChanged {
                column: Column::Process,
                visible: 1
            }]
        );
        assert_eq!(session.visible_rows(), vec![1]);
        assert_eq!(session.displayed().len(), 2);

        // Hidden rows cannot be toggled.
        assert!(session.dispatch(SessionCommand::ToggleRow(0)).is_empty());
    }

    #[test]
    fn selection_only_transfers_visible_rows_in_toggle_order() {
        let mut session = loaded();
        session.dispatch(SessionCommand::ToggleRow(1));
        session.dispatch(SessionCommand::ToggleRow(0));
        assert_eq!(session.selection(), &[1_usize, 0]);

        session.dispatch(SessionCommand::SetFilter {
            column: Column::Location,
            text: "us".to_owned(),
        });
        session.dispatch(SessionCommand::AddSelection);
        let products = session
            .unit()
            .entries()
            .iter()
            .map(|entry| entry.product.as_str())
            .collect::<Vec<_>>();
        assert_eq!(products, vec!["Water", "Steel"]);

        session.dispatch(SessionCommand::SetFilter {
            column: Column::Product,
            text: "steel".to_owned(),
        });
        session.dispatch(SessionCommand::AddSelection);
        assert_eq!(session.unit().len(), 2);
    }

    #[test]
    fn rejected_amount_sets_warning() {
        let mut session = loaded();
        session.dispatch(SessionCommand::ToggleRow(0));
        session.dispatch(SessionCommand::AddSelection);

        session.dispatch(SessionCommand::EditAmount {
            index: 0,
            raw: "not-a-number".to_owned(),
        });
        assert_eq!(session.unit().entries()[0].amount, 1.0);
        let notice = session.notice.clone().map(|notice| notice.level);
        assert_eq!(notice, Some(NoticeLevel::Warning));
    }

    #[test]
    fn empty_table_adds_nothing() {
        let mut session = Session::default();
        assert!(session.dispatch(SessionCommand::ToggleRow(0)).is_empty());
        let events = session.dispatch(SessionCommand::AddSelection);
        assert_eq!(events[0], SessionEvent::EntriesAdded(Vec::new()));
        assert!(session.unit().is_empty());
    }

    #[test]
    fn new_database_clears_selection_but_keeps_unit() {
        let mut catalog = FakeCatalog::default();
        let mut session = loaded();
        session.dispatch(SessionCommand::ToggleRow(0));
        session.dispatch(SessionCommand::AddSelection);

        let events = session.select_database(&mut catalog, "metals");
        assert!(events.contains(&SessionEvent::SelectionChanged(0)));
        assert!(session.selection().is_empty());
        assert_eq!(session.unit().len(), 1);

        session.select_project(&mut catalog, "default");
        assert!(session.displayed().is_empty());
        assert_eq!(session.unit().len(), 1);
    }

    #[test]
    fn catalog_failure_degrades_to_empty_table_with_warning() {
        let mut catalog = FakeCatalog {
            broken_listing: true,
            ..FakeCatalog::default()
        };
        let mut session = loaded();

        let events = session.select_database(&mut catalog, "metals");
        assert!(session.displayed().is_empty());
        assert!(events.iter().any(|event| matches!(
            event,
            SessionEvent::CatalogUnavailable(message) if message.contains("is locked")
        )));
        assert_eq!(
            session.notice.as_ref().map(|notice| notice.level),
            Some(NoticeLevel::Warning)
        );

        session.select_project(&mut catalog, "missing");
        assert_eq!(session.project(), None);
        assert!(session.databases().is_empty());
    }

    #[test]
    fn clear_filters_restores_base_table() {
        let mut session = loaded();
        session.dispatch(SessionCommand::SetFilter {
            column: Column::Product,
            text: "water".to_owned(),
        });
        session.dispatch(SessionCommand::ApplyFilters);
        assert_eq!(session.displayed().len(), 1);

        session.dispatch(SessionCommand::ClearFilters);
        assert_eq!(session.displayed().len(), 2);
        assert!(session.filters().is_identity());
    }

    #[test]
    fn database_selection_loads_process_names_for_completion() {
        let session = loaded();
        assert_eq!(session.process_names(), &["Pumping".to_owned(), "Smelting".to_owned()]);
        assert_eq!(session.complete_process("sm"), Some("Smelting"));
        assert_eq!(session.complete_process("ump"), Some("Pumping"));
        assert_eq!(session.complete_process("  "), None);
        assert_eq!(session.complete_process("forge"), None);
    }

    #[test]
    fn missing_process_names_warn_but_keep_table() {
        let mut catalog = FakeCatalog {
            broken_names: true,
            ..FakeCatalog::default()
        };
        let mut session = Session::default();
        session.select_project(&mut catalog, "chemistry");
        let events = session.select_database(&mut catalog, "metals");

        assert_eq!(session.displayed().len(), 2);
        assert!(session.process_names().is_empty());
        assert!(
            events
                .iter()
                .any(|event| matches!(event, SessionEvent::CatalogUnavailable(_)))
        );
    }

    #[test]
    fn catalog_search_replaces_table_and_blank_term_restores_it() {
        let mut catalog = FakeCatalog::default();
        let mut session = loaded();
        session.dispatch(SessionCommand::ToggleRow(0));

        let events = session.search_database(&mut catalog, " WATER ");
        assert!(events.contains(&SessionEvent::Searched {
            term: "WATER".to_owned(),
            rows: 1
        }));
        assert_eq!(session.base(), &[ProcessRecord::new("Water", "Pumping", "US")]);
        assert_eq!(session.search(), Some("WATER"));
        assert!(session.selection().is_empty());

        session.search_database(&mut catalog, "");
        assert_eq!(session.displayed().len(), 2);
        assert_eq!(session.search(), None);
    }

    #[test]
    fn catalog_search_needs_a_database() {
        let mut catalog = FakeCatalog::default();
        let mut session = Session::default();
        let events = session.search_database(&mut catalog, "steel");
        assert!(matches!(events.as_slice(), [SessionEvent::NoticeSet(_)]));
        assert!(session.base().is_empty());
    }

    #[test]
    fn theme_toggles() {
        let mut session = Session::default();
        assert_eq!(
            session.dispatch(SessionCommand::ToggleTheme),
            vec![SessionEvent::ThemeChanged(Theme::Light)]
        );
    }
}
