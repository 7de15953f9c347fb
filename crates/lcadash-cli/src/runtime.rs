// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use lcadash_app::{ProcessCatalog, ProcessRecord};
use lcadash_db::{Activity, Store};
use tracing::info;

/// Serves the process catalog from the SQLite store, tracking the current
/// project the way a catalog session does.
pub struct DbRuntime<'a> {
    store: &'a Store,
    project: Option<String>,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            project: None,
        }
    }

    fn current_project(&self) -> Result<&str> {
        self.project
            .as_deref()
            .ok_or_else(|| anyhow!("no project selected"))
    }
}

impl ProcessCatalog for DbRuntime<'_> {
    fn list_projects(&mut self) -> Result<Vec<String>> {
        self.store.list_projects()
    }

    fn set_current_project(&mut self, name: &str) -> Result<()> {
        if self.store.find_project(name)?.is_none() {
            return Err(anyhow!("project `{name}` does not exist"));
        }
        info!(project = name, "current project set");
        self.project = Some(name.to_owned());
        Ok(())
    }

    fn list_databases(&mut self) -> Result<Vec<String>> {
        let project = self.current_project()?;
        self.store.list_databases(project)
    }

    fn list_processes(&mut self, database: &str) -> Result<Vec<ProcessRecord>> {
        let project = self.current_project()?;
        let activities = self.store.list_activities(project, database)?;
        Ok(activities.into_iter().map(to_record).collect())
    }

    fn search_processes(&mut self, database: &str, term: &str) -> Result<Vec<ProcessRecord>> {
        let project = self.current_project()?;
        let activities = self.store.search_activities(project, database, term)?;
        Ok(activities.into_iter().map(to_record).collect())
    }

    fn process_names(&mut self, database: &str) -> Result<Vec<String>> {
        let project = self.current_project()?;
        self.store.distinct_process_names(project, database)
    }
}

fn to_record(activity: Activity) -> ProcessRecord {
    ProcessRecord::from_listing(activity.reference_product, activity.name, activity.location)
}

#[cfg(test)]
mod tests {
    use super::DbRuntime;
    use anyhow::Result;
    use lcadash_app::{ProcessCatalog, ProcessRecord, Session};
    use lcadash_db::{DEMO_PROJECT, NewActivity, Store};

    fn seeded_store() -> Result<Store> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        store.seed_demo_project()?;
        Ok(store)
    }

    #[test]
    fn databases_need_a_current_project() -> Result<()> {
        let store = seeded_store()?;
        let mut runtime = DbRuntime::new(&store);

        let error = runtime
            .list_databases()
            .expect_err("listing without a project should fail");
        assert!(error.to_string().contains("no project selected"));

        runtime.set_current_project(DEMO_PROJECT)?;
        assert_eq!(
            runtime.list_databases()?,
            vec!["chemistry-processes", "biosphere"]
        );
        Ok(())
    }

    #[test]
    fn unknown_project_is_rejected_and_keeps_previous() -> Result<()> {
        let store = seeded_store()?;
        let mut runtime = DbRuntime::new(&store);
        runtime.set_current_project(DEMO_PROJECT)?;

        let error = runtime
            .set_current_project("missing")
            .expect_err("unknown project should fail");
        assert!(error.to_string().contains("does not exist"));
        assert!(runtime.list_databases().is_ok());
        Ok(())
    }

    #[test]
    fn processes_blank_missing_fields() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        let project = store.create_project("demo")?;
        let database = store.create_database(project, "flows")?;
        store.insert_activity(
            database,
            &NewActivity {
                name: "Carbon dioxide, fossil".to_owned(),
                reference_product: None,
                location: None,
            },
        )?;

        let mut runtime = DbRuntime::new(&store);
        runtime.set_current_project("demo")?;
        assert_eq!(
            runtime.list_processes("flows")?,
            vec![ProcessRecord::new("", "Carbon dioxide, fossil", "")]
        );
        Ok(())
    }

    #[test]
    fn search_and_names_come_from_the_store() -> Result<()> {
        let store = seeded_store()?;
        let mut runtime = DbRuntime::new(&store);
        runtime.set_current_project(DEMO_PROJECT)?;

        let steel = runtime.search_processes("chemistry-processes", "STEEL")?;
        assert!(steel.iter().any(|record| record.process == "Smelting"));
        assert!(steel.iter().all(|record| {
            record.product.to_lowercase().contains("steel")
                || record.process.to_lowercase().contains("steel")
        }));

        let names = runtime.process_names("chemistry-processes")?;
        assert!(names.contains(&"Smelting".to_owned()));
        assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
        Ok(())
    }

    #[test]
    fn session_loads_demo_catalog_through_runtime() -> Result<()> {
        let store = seeded_store()?;
        let mut runtime = DbRuntime::new(&store);
        let mut session = Session::default();

        session.load_projects(&mut runtime);
        session.select_project(&mut runtime, DEMO_PROJECT);
        session.select_database(&mut runtime, "chemistry-processes");

        assert_eq!(session.database(), Some("chemistry-processes"));
        assert!(
            session
                .displayed()
                .iter()
                .any(|record| record.product == "Steel" && record.process == "Smelting")
        );
        assert_eq!(session.complete_process("smel"), Some("Smelting"));

        session.search_database(&mut runtime, "water");
        assert_eq!(session.search(), Some("water"));
        assert!(
            session
                .displayed()
                .iter()
                .any(|record| record.process == "Pumping")
        );
        Ok(())
    }
}
