// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use lcadash_app::{ProcessCatalog, ProcessRecord};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

const PRODUCTS: [&str; 14] = [
    "steel, low-alloyed",
    "aluminium, primary",
    "cement, Portland",
    "electricity, medium voltage",
    "heat, district or industrial",
    "tap water",
    "sodium hydroxide",
    "ammonia, anhydrous, liquid",
    "hydrogen, gaseous",
    "polyethylene, high density",
    "glass fibre",
    "diesel",
    "transport, freight, lorry",
    "sulfuric acid",
];

const ACTIVITY_VERBS: [&str; 8] = [
    "production",
    "market for",
    "treatment of",
    "processing",
    "electrolysis",
    "synthesis",
    "recycling of",
    "distribution",
];

const ROUTES: [&str; 10] = [
    "conventional",
    "electric arc furnace",
    "steam reforming",
    "membrane cell",
    "average technology",
    "cut-off",
    "high voltage",
    "from natural gas",
    "blast furnace",
    "Contact process",
];

const LOCATIONS: [&str; 12] = [
    "GLO", "RER", "RoW", "US", "CH", "DE", "FR", "CN", "IN", "BR", "JP", "CA",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn chance(&mut self, one_in: u64) -> bool {
        one_in > 0 && self.next_u64() % one_in == 0
    }
}

/// A listing row as a catalog stores it, before missing fields are blanked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeListing {
    pub name: String,
    pub reference_product: Option<String>,
    pub location: Option<String>,
}

impl FakeListing {
    pub fn to_record(&self) -> ProcessRecord {
        ProcessRecord::from_listing(
            self.reference_product.clone(),
            self.name.clone(),
            self.location.clone(),
        )
    }
}

/// Seeded generator of plausible inventory processes.
#[derive(Debug, Clone)]
pub struct ProcessFaker {
    rng: DeterministicRng,
}

impl ProcessFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    /// About one listing in eight lacks a location and one in ten lacks a
    /// reference product, the way elementary flows do.
    pub fn listing(&mut self) -> FakeListing {
        let product = self.pick(&PRODUCTS);
        let name = format!(
            "{} {}, {}",
            product,
            self.pick(&ACTIVITY_VERBS),
            self.pick(&ROUTES)
        );
        let reference_product = (!self.rng.chance(10)).then(|| product.to_owned());
        let location = (!self.rng.chance(8)).then(|| self.pick(&LOCATIONS).to_owned());
        FakeListing {
            name,
            reference_product,
            location,
        }
    }

    pub fn record(&mut self) -> ProcessRecord {
        ProcessRecord::new(
            self.pick(&PRODUCTS),
            format!("{} {}", self.pick(&ACTIVITY_VERBS), self.pick(&ROUTES)),
            self.pick(&LOCATIONS),
        )
    }

    pub fn records(&mut self, count: usize) -> Vec<ProcessRecord> {
        (0..count).map(|_| self.record()).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

pub fn steel_and_water() -> Vec<ProcessRecord> {
    vec![
        ProcessRecord::new("Steel", "Smelting", "US"),
        ProcessRecord::new("Water", "Pumping", "US"),
    ]
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("lcadash.db");
    Ok((dir, db_path))
}

/// In-memory [`ProcessCatalog`] for UI and session tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    // project -> databases in display order
    projects: BTreeMap<String, Vec<(String, Vec<ProcessRecord>)>>,
    current: Option<String>,
    failing: BTreeSet<String>,
    requests: Vec<String>,
}

impl MemoryCatalog {
    /// One project, `demo`, holding the Steel/Water table in `metals`.
    pub fn steel_and_water() -> Self {
        let mut catalog = Self::default();
        catalog.add_database("demo", "metals", steel_and_water());
        catalog
    }

    pub fn add_database(
        &mut self,
        project: &str,
        database: &str,
        rows: Vec<ProcessRecord>,
    ) -> &mut Self {
        self.projects
            .entry(project.to_owned())
            .or_default()
            .push((database.to_owned(), rows));
        self
    }

    /// Listing `database` fails from now on.
    pub fn fail_database(&mut self, database: &str) -> &mut Self {
        self.failing.insert(database.to_owned());
        self
    }

    pub fn current_project(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Every catalog call in order, for asserting on lazy loading.
    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    fn rows(&self, database: &str) -> Result<&[ProcessRecord]> {
        if self.failing.contains(database) {
            bail!("database `{database}` is unavailable");
        }
        self.databases()?
            .iter()
            .find(|(name, _)| name == database)
            .map(|(_, rows)| rows.as_slice())
            .ok_or_else(|| anyhow!("database `{database}` does not exist"))
    }

    fn databases(&self) -> Result<&[(String, Vec<ProcessRecord>)]> {
        let project = self
            .current
            .as_deref()
            .ok_or_else(|| anyhow!("no project selected"))?;
        self.projects
            .get(project)
            .map(Vec::as_slice)
            .ok_or_else(|| anyhow!("project `{project}` does not exist"))
    }
}

impl ProcessCatalog for MemoryCatalog {
    fn list_projects(&mut self) -> Result<Vec<String>> {
        self.requests.push("list_projects".to_owned());
        Ok(self.projects.keys().cloned().collect())
    }

    fn set_current_project(&mut self, name: &str) -> Result<()> {
        self.requests.push(format!("set_current_project {name}"));
        if !self.projects.contains_key(name) {
            bail!("project `{name}` does not exist");
        }
        self.current = Some(name.to_owned());
        Ok(())
    }

    fn list_databases(&mut self) -> Result<Vec<String>> {
        self.requests.push("list_databases".to_owned());
        Ok(self
            .databases()?
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn list_processes(&mut self, database: &str) -> Result<Vec<ProcessRecord>> {
        self.requests.push(format!("list_processes {database}"));
        Ok(self.rows(database)?.to_vec())
    }

    fn search_processes(&mut self, database: &str, term: &str) -> Result<Vec<ProcessRecord>> {
        self.requests.push(format!("search_processes {database} {term}"));
        let term = term.trim().to_lowercase();
        Ok(self
            .rows(database)?
            .iter()
            .filter(|record| {
                record.process.to_lowercase().contains(&term)
                    || record.product.to_lowercase().contains(&term)
            })
            .cloned()
            .collect())
    }

    fn process_names(&mut self, database: &str) -> Result<Vec<String>> {
        self.requests.push(format!("process_names {database}"));
        let names = self
            .rows(database)?
            .iter()
            .map(|record| record.process.clone())
            .collect::<BTreeSet<_>>();
        Ok(names.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryCatalog, ProcessFaker, steel_and_water};
    use anyhow::Result;
    use lcadash_app::ProcessCatalog;
    use std::collections::BTreeSet;

    #[test]
    fn same_seed_same_records() {
        let first = ProcessFaker::new(7).records(5);
        let second = ProcessFaker::new(7).records(5);
        assert_eq!(first, second);
    }

    #[test]
    fn variety_across_seeds() {
        let mut products = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            products.insert(ProcessFaker::new(seed).record().product);
        }
        assert!(products.len() >= 5, "got {}", products.len());
    }

    #[test]
    fn listings_sometimes_lack_optional_fields() {
        let mut faker = ProcessFaker::new(3);
        let listings = (0..200).map(|_| faker.listing()).collect::<Vec<_>>();
        assert!(listings.iter().any(|listing| listing.location.is_none()));
        assert!(listings.iter().any(|listing| listing.reference_product.is_none()));

        let blank = listings
            .iter()
            .find(|listing| listing.location.is_none())
            .map(|listing| listing.to_record().location);
        assert_eq!(blank.as_deref(), Some(""));
    }

    #[test]
    fn int_n() {
        let mut faker = ProcessFaker::new(42);
        for _ in 0..100 {
            assert!(faker.int_n(5) < 5);
        }
    }

    #[test]
    fn memory_catalog_requires_a_current_project() -> Result<()> {
        let mut catalog = MemoryCatalog::steel_and_water();
        assert!(catalog.list_databases().is_err());

        catalog.set_current_project("demo")?;
        assert_eq!(catalog.list_databases()?, vec!["metals"]);
        assert_eq!(catalog.list_processes("metals")?, steel_and_water());

        assert_eq!(catalog.search_processes("metals", " PUMP")?.len(), 1);
        assert_eq!(catalog.process_names("metals")?, vec!["Pumping", "Smelting"]);

        catalog.fail_database("metals");
        let error = catalog
            .list_processes("metals")
            .expect_err("failing database should error");
        assert!(error.to_string().contains("unavailable"));
        Ok(())
    }
}
