// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use lcadash_app::{ActivityId, DatabaseId, ProjectId};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

pub const APP_NAME: &str = "lcadash";
pub const DEMO_PROJECT: &str = "chemistry";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("projects", &["id", "name", "created_at"]),
    ("databases", &["id", "project_id", "name", "created_at"]),
    (
        "activities",
        &[
            "id",
            "database_id",
            "name",
            "reference_product",
            "location",
            "created_at",
        ],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_databases_project_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_databases_project_id ON databases (project_id);",
    },
    RequiredIndex {
        name: "idx_activities_database_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_activities_database_id ON activities (database_id);",
    },
];

// (database, [(process, reference product, location)]), oldest database first.
type DemoActivity = (&'static str, Option<&'static str>, Option<&'static str>);
const DEMO_DATABASES: &[(&str, &[DemoActivity])] = &[
    (
        "biosphere",
        &[
            ("Carbon dioxide, fossil", None, None),
            ("Methane, fossil", None, None),
            ("Water, river", None, Some("GLO")),
            ("Sulfur dioxide", None, None),
        ],
    ),
    (
        "chemistry-processes",
        &[
            ("Smelting", Some("Steel"), Some("US")),
            ("Pumping", Some("Water"), Some("US")),
            ("steel production, electric arc furnace", Some("steel, low-alloyed"), Some("DE")),
            ("market for electricity, medium voltage", Some("electricity, medium voltage"), Some("DE")),
            ("market for electricity, medium voltage", Some("electricity, medium voltage"), Some("FR")),
            ("chlor-alkali electrolysis, membrane cell", Some("sodium hydroxide"), Some("RER")),
            ("ammonia production, steam reforming", Some("ammonia, anhydrous, liquid"), Some("RER")),
            ("tap water production, conventional treatment", Some("tap water"), Some("CH")),
            ("hydrogen production, steam methane reforming", Some("hydrogen, gaseous"), None),
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    pub reference_product: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewActivity {
    pub name: String,
    pub reference_product: Option<String>,
    pub location: Option<String>,
}

/// Substring criteria for [`Store::filter_activities`]. Blank fields match
/// everything; absent product or location values compare as empty text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityFilter {
    pub name: String,
    pub product: String,
    pub location: String,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
            debug!("created catalog schema");
        }

        ensure_required_indexes(&self.conn)
    }

    pub fn create_project(&self, name: &str) -> Result<ProjectId> {
        let name = name.trim();
        if name.is_empty() {
            bail!("project name must not be blank");
        }
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "INSERT INTO projects (name, created_at) VALUES (?, ?)",
                params![name, now],
            )
            .with_context(|| format!("insert project `{name}`"))?;
        Ok(ProjectId::new(self.conn.last_insert_rowid()))
    }

    pub fn find_project(&self, name: &str) -> Result<Option<ProjectId>> {
        self.conn
            .query_row(
                "SELECT id FROM projects WHERE name = ?",
                params![name],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .with_context(|| format!("look up project `{name}`"))
            .map(|id| id.map(ProjectId::new))
    }

    pub fn create_database(&self, project_id: ProjectId, name: &str) -> Result<DatabaseId> {
        let name = name.trim();
        if name.is_empty() {
            bail!("database name must not be blank");
        }
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "INSERT INTO databases (project_id, name, created_at) VALUES (?, ?, ?)",
                params![project_id.get(), name, now],
            )
            .with_context(|| format!("insert database `{name}`"))?;
        Ok(DatabaseId::new(self.conn.last_insert_rowid()))
    }

    pub fn insert_activity(&self, database_id: DatabaseId, activity: &NewActivity) -> Result<ActivityId> {
        if activity.name.trim().is_empty() {
            bail!("activity name must not be blank");
        }
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO activities (
                  database_id, name, reference_product, location, created_at
                ) VALUES (?, ?, ?, ?, ?)
                ",
                params![
                    database_id.get(),
                    activity.name,
                    activity.reference_product,
                    activity.location,
                    now,
                ],
            )
            .with_context(|| format!("insert activity `{}`", activity.name))?;
        Ok(ActivityId::new(self.conn.last_insert_rowid()))
    }

    pub fn list_projects(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM projects ORDER BY name ASC")
            .context("prepare projects query")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("query projects")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect projects")
    }

    /// Newest database first.
    pub fn list_databases(&self, project: &str) -> Result<Vec<String>> {
        let project_id = self.require_project(project)?;
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT name
                FROM databases
                WHERE project_id = ?
                ORDER BY id DESC
                ",
            )
            .context("prepare databases query")?;
        let rows = stmt
            .query_map(params![project_id.get()], |row| row.get::<_, String>(0))
            .with_context(|| format!("query databases of `{project}`"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("collect databases of `{project}`"))
    }

    pub fn list_activities(&self, project: &str, database: &str) -> Result<Vec<Activity>> {
        self.filter_activities(project, database, &ActivityFilter::default())
    }

    /// Case-insensitive match of `term` against name or reference product.
    pub fn search_activities(&self, project: &str, database: &str, term: &str) -> Result<Vec<Activity>> {
        let database_id = self.require_database(project, database)?;
        self.query_activities(
            "
            WHERE database_id = ?1
              AND (
                instr(lower(name), lower(?2)) > 0
                OR instr(lower(coalesce(reference_product, '')), lower(?2)) > 0
              )
            ",
            params![database_id.get(), term.trim()],
        )
        .with_context(|| format!("search `{database}` for {term:?}"))
    }

    pub fn filter_activities(
        &self,
        project: &str,
        database: &str,
        filter: &ActivityFilter,
    ) -> Result<Vec<Activity>> {
        let database_id = self.require_database(project, database)?;
        self.query_activities(
            "
            WHERE database_id = ?1
              AND instr(lower(name), lower(?2)) > 0
              AND instr(lower(coalesce(reference_product, '')), lower(?3)) > 0
              AND instr(lower(coalesce(location, '')), lower(?4)) > 0
            ",
            params![
                database_id.get(),
                filter.name,
                filter.product,
                filter.location,
            ],
        )
        .with_context(|| format!("list activities of `{database}`"))
    }

    pub fn distinct_process_names(&self, project: &str, database: &str) -> Result<Vec<String>> {
        let database_id = self.require_database(project, database)?;
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT DISTINCT name
                FROM activities
                WHERE database_id = ?
                ORDER BY name ASC
                ",
            )
            .context("prepare process names query")?;
        let rows = stmt
            .query_map(params![database_id.get()], |row| row.get::<_, String>(0))
            .context("query process names")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect process names")
    }

    /// Creates the demo project with a biosphere and a process database.
    /// Returns false when the project already exists.
    pub fn seed_demo_project(&self) -> Result<bool> {
        if self.find_project(DEMO_PROJECT)?.is_some() {
            return Ok(false);
        }

        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin demo seed")?;
        let project_id = self.create_project(DEMO_PROJECT)?;
        for (database, activities) in DEMO_DATABASES {
            let database_id = self.create_database(project_id, database)?;
            for (name, product, location) in *activities {
                self.insert_activity(
                    database_id,
                    &NewActivity {
                        name: (*name).to_owned(),
                        reference_product: product.map(str::to_owned),
                        location: location.map(str::to_owned),
                    },
                )?;
            }
        }
        tx.commit().context("commit demo seed")?;
        info!(project = DEMO_PROJECT, "seeded demo project");
        Ok(true)
    }

    fn require_project(&self, project: &str) -> Result<ProjectId> {
        self.find_project(project)?
            .ok_or_else(|| anyhow!("project `{project}` does not exist"))
    }

    fn require_database(&self, project: &str, database: &str) -> Result<DatabaseId> {
        let project_id = self.require_project(project)?;
        let id = self
            .conn
            .query_row(
                "SELECT id FROM databases WHERE project_id = ? AND name = ?",
                params![project_id.get(), database],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .with_context(|| format!("look up database `{database}`"))?;
        id.map(DatabaseId::new)
            .ok_or_else(|| anyhow!("database `{database}` does not exist in project `{project}`"))
    }

    fn query_activities(
        &self,
        where_clause: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Activity>> {
        let sql = format!(
            "
            SELECT id, name, reference_product, location
            FROM activities
            {where_clause}
            ORDER BY id ASC
            "
        );
        let mut stmt = self.conn.prepare(&sql).context("prepare activities query")?;
        let rows = stmt
            .query_map(params, |row| {
                Ok(Activity {
                    id: ActivityId::new(row.get(0)?),
                    name: row.get(1)?,
                    reference_product: row.get(2)?,
                    location: row.get(3)?,
                })
            })
            .context("query activities")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect activities")
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("LCADASH_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set LCADASH_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("lcadash.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        let columns = table_columns(conn, table)?;
        if columns.is_empty() {
            bail!(
                "database is missing required table `{table}`; point storage.db_path at an lcadash catalog"
            );
        }

        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();
        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; the file was not created by lcadash",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}
