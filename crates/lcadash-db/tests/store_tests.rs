// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use lcadash_db::{ActivityFilter, DEMO_PROJECT, NewActivity, Store, validate_db_path};
use lcadash_testkit::{ProcessFaker, temp_db_path};

fn activity(name: &str, product: Option<&str>, location: Option<&str>) -> NewActivity {
    NewActivity {
        name: name.to_owned(),
        reference_product: product.map(str::to_owned),
        location: location.map(str::to_owned),
    }
}

fn steel_and_water_store() -> Result<Store> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    let project = store.create_project("demo")?;
    let database = store.create_database(project, "metals")?;
    store.insert_activity(database, &activity("Smelting", Some("Steel"), Some("US")))?;
    store.insert_activity(database, &activity("Pumping", Some("Water"), Some("US")))?;
    store.insert_activity(database, &activity("Carbon dioxide, fossil", None, None))?;
    Ok(store)
}

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("").is_err());
    assert!(validate_db_path(":memory:").is_ok());
    assert!(validate_db_path("/tmp/lcadash.db").is_ok());
}

#[test]
fn bootstrap_is_repeatable_on_disk() -> Result<()> {
    let (_dir, path) = temp_db_path()?;
    {
        let store = Store::open(&path)?;
        store.bootstrap()?;
        store.create_project("demo")?;
    }

    let reopened = Store::open(&path)?;
    reopened.bootstrap()?;
    assert_eq!(reopened.list_projects()?, vec!["demo"]);
    Ok(())
}

#[test]
fn bootstrap_rejects_foreign_schema() -> Result<()> {
    let store = Store::open_memory()?;
    store
        .raw_connection()
        .execute_batch("CREATE TABLE projects (id INTEGER PRIMARY KEY, title TEXT);")?;

    let error = store
        .bootstrap()
        .expect_err("foreign schema should be rejected");
    assert!(error.to_string().contains("missing required columns"));
    Ok(())
}

#[test]
fn databases_list_newest_first() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    let project = store.create_project("demo")?;
    store.create_database(project, "biosphere")?;
    store.create_database(project, "processes")?;

    assert_eq!(store.list_databases("demo")?, vec!["processes", "biosphere"]);
    Ok(())
}

#[test]
fn unknown_project_or_database_is_an_error() -> Result<()> {
    let store = steel_and_water_store()?;

    let missing_project = store
        .list_databases("nope")
        .expect_err("unknown project should fail");
    assert!(missing_project.to_string().contains("project `nope` does not exist"));

    let missing_database = store
        .list_activities("demo", "nope")
        .expect_err("unknown database should fail");
    assert!(format!("{missing_database:#}").contains("database `nope` does not exist"));
    Ok(())
}

#[test]
fn duplicate_names_are_rejected() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    let project = store.create_project("demo")?;
    assert!(store.create_project("demo").is_err());
    store.create_database(project, "metals")?;
    assert!(store.create_database(project, "metals").is_err());
    assert!(store.create_project("   ").is_err());
    Ok(())
}

#[test]
fn listing_keeps_missing_fields_absent() -> Result<()> {
    let store = steel_and_water_store()?;
    let activities = store.list_activities("demo", "metals")?;

    assert_eq!(activities.len(), 3);
    assert_eq!(activities[0].reference_product.as_deref(), Some("Steel"));
    assert_eq!(activities[2].reference_product, None);
    assert_eq!(activities[2].location, None);
    Ok(())
}

#[test]
fn search_matches_name_or_product_case_insensitively() -> Result<()> {
    let store = steel_and_water_store()?;

    let by_product = store.search_activities("demo", "metals", "STEEL")?;
    assert_eq!(by_product.len(), 1);
    assert_eq!(by_product[0].name, "Smelting");

    let by_name = store.search_activities("demo", "metals", "carbon")?;
    assert_eq!(by_name.len(), 1);
    Ok(())
}

#[test]
fn filter_combines_fields_and_treats_missing_as_empty() -> Result<()> {
    let store = steel_and_water_store()?;

    let us = store.filter_activities(
        "demo",
        "metals",
        &ActivityFilter {
            location: "us".to_owned(),
            ..ActivityFilter::default()
        },
    )?;
    assert_eq!(us.len(), 2);

    let pumped_water = store.filter_activities(
        "demo",
        "metals",
        &ActivityFilter {
            name: "pump".to_owned(),
            product: "water".to_owned(),
            location: "US".to_owned(),
        },
    )?;
    assert_eq!(pumped_water.len(), 1);
    assert_eq!(pumped_water[0].name, "Pumping");

    let all = store.filter_activities("demo", "metals", &ActivityFilter::default())?;
    assert_eq!(all.len(), 3);
    Ok(())
}

#[test]
fn distinct_process_names_are_sorted_and_unique() -> Result<()> {
    let store = steel_and_water_store()?;
    let project = store
        .find_project("demo")?
        .context("demo project should exist")?;

    let mut faker = ProcessFaker::new(11);
    let listing = faker.listing();
    let extra = store.create_database(project, "generated")?;
    for _ in 0..3 {
        store.insert_activity(
            extra,
            &NewActivity {
                name: listing.name.clone(),
                reference_product: listing.reference_product.clone(),
                location: listing.location.clone(),
            },
        )?;
    }

    assert_eq!(store.distinct_process_names("demo", "generated")?, vec![listing.name]);
    assert_eq!(
        store.distinct_process_names("demo", "metals")?,
        vec!["Carbon dioxide, fossil", "Pumping", "Smelting"]
    );
    Ok(())
}

#[test]
fn demo_seed_is_idempotent() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    assert!(store.seed_demo_project()?);
    assert!(!store.seed_demo_project()?);

    assert_eq!(store.list_projects()?, vec![DEMO_PROJECT]);
    let databases = store.list_databases(DEMO_PROJECT)?;
    assert_eq!(databases, vec!["chemistry-processes", "biosphere"]);

    let steel = store.filter_activities(
        DEMO_PROJECT,
        "chemistry-processes",
        &ActivityFilter {
            product: "steel".to_owned(),
            ..ActivityFilter::default()
        },
    )?;
    assert!(steel.iter().any(|activity| activity.name == "Smelting"));
    Ok(())
}
