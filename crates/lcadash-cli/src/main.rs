// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use lcadash_db::Store;
use lcadash_tui::{App, UiOptions};
use runtime::DbRuntime;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `lcadash --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    init_logging(&config)?;

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or LCADASH_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    if options.demo && store.seed_demo_project()? {
        info!(project = lcadash_db::DEMO_PROJECT, "seeded demo project");
    }

    let ui_options = UiOptions {
        scheme: config.route_scheme(),
        start: options
            .route
            .clone()
            .unwrap_or_else(|| config.start_address().to_owned()),
        theme: config.theme(),
        theme_poll: config.theme_poll()?,
    };
    let mut app = App::new(DbRuntime::new(&store), &ui_options)
        .context("build dashboard navigation")?;
    if options.check_only {
        let (internal_tx, _internal_rx) = std::sync::mpsc::channel();
        app.start(&internal_tx)?;
        println!(
            "ok: {} routes, start page `{}`",
            app.router().table().len(),
            app.router().current_path()
        );
        return Ok(());
    }

    info!(
        scheme = ui_options.scheme.as_str(),
        start = %ui_options.start,
        "starting dashboard"
    );
    lcadash_tui::run_app(&mut app)
}

fn init_logging(config: &Config) -> Result<()> {
    let log_path = config.log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    route: Option<String>,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        route: None,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--route" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("--route requires an address, for example #home")
                })?;
                options.route = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("lcadash");
    println!("  --config <path>          Use a specific config path");
    println!("  --route <address>        Open at an address (for example #modeling/calculation-setup)");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with the seeded demo project (in-memory)");
    println!("  --check                  Validate config, database, routes and menu, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use lcadash_db::Store;
    use lcadash_tui::{App, CALCULATION_SETUP, UiOptions};
    use std::path::PathBuf;

    use crate::runtime::DbRuntime;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/lcadash-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                route: None,
                print_config_path: false,
                print_db_path: false,
                demo: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_and_route() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml", "--route", "#results/impact-overview"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(options.route.as_deref(), Some("#results/impact-overview"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--route"], default_options_path())
            .expect_err("missing route value should fail");
        assert!(error.to_string().contains("--route requires an address"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--demo", "--print-path", "--check", "-h"],
            default_options_path(),
        )?;
        assert!(options.demo);
        assert!(options.print_db_path);
        assert!(options.check_only);
        assert!(options.show_help);
        assert!(!options.print_config_path);
        assert!(!options.print_example);
        Ok(())
    }

    #[test]
    fn demo_store_starts_on_a_deep_link() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        store.seed_demo_project()?;

        let (tx, _rx) = std::sync::mpsc::channel();
        let mut app = App::new(
            DbRuntime::new(&store),
            &UiOptions {
                start: "#modeling/calculation-setup".to_owned(),
                ..UiOptions::default()
            },
        )?;
        app.start(&tx)?;

        assert_eq!(app.router().current_path(), CALCULATION_SETUP);
        assert_eq!(app.session().projects(), &[lcadash_db::DEMO_PROJECT.to_owned()]);
        Ok(())
    }
}
