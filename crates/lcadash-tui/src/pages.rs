// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use lcadash_app::{DEFAULT_ROUTE, Menu, MenuItem, ProcessCatalog, Route, RouteTable, Session};

pub const HOME: &str = DEFAULT_ROUTE;
pub const PROCESS_DEFINITION: &str = "modeling/process-definition";
pub const CALCULATION_SETUP: &str = "modeling/calculation-setup";
pub const IMPACT_OVERVIEW: &str = "results/impact-overview";
pub const CONTRIBUTION_ANALYSIS: &str = "results/contribution-analysis";

/// Render context handed to every page factory.
#[derive(Debug)]
pub struct Workbench<R> {
    pub session: Session,
    pub catalog: R,
}

impl<R> Workbench<R> {
    pub fn new(session: Session, catalog: R) -> Self {
        Self { session, catalog }
    }
}

/// What a container shows. Interactive panes draw from the live session
/// each frame; text panes are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Text {
        title: &'static str,
        body: &'static str,
    },
    ProcessBrowser,
    SetupSidebar,
}

impl Pane {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Text { title, .. } => title,
            Self::ProcessBrowser => "Browse Products & Processes",
            Self::SetupSidebar => "Setup",
        }
    }
}

pub fn route_table<R: ProcessCatalog>() -> Result<RouteTable<Workbench<R>, Pane>> {
    RouteTable::new(
        DEFAULT_ROUTE,
        vec![
            Route::new(HOME, home_view, home_sidebar),
            Route::new(
                PROCESS_DEFINITION,
                process_definition_view,
                process_definition_sidebar,
            ),
            Route::new(
                CALCULATION_SETUP,
                calculation_setup_view,
                calculation_setup_sidebar,
            ),
            Route::new(IMPACT_OVERVIEW, impact_overview_view, impact_overview_sidebar),
            Route::new(
                CONTRIBUTION_ANALYSIS,
                contribution_analysis_view,
                contribution_analysis_sidebar,
            ),
        ],
    )
}

pub fn menu_items() -> Vec<MenuItem> {
    vec![
        MenuItem::leaf("Home", "home", HOME),
        MenuItem::category(
            "Modeling",
            "settings",
            vec![
                MenuItem::leaf("Process Definition", "handyman", PROCESS_DEFINITION),
                MenuItem::leaf("Calculation Setup", "calculate", CALCULATION_SETUP),
            ],
        ),
        MenuItem::category(
            "Results",
            "query_stats",
            vec![
                MenuItem::leaf("Impact Overview", "leaderboard", IMPACT_OVERVIEW),
                MenuItem::leaf("Contribution Analysis", "pie_chart", CONTRIBUTION_ANALYSIS),
            ],
        ),
    ]
}

pub fn menu() -> Menu {
    Menu::new(&menu_items())
}

fn home_view<R>(_: &mut Workbench<R>) -> Result<Pane> {
    Ok(Pane::Text {
        title: "Home",
        body: "Welcome to the LCA dashboard.\n\n\
- Open Calculation Setup to choose a project and database, then filter processes.\n\
- Open Results to review impact summaries.\n\n\
Use the menu on the left to navigate.",
    })
}

fn home_sidebar<R>(_: &mut Workbench<R>) -> Result<Pane> {
    Ok(Pane::Text {
        title: "About",
        body: "This dashboard walks through an LCA workflow.\nUse the menu to navigate.",
    })
}

fn process_definition_view<R>(_: &mut Workbench<R>) -> Result<Pane> {
    Ok(Pane::Text {
        title: "Process Definition",
        body: "Define and manage LCA processes.\n\n\
- Define new processes\n\
- Edit existing process parameters\n\
- Configure process relationships",
    })
}

fn process_definition_sidebar<R>(_: &mut Workbench<R>) -> Result<Pane> {
    Ok(Pane::Text {
        title: "Process Tools",
        body: "Tools for process definition and management.",
    })
}

/// Refreshes the project list on every visit.
fn calculation_setup_view<R: ProcessCatalog>(workbench: &mut Workbench<R>) -> Result<Pane> {
    workbench.session.load_projects(&mut workbench.catalog);
    Ok(Pane::ProcessBrowser)
}

fn calculation_setup_sidebar<R>(_: &mut Workbench<R>) -> Result<Pane> {
    Ok(Pane::SetupSidebar)
}

fn impact_overview_view<R>(_: &mut Workbench<R>) -> Result<Pane> {
    Ok(Pane::Text {
        title: "Impact Overview",
        body: "Carbon footprint by life-cycle stage and product.\n\n\
Charts are produced by the results service and are not drawn in the terminal.",
    })
}

fn impact_overview_sidebar<R>(_: &mut Workbench<R>) -> Result<Pane> {
    Ok(Pane::Text {
        title: "Impact Tools",
        body: "Choose products and normalization in the results service.",
    })
}

fn contribution_analysis_view<R>(_: &mut Workbench<R>) -> Result<Pane> {
    Ok(Pane::Text {
        title: "Contribution Analysis",
        body: "Detailed contribution analysis of LCA results.\n\n\
- Analyze contributions by process\n\
- View contribution breakdowns by stage\n\
- Compare contribution patterns across products",
    })
}

fn contribution_analysis_sidebar<R>(_: &mut Workbench<R>) -> Result<Pane> {
    Ok(Pane::Text {
        title: "Analysis Tools",
        body: "Tools for detailed contribution analysis.",
    })
}
