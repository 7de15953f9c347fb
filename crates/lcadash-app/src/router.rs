// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use tracing::{debug, warn};

use crate::{
    HighlightOutcome, Location, Menu, MenuNodeId, RouteScheme, RouteTable, clean_path,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub current_path: String,
}

/// The two render targets. Either both hold content from the same route or
/// both are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Containers<V> {
    pub main: Option<V>,
    pub sidebar: Option<V>,
}

impl<V> Default for Containers<V> {
    fn default() -> Self {
        Self {
            main: None,
            sidebar: None,
        }
    }
}

impl<V> Containers<V> {
    pub fn populated(&self) -> bool {
        self.main.is_some() && self.sidebar.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    RouteChanged { from: Option<String>, to: String },
    AlreadyCurrent { path: String },
    UnknownRoute { requested: String, substituted: String },
    RenderFailed { path: String, error: String },
    FellBackToDefault { from: String },
    Highlight(HighlightOutcome),
}

pub struct Router<C, V> {
    table: RouteTable<C, V>,
    scheme: RouteScheme,
    menu: Menu,
    state: NavigationState,
    containers: Containers<V>,
}

impl<C, V> Router<C, V> {
    /// Fails when a menu leaf points at a route the table does not know.
    pub fn new(table: RouteTable<C, V>, scheme: RouteScheme, menu: Menu) -> Result<Self> {
        menu.validate(|path| table.contains(path))
            .context("menu does not match the route table")?;
        let state = NavigationState {
            current_path: table.default_path().to_owned(),
        };
        Ok(Self {
            table,
            scheme,
            menu,
            state,
            containers: Containers::default(),
        })
    }

    pub fn table(&self) -> &RouteTable<C, V> {
        &self.table
    }

    pub fn scheme(&self) -> RouteScheme {
        self.scheme
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn current_path(&self) -> &str {
        &self.state.current_path
    }

    pub fn containers(&self) -> &Containers<V> {
        &self.containers
    }

    pub fn address_for(&self, path: &str) -> String {
        self.scheme.encode(clean_path(path))
    }

    /// Renders the deep-linked route, or the default route when there is no
    /// location to read.
    pub fn start(&mut self, ctx: &mut C, location: Option<&dyn Location>) -> Result<Vec<NavEvent>> {
        match location {
            Some(location) => self.on_location_changed(&location.read(), ctx),
            None => {
                let default = self.table.default_path().to_owned();
                self.navigate(&default, ctx)
            }
        }
    }

    pub fn on_location_changed(&mut self, address: &str, ctx: &mut C) -> Result<Vec<NavEvent>> {
        let raw = self.scheme.decode(address);
        self.navigate(&raw, ctx)
    }

    /// Resolves `raw`, renders it unless it is already on screen, and moves
    /// the menu highlight. Only a failing default route is an error.
    pub fn navigate(&mut self, raw: &str, ctx: &mut C) -> Result<Vec<NavEvent>> {
        let resolution = self.table.resolve(raw);
        let known = resolution.known();
        let requested = resolution.requested.clone();
        let target = resolution.path.to_owned();

        let mut events = Vec::new();
        if !known {
            debug!(requested = %requested, substituted = %target, "unknown route");
            events.push(NavEvent::UnknownRoute {
                requested: requested.clone(),
                substituted: target.clone(),
            });
        }

        if target == self.state.current_path && self.containers.populated() {
            events.push(NavEvent::AlreadyCurrent {
                path: target.clone(),
            });
        } else {
            let rendered = self.render(&target, ctx, &mut events)?;
            if rendered != target {
                let outcome = self.menu.highlight(&rendered);
                events.push(NavEvent::Highlight(outcome));
                return Ok(events);
            }
        }

        // Unknown requests highlight what was asked for, which matches no
        // menu item and clears the highlight.
        let highlight_key = if known { target } else { requested };
        let outcome = self.menu.highlight(&highlight_key);
        debug!(path = %highlight_key, ?outcome, "menu highlight");
        events.push(NavEvent::Highlight(outcome));
        Ok(events)
    }

    /// Writes the encoded path to the location. The change notification
    /// brings the router back through [`Router::on_location_changed`].
    pub fn set_route(&self, path: &str, location: &mut dyn Location) {
        let address = self.address_for(path);
        debug!(%address, "writing location");
        location.write(&address);
    }

    /// Returns false for category headers and unknown nodes.
    pub fn menu_click(&self, id: MenuNodeId, location: &mut dyn Location) -> bool {
        let Some(path) = self.menu.click(id) else {
            return false;
        };
        self.set_route(path, location);
        true
    }

    /// Returns the path that ended up on screen.
    fn render(&mut self, path: &str, ctx: &mut C, events: &mut Vec<NavEvent>) -> Result<String> {
        let first_error = match self.build(path, ctx) {
            Ok(built) => {
                self.swap(path, built, events);
                return Ok(path.to_owned());
            }
            Err(error) => error,
        };

        let message = format!("{first_error:#}");
        warn!(route = path, error = %message, "route failed to render");
        events.push(NavEvent::RenderFailed {
            path: path.to_owned(),
            error: message,
        });

        let default = self.table.default_path().to_owned();
        if path == default {
            return Err(first_error.context(format!("default route `{default}` failed to render")));
        }

        let built = self
            .build(&default, ctx)
            .with_context(|| format!("default route `{default}` failed to render"))?;
        events.push(NavEvent::FellBackToDefault {
            from: path.to_owned(),
        });
        self.swap(&default, built, events);
        Ok(default)
    }

    fn build(&self, path: &str, ctx: &mut C) -> Result<(V, V)> {
        let route = self
            .table
            .get(path)
            .ok_or_else(|| anyhow!("route `{path}` is not registered"))?;
        let (view, sidebar) = route.factories();
        let main = view(ctx).with_context(|| format!("build view for `{path}`"))?;
        let side = sidebar(ctx).with_context(|| format!("build sidebar for `{path}`"))?;
        Ok((main, side))
    }

    fn swap(&mut self, path: &str, (main, sidebar): (V, V), events: &mut Vec<NavEvent>) {
        let from = self
            .containers
            .populated()
            .then(|| self.state.current_path.clone());
        self.containers = Containers {
            main: Some(main),
            sidebar: Some(sidebar),
        };
        self.state.current_path = path.to_owned();
        debug!(from = ?from, to = path, "route rendered");
        events.push(NavEvent::RouteChanged {
            from,
            to: path.to_owned(),
        });
    }
}
