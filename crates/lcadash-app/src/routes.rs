// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::collections::BTreeSet;
use std::fmt;

pub const DEFAULT_ROUTE: &str = "home";

/// Builds one container's content for a route. All state comes in through
/// the context; nothing is captured.
pub type Factory<C, V> = fn(&mut C) -> Result<V>;

pub struct Route<C, V> {
    path: String,
    view: Factory<C, V>,
    sidebar: Factory<C, V>,
}

impl<C, V> Route<C, V> {
    pub fn new(path: impl Into<String>, view: Factory<C, V>, sidebar: Factory<C, V>) -> Self {
        Self {
            path: path.into(),
            view,
            sidebar,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn factories(&self) -> (Factory<C, V>, Factory<C, V>) {
        (self.view, self.sidebar)
    }
}

impl<C, V> fmt::Debug for Route<C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("path", &self.path).finish()
    }
}

/// Strips leading `#`/`/` delimiters, trailing slashes and surrounding
/// whitespace. Does not consult any table.
pub fn clean_path(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches(['#', '/'])
        .trim_end_matches('/')
        .trim()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub requested: String,
    pub path: &'a str,
}

impl Resolution<'_> {
    pub fn known(&self) -> bool {
        self.requested == self.path
    }
}

pub struct RouteTable<C, V> {
    routes: Vec<Route<C, V>>,
    default_index: usize,
}

impl<C, V> fmt::Debug for RouteTable<C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes)
            .field("default", &self.default_path())
            .finish()
    }
}

impl<C, V> RouteTable<C, V> {
    pub fn new(default_path: &str, routes: Vec<Route<C, V>>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for route in &routes {
            if route.path.is_empty() || clean_path(&route.path) != route.path {
                bail!(
                    "route path {:?} is not normalized; drop leading `#`/`/` and trailing slashes",
                    route.path
                );
            }
            if !seen.insert(route.path.as_str()) {
                bail!("route `{}` is registered twice", route.path);
            }
        }

        let Some(default_index) = routes.iter().position(|route| route.path == default_path)
        else {
            bail!("default route `{default_path}` is not registered");
        };

        Ok(Self {
            routes,
            default_index,
        })
    }

    pub fn get(&self, path: &str) -> Option<&Route<C, V>> {
        self.routes.iter().find(|route| route.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn default_path(&self) -> &str {
        &self.routes[self.default_index].path
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Maps a raw path to a registered one, keeping what was asked for.
    /// Blank requests resolve to the default route as a known route.
    pub fn resolve(&self, raw: &str) -> Resolution<'_> {
        let cleaned = clean_path(raw);
        let requested = if cleaned.is_empty() {
            self.default_path()
        } else {
            cleaned
        };
        let path = self
            .get(requested)
            .map_or_else(|| self.default_path(), Route::path);
        Resolution {
            requested: requested.to_owned(),
            path,
        }
    }

    pub fn normalize(&self, raw: &str) -> &str {
        self.resolve(raw).path
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_ROUTE, Route, RouteTable, clean_path};
    use anyhow::Result;

    fn page(_: &mut ()) -> Result<&'static str> {
        Ok("page")
    }

    fn table() -> Result<RouteTable<(), &'static str>> {
        RouteTable::new(
            DEFAULT_ROUTE,
            vec![
                Route::new("home", page, page),
                Route::new("modeling/calculation-setup", page, page),
            ],
        )
    }

    #[test]
    fn clean_path_strips_delimiters() {
        assert_eq!(clean_path("#/modeling/calculation-setup/"), "modeling/calculation-setup");
        assert_eq!(clean_path("##//home//"), "home");
        assert_eq!(clean_path("  /  "), "");
    }

    #[test]
    fn unknown_paths_normalize_to_default() -> Result<()> {
        let table = table()?;
        for raw in ["bogus", "#/nope/", "modeling", "HOME", "modeling/calculation-setup/x"] {
            assert_eq!(table.normalize(raw), "home", "raw {raw:?}");
        }
        Ok(())
    }

    #[test]
    fn known_and_blank_paths_resolve() -> Result<()> {
        let table = table()?;
        let resolved = table.resolve("#modeling/calculation-setup/");
        assert!(resolved.known());
        assert_eq!(resolved.path, "modeling/calculation-setup");

        let blank = table.resolve("#/");
        assert!(blank.known());
        assert_eq!(blank.path, "home");

        let unknown = table.resolve("bogus");
        assert!(!unknown.known());
        assert_eq!(unknown.requested, "bogus");
        Ok(())
    }

    #[test]
    fn table_requires_registered_default() {
        let error = RouteTable::new("home", vec![Route::new("setup", page, page)])
            .expect_err("missing default should fail");
        assert!(error.to_string().contains("default route `home`"));
    }

    #[test]
    fn table_rejects_duplicates_and_unnormalized_paths() {
        let duplicate = RouteTable::new(
            "home",
            vec![Route::new("home", page, page), Route::new("home", page, page)],
        )
        .expect_err("duplicate should fail");
        assert!(duplicate.to_string().contains("registered twice"));

        let messy = RouteTable::new("home", vec![Route::new("/home", page, page)])
            .expect_err("leading slash should fail");
        assert!(messy.to_string().contains("not normalized"));
    }
}
