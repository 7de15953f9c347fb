// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::collections::BTreeSet;

use crate::MenuNodeId;

/// Declarative menu tree. Categories group leaves and are never selectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Category {
        label: String,
        icon: String,
        children: Vec<MenuItem>,
    },
    Leaf {
        label: String,
        icon: String,
        path: String,
    },
}

impl MenuItem {
    pub fn leaf(label: impl Into<String>, icon: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Leaf {
            label: label.into(),
            icon: icon.into(),
            path: path.into(),
        }
    }

    pub fn category(
        label: impl Into<String>,
        icon: impl Into<String>,
        children: Vec<MenuItem>,
    ) -> Self {
        Self::Category {
            label: label.into(),
            icon: icon.into(),
            children,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStyle {
    Idle,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuNode {
    pub id: MenuNodeId,
    pub label: String,
    pub icon: String,
    pub path: Option<String>,
    pub depth: usize,
    pub parent: Option<MenuNodeId>,
    pub style: ItemStyle,
}

impl MenuNode {
    pub fn selectable(&self) -> bool {
        self.path.is_some()
    }

    /// Filled icon while active, outlined otherwise.
    pub fn icon_name(&self) -> String {
        match self.style {
            ItemStyle::Active => self.icon.clone(),
            ItemStyle::Idle => format!("{}_outlined", self.icon),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightOutcome {
    Unchanged(Option<MenuNodeId>),
    Moved {
        from: Option<MenuNodeId>,
        to: MenuNodeId,
    },
    Cleared {
        from: MenuNodeId,
    },
}

/// Flattened menu with a single highlighted leaf. Only the previously and
/// newly active nodes are restyled on a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    nodes: Vec<MenuNode>,
    active: Option<MenuNodeId>,
    style_writes: usize,
}

impl Menu {
    pub fn new(items: &[MenuItem]) -> Self {
        let mut nodes = Vec::new();
        for item in items {
            flatten(item, 0, None, &mut nodes);
        }
        Self {
            nodes,
            active: None,
            style_writes: 0,
        }
    }

    pub fn nodes(&self) -> &[MenuNode] {
        &self.nodes
    }

    pub fn node(&self, id: MenuNodeId) -> Option<&MenuNode> {
        self.nodes.get(id.get())
    }

    pub fn active(&self) -> Option<MenuNodeId> {
        self.active
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active
            .and_then(|id| self.node(id))
            .and_then(|node| node.path.as_deref())
    }

    pub fn style_writes(&self) -> usize {
        self.style_writes
    }

    /// First node in depth-first order whose path matches exactly.
    pub fn find(&self, path: &str) -> Option<MenuNodeId> {
        self.nodes
            .iter()
            .find(|node| node.path.as_deref() == Some(path))
            .map(|node| node.id)
    }

    pub fn highlight(&mut self, path: &str) -> HighlightOutcome {
        let target = self.find(path);
        if target == self.active {
            return HighlightOutcome::Unchanged(target);
        }

        let previous = self.active.take();
        if let Some(id) = previous {
            self.restyle(id, ItemStyle::Idle);
        }
        match target {
            Some(id) => {
                self.restyle(id, ItemStyle::Active);
                self.active = Some(id);
                HighlightOutcome::Moved { from: previous, to: id }
            }
            None => match previous {
                Some(from) => HighlightOutcome::Cleared { from },
                None => HighlightOutcome::Unchanged(None),
            },
        }
    }

    /// Leaves yield the route they point at; categories do nothing.
    pub fn click(&self, id: MenuNodeId) -> Option<&str> {
        self.node(id).and_then(|node| node.path.as_deref())
    }

    pub fn validate(&self, is_route: impl Fn(&str) -> bool) -> Result<()> {
        let mut seen = BTreeSet::new();
        for node in &self.nodes {
            let Some(path) = node.path.as_deref() else {
                continue;
            };
            if !is_route(path) {
                bail!(
                    "menu item `{}` points at `{path}`, which is not a registered route",
                    node.label
                );
            }
            if !seen.insert(path) {
                bail!("menu has more than one item for route `{path}`");
            }
        }
        Ok(())
    }

    fn restyle(&mut self, id: MenuNodeId, style: ItemStyle) {
        if let Some(node) = self.nodes.get_mut(id.get()) {
            node.style = style;
            self.style_writes += 1;
        }
    }
}

fn flatten(item: &MenuItem, depth: usize, parent: Option<MenuNodeId>, out: &mut Vec<MenuNode>) {
    let id = MenuNodeId::new(out.len());
    match item {
        MenuItem::Leaf { label, icon, path } => out.push(MenuNode {
            id,
            label: label.clone(),
            icon: icon.clone(),
            path: Some(path.clone()),
            depth,
            parent,
            style: ItemStyle::Idle,
        }),
        MenuItem::Category {
            label,
            icon,
            children,
        } => {
            out.push(MenuNode {
                id,
                label: label.clone(),
                icon: icon.clone(),
                path: None,
                depth,
                parent,
                style: ItemStyle::Idle,
            });
            for child in children {
                flatten(child, depth + 1, Some(id), out);
            }
        }
    }
}
