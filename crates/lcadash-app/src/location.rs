// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::mpsc::Sender;

use url::form_urlencoded;

use crate::{RouteScheme, SubscriptionId};

const QUERY_ROUTE_KEY: &str = "page";

impl RouteScheme {
    /// Pulls the raw route out of an address. The result still needs
    /// normalizing against the route table.
    pub fn decode(self, address: &str) -> String {
        match self {
            Self::Hash => address
                .split_once('#')
                .map(|(_, fragment)| fragment.to_owned())
                .unwrap_or_default(),
            Self::Query => {
                let Some((_, query)) = address.split_once('?') else {
                    return String::new();
                };
                let query = query.split_once('#').map_or(query, |(query, _)| query);
                form_urlencoded::parse(query.as_bytes())
                    .find(|(key, _)| key == QUERY_ROUTE_KEY)
                    .map(|(_, value)| value.into_owned())
                    .unwrap_or_default()
            }
            Self::Path => {
                let end = address.find(['?', '#']).unwrap_or(address.len());
                address[..end].to_owned()
            }
        }
    }

    pub fn encode(self, path: &str) -> String {
        match self {
            Self::Hash => format!("#{path}"),
            Self::Query => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(QUERY_ROUTE_KEY, path)
                    .finish();
                format!("?{query}")
            }
            Self::Path => format!("/{path}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationEvent {
    Changed { address: String },
}

#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
}

impl Subscription {
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// The address the router follows. Writers update it without reloading
/// anything; subscribers hear about every change.
pub trait Location {
    fn read(&self) -> String;
    fn write(&mut self, address: &str);
    fn subscribe(&mut self, listener: Sender<LocationEvent>) -> Subscription;
    fn unsubscribe(&mut self, subscription: Subscription);
}

/// Session-local address with browser-style back/forward history.
/// Writing the current address again is not a change and notifies nobody.
#[derive(Debug)]
pub struct MemoryLocation {
    history: Vec<String>,
    cursor: usize,
    listeners: Vec<(SubscriptionId, Sender<LocationEvent>)>,
    next_subscription: u64,
}

impl MemoryLocation {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            history: vec![initial.into()],
            cursor: 0,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.cursor -= 1;
        self.notify();
        true
    }

    pub fn forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.cursor += 1;
        self.notify();
        true
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self) {
        let event = LocationEvent::Changed {
            address: self.history[self.cursor].clone(),
        };
        // Listeners whose receiver is gone are dropped on the way.
        self.listeners
            .retain(|(_, listener)| listener.send(event.clone()).is_ok());
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl Location for MemoryLocation {
    fn read(&self) -> String {
        self.history[self.cursor].clone()
    }

    fn write(&mut self, address: &str) {
        if self.history[self.cursor] == address {
            return;
        }
        self.history.truncate(self.cursor + 1);
        self.history.push(address.to_owned());
        self.cursor = self.history.len() - 1;
        self.notify();
    }

    fn subscribe(&mut self, listener: Sender<LocationEvent>) -> Subscription {
        let id = SubscriptionId::new(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        Subscription { id }
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        self.listeners.retain(|(id, _)| *id != subscription.id);
    }
}

#[cfg(test)]
mod tests {
    use super::{Location, LocationEvent, MemoryLocation};
    use crate::RouteScheme;
    use std::sync::mpsc;

    #[test]
    fn hash_scheme_reads_fragment() {
        let scheme = RouteScheme::Hash;
        assert_eq!(scheme.decode("#results/impact-overview"), "results/impact-overview");
        assert_eq!(scheme.decode("http://host/app#/home/"), "/home/");
        assert_eq!(scheme.decode("http://host/app"), "");
        assert_eq!(scheme.encode("home"), "#home");
    }

    #[test]
    fn query_scheme_reads_page_parameter() {
        let scheme = RouteScheme::Query;
        let address = scheme.encode("modeling/calculation-setup");
        assert_eq!(address, "?page=modeling%2Fcalculation-setup");
        assert_eq!(scheme.decode(&address), "modeling/calculation-setup");
        assert_eq!(scheme.decode("/app?theme=dark&page=home#top"), "home");
        assert_eq!(scheme.decode("/app?theme=dark"), "");
    }

    #[test]
    fn path_scheme_ignores_query_and_fragment() {
        let scheme = RouteScheme::Path;
        assert_eq!(scheme.decode("/results/impact-overview?x=1#y"), "/results/impact-overview");
        assert_eq!(scheme.encode("home"), "/home");
    }

    #[test]
    fn writes_notify_subscribers_once_per_change() {
        let (tx, rx) = mpsc::channel();
        let mut location = MemoryLocation::new("#home");
        location.subscribe(tx);

        location.write("#setup");
        location.write("#setup");

        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![LocationEvent::Changed {
                address: "#setup".to_owned()
            }]
        );
        assert_eq!(location.read(), "#setup");
    }

    #[test]
    fn back_and_forward_walk_history() {
        let (tx, rx) = mpsc::channel();
        let mut location = MemoryLocation::new("#home");
        location.write("#a");
        location.write("#b");
        location.subscribe(tx);

        assert!(location.back());
        assert_eq!(location.read(), "#a");
        location.write("#c");
        assert!(!location.can_go_forward());
        assert_eq!(location.history_len(), 3);

        assert!(location.back());
        assert!(location.back());
        assert!(!location.back());
        assert_eq!(location.read(), "#home");

        let seen = rx
            .try_iter()
            .map(|LocationEvent::Changed { address }| address)
            .collect::<Vec<_>>();
        assert_eq!(seen, vec!["#a", "#c", "#a", "#home"]);
    }

    #[test]
    fn unsubscribe_and_dropped_receivers_stop_delivery() {
        let (kept_tx, kept_rx) = mpsc::channel();
        let (dropped_tx, dropped_rx) = mpsc::channel();
        let mut location = MemoryLocation::default();
        let kept = location.subscribe(kept_tx);
        location.subscribe(dropped_tx);
        drop(dropped_rx);

        location.write("#x");
        assert_eq!(location.listener_count(), 1);

        location.unsubscribe(kept);
        location.write("#y");
        assert_eq!(location.listener_count(), 0);
        assert_eq!(kept_rx.try_iter().count(), 1);
    }
}
