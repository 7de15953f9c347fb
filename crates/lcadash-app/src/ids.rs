// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

macro_rules! handle_id {
    ($name:ident, $repr:ty) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name($repr);

        impl $name {
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            pub const fn get(self) -> $repr {
                self.0
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                Self(value)
            }
        }
    };
}

// Position of a node in the flattened, depth-first menu arena.
handle_id!(MenuNodeId, usize);
handle_id!(SubscriptionId, u64);

// Catalog row ids as stored in SQLite.
handle_id!(ProjectId, i64);
handle_id!(DatabaseId, i64);
handle_id!(ActivityId, i64);
