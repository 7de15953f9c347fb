// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod catalog;
pub mod filter;
pub mod functional_unit;
pub mod ids;
pub mod location;
pub mod menu;
pub mod model;
pub mod router;
pub mod routes;
pub mod state;

pub use catalog::*;
pub use filter::*;
pub use functional_unit::*;
pub use ids::*;
pub use location::*;
pub use menu::*;
pub use model::*;
pub use router::*;
pub use routes::*;
pub use state::*;
