//! Report and sensor store adapters.
//!
//! `memory` backs local runs and tests; `http` talks to a json-server style
//! REST store (`/reports`, `/sensors`).

pub mod http;
pub mod memory;

pub use http::{HttpReportStore, HttpSensorStore, StoreClient};
pub use memory::{InMemoryReportStore, InMemorySensorStore};
