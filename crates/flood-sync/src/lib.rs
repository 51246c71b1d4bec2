//! FloodSync: citizen flood reports settled by peer votes.
//!
//! The [`workflows::validation`] module holds the consensus rules and the
//! service that drives them; [`store`] adapts report and sensor stores.

pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;
