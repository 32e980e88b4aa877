//! HTTP surface for Breezeboard: warp routes over the aggregator.

pub mod routes;

pub use routes::{routes, AppState};
