pub mod config;
pub mod error;
pub mod handlers;
pub mod json;
pub mod metrics;
pub mod model;
pub mod observability;
pub mod params;
pub mod routes;
pub mod state;
pub mod store;
