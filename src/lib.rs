pub mod api;
pub mod domain;
pub mod messaging;
pub mod metrics;
pub mod pricing;
pub mod service;
pub mod store;
