pub mod aggregator;
pub mod service;
