pub mod config;
pub mod constants;
pub mod error;
pub mod pipeline;

// Row shapes shared by every layer
pub mod domain;

pub mod observability;
