pub mod compare;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod league;
pub mod logging;
pub mod pipeline;
pub mod profile;
pub mod stats;
pub mod tables;
pub mod types;
