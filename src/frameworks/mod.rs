// Frameworks layer: runtime bootstrap and configuration.

pub mod config;
pub mod runner;
