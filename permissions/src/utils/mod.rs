/// The configuration for the permission service and the tools built on it.
pub mod config;
