//! HTTP API: bearer-token filter, authorization gate, login and profile routes.

pub mod app;
pub mod authz;
pub mod cli;
pub mod config;
pub mod context;
pub mod middleware;
