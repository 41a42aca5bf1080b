//! HTTP authorization gateway for the topology API.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
