pub mod articles;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod frequency;
pub mod models;
pub mod provider;
pub mod quota;
pub mod reconcile;
pub mod report;
pub mod scoring;
pub mod server;
pub mod service;
pub mod session;
pub mod utils;
