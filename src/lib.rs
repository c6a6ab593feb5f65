pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod fmt;
pub mod logging;
pub mod signals;
pub mod state;
pub mod utils;
pub mod web;
