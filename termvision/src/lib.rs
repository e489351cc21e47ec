//! termvision: live remote system monitor client.
//!
//! Keeps one WebSocket connection to a telemetry producer, polls it for `stats`
//! snapshots, normalizes them and publishes a view model that the terminal UI renders.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod procs;
pub mod session;
pub mod types;
pub mod ui;
pub mod view;
pub mod ws;
