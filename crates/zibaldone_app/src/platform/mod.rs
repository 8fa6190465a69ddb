mod app;
pub mod cli;
mod effects;
mod intents;
mod logging;
mod persistence;
mod ui;

pub use app::run_app;
