//! EscapeStress backend: stress classification, coping guidance and journaling.

pub mod brain;
pub mod config;
pub mod database;
pub mod error;
pub mod fs_manager;
pub mod knowledge;
pub mod logging;
pub mod models;
pub mod preflight;
pub mod server;

#[cfg(test)]
mod tests;
