// ABOUTME: Library root for shipwright - build, containerize, and publish services.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod runtime;
pub mod types;
pub mod versions;
