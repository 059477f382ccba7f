//! portal CLI - Command-line interface library
//!
//! This library provides the CLI functionality for the activity portal:
//! - Serve: run the HTTP report service
//! - Generate: compile a report for a period without the service
//! - Inspect: print the slide outline of a PPTX file
//!
//! # Binary Usage
//!
//! ```bash
//! # Run the service with ./portal.toml and .env
//! portal serve --addr 127.0.0.1:3000
//!
//! # Build a report from a JSON fixture
//! portal generate --start 2024-01-01 --end 2024-03-31 --records records.json
//!
//! # Show what a deck contains
//! portal inspect CSE_Report_2024-01-01_to_2024-03-31.pptx --format json
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{generate_command, inspect_command, render_outline, serve_command, write_report};
pub use app::{init_tracing, run_cli, OutputFormat};
