#![forbid(unsafe_code)]

//! Terminal host for the Typist typing engine.
//!
//! Pages of typing regions (built-in presets or a JSON file) are laid out on a
//! scrollable stage and painted with crossterm. Regions marked
//! `start_on_visible` begin typing only once scrolled into view.

pub mod cli;
pub mod error;
pub mod host;
pub mod logging;
pub mod presets;
pub mod session;
