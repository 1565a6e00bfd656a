// feedsniff - platform/mod.rs
//
// Platform abstraction layer: file reading and configuration.
// Dependencies: util, standard library, directories, memmap2, toml.
// Must NOT depend on: core, app.

pub mod config;
pub mod fs;
