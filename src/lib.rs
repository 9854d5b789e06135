//! Headless driver for `sm83-core`: runs test ROMs to a verdict and dumps
//! disassembly.

/// TOML runner settings.
pub mod config;

/// Test-ROM execution and verdict detection.
pub mod runner;
