//! seminal-core
//!
//! Core library for source-line-correlated backward slicing.
//!
//! Given the IR of one compilation unit (with debug line info) and a list of
//! source lines of interest, decide for each variable on those lines whether
//! its value can be traced back to an external input primitive such as
//! `getchar` or `fread` (a *seminal* branch) or only to constants and
//! internal computation.
//!
//! All substantive logic lives here so it is testable and reusable from
//! multiple frontends.

pub mod analysis;
pub mod config;
pub mod model;
pub mod report;
pub mod source;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
