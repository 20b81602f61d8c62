//! Command execution for release runs.

mod release;

pub use release::{execute, print_summary};
