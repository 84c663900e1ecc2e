// ABOUTME: strava-auth CLI library: argument definitions and logging setup
// ABOUTME: Kept out of the binary so argument parsing can be tested

pub mod args;
pub mod logging;

pub use args::{AuthArgs, Cli, Commands, ScopeArgs};

#[cfg(test)]
mod tests;
