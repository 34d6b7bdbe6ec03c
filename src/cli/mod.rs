//! Command line front end: fixture loading, configuration, the parallel
//! driver and diagnostic rendering.

pub mod args;
pub mod config;
pub mod driver;
pub mod fixture;
pub mod reporter;

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod args_tests;
#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;
#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod driver_tests;
#[cfg(test)]
#[path = "tests/fixture_tests.rs"]
mod fixture_tests;
#[cfg(test)]
#[path = "tests/reporter_tests.rs"]
mod reporter_tests;
