//! Command-line front end of the IFRC GO connector.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
