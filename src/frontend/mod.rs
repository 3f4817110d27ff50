//! Terminal front end for the `troubleshooter` binary.

pub mod cli;
pub mod logging;
pub mod terminal;
