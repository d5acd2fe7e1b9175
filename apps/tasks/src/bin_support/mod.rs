//! Command-line front end pieces kept in the library so they can be tested.

pub mod commands;
