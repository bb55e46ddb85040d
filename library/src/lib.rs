//! Controller Launch
//!
//! Front end for the game library: the controller-driven overlay session and
//! the command line subcommands. Discovery, launching and input interpretation
//! live in `controller-launch-core`.

pub mod app;
pub mod commands;
