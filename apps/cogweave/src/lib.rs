//! # cogweave
//!
//! Library half of the cogweave binary, exposed so the command
//! implementations can be tested without spawning a process.

pub mod cli;
