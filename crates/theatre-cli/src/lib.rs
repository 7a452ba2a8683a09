//! CLI library components for Theatre Studio.

#![allow(missing_docs)]

pub mod cli;
pub mod commands;
pub mod logging;
