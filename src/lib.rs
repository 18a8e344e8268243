//! Core library for the rowsift command line application.
//!
//! The crate ingests tabular files described by a wide configuration sheet,
//! rediscovers the header row inside each file, deletes rows according to
//! per-class criteria, and accumulates the results into multi-sheet output
//! workbooks. The modules are structured to keep responsibilities narrow and
//! composable: the configuration partitioner lives in [`config`], header
//! discovery in [`header`], the rule engine in [`rules`], format readers and
//! the output-workbook registry under [`io`], and the per-file orchestration
//! in [`pipeline`].

pub mod config;
pub mod error;
pub mod header;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod rules;
pub mod text;

pub use error::{Result, SiftError};
