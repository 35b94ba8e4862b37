//! Core library for the idea-analyze command line application.
//!
//! The library retrieves the spreadsheet data files of a dataset published on
//! a CKAN catalog and combines them into one table. Responsibilities are kept
//! narrow: the catalog client lives in [`ckan`], download and workbook adapters
//! under [`io`], the table representation in [`model`], the fixed data file
//! layout in [`loader`], and the orchestration in [`combine`].

pub mod ckan;
pub mod combine;
pub mod config;
pub mod error;
pub mod io;
pub mod loader;
pub mod logging;
pub mod model;

pub use error::{Result, ToolError};
