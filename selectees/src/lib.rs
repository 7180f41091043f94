//! Library half of the `selectees` binary: archive loading, report
//! selection, collation and diagnostics. Exposed mainly so the pipeline can
//! be tested without going through the command line.
pub mod cli;
pub mod error;
pub mod utils;

pub use error::{Result, SelecteesError};
