//! # selectees-html
//!
//! DOM editing for archived MMWR report pages. Each page is parsed with
//! `kuchikikiki`, trimmed down to its content row, and has its links, images
//! and anchors rewritten so that many reports can live side by side in one
//! collated document.
//!
//! ```rust,ignore
//! use selectees_html::{ReportId, ReportTransformer, TransformOptions};
//!
//! let transformer = ReportTransformer::new(TransformOptions::default());
//! let report: ReportId = "mm6802a1".parse()?;
//! let fragment = transformer.transform(&report, &page_html)?;
//! println!("{}", fragment.html);
//! ```
//!
//! Rewrite decisions are made by the ordered tables in [`rules`]; the
//! layout checks used before a batch run live in [`survey`].

pub mod error;
pub mod rules;
pub mod survey;
pub mod transform;
mod types;
pub mod utils;

pub use crate::{
  error::{ReportIdError, SchemaViolation, TransformError, TransformResult},
  survey::StructureSurvey,
  transform::ReportTransformer,
  types::{Fragment, ReportId, TransformOptions, TransformStats},
};
