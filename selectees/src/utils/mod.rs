pub mod archive;
pub mod collate;
pub mod diagnostics;
pub mod pipeline;
pub mod select;
