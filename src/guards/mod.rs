//! Output guards
//!
//! Checks applied during BuildAndValidate before any document is rendered:
//! - **Path safety**: a model's file name must stay inside its sub-folder
//! - **Output overlap**: no two models may claim the same output path
//!
//! Both are pure functions over names and paths; the processor turns their findings into
//! validation errors on the offending model.

pub mod output_overlap;
pub mod path_safety;

pub use output_overlap::find_overlapping_outputs;
pub use path_safety::{UnsafeFileName, validate_file_name_safe};
