//! Media references and asset transfer.
//!
//! - [`rewrite`]: convert `src` references between repository and storage form
//! - [`transfer`]: copy or upload the referenced bytes
//! - [`hash`]: content comparison for unchanged-asset skips

pub mod hash;
pub mod rewrite;
pub mod transfer;

pub use rewrite::{Direction, MediaRef, extract_filenames, extract_references, rewrite};
pub use transfer::{MediaStats, Outcome, pull, push};
