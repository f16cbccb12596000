//! Input framing for the voxpack compressor.
//!
//! This crate turns a byte stream into the model's vocabulary:
//! - [`FrameReader`] parses the header and label table, then streams rows
//!   through a single reusable buffer.
//! - [`ParentTiler`] materializes Z-chunks and enumerates parent-block
//!   views for the per-parent grouping strategies.
//!
//! # Design Principles
//!
//! - **Errors carry coordinates** - Every format error names the failing
//!   row and slice.
//! - **No unbounded buffering** - At most one chunk (`parent_z` slices) is
//!   resident; row-streaming callers hold one row.
//! - **EOF is data** - A clean end of stream is `Ok(None)`, never an error,
//!   so unbounded-depth inputs terminate naturally.

mod error;
mod reader;
mod tiler;

pub use error::{FrameError, FrameResult};
pub use reader::FrameReader;
pub use tiler::ParentTiler;
