//! Batch input/output for Arbiter
//!
//! Materializes the three input relations (transactions, accounts, regions)
//! from CSV before the pipeline starts, and persists the tabular artifacts
//! of every pipeline step, intermediates included, afterwards. No I/O
//! happens mid-computation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod writer;

pub use error::{Error, Result};
pub use loader::{load_accounts, load_regions, load_transactions};
pub use writer::ArtifactWriter;
