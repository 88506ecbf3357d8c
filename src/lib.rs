//! Sheetwrap - spreadsheet rows to fixed-width text
//!
//! This library turns the first sheet of a spreadsheet into text laid out
//! like an example, with every line at most 40 characters wide.
//!
//! # Features
//!
//! - Column selection remembered per header layout
//! - Example templates remembered per selected columns
//! - Deterministic line reflow after every conversion
//! - Cancellable conversions through a pluggable `Formatter`
//!
//! # Example
//!
//! ```no_run
//! use sheetwrap::core::{project, reflow};
//! use sheetwrap::excel::read_grid;
//! use sheetwrap::types::ColumnMask;
//!
//! let grid = read_grid("products.xlsx")?;
//! let mask = ColumnMask::all(grid.column_count());
//! println!("{}", project(&grid, &mask));
//! println!("{}", reflow("The quick brown fox jumps", 10));
//! # Ok::<(), sheetwrap::error::SheetwrapError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod formatter;
pub mod memory;
pub mod samples;
pub mod session;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{SheetwrapError, SheetwrapResult};
pub use session::{ConversionOutcome, Resolution, Session};
pub use types::{ColumnMask, Grid, Signature};
