//! Spreadsheet back-fill of missing CFR codes.
//!
//! The workflow is read → plan → look up → merge → write: the input table is
//! never mutated, a new table is produced with only the looked-up cells
//! replaced.

pub mod batch;
pub mod reader;
pub mod table;
pub mod writer;

pub use batch::{back_fill, merge, pending_lookups, BatchColumns, CfrSource, FillReport, PendingLookup};
pub use reader::read_sheet;
pub use table::{Cell, Table};
pub use writer::write_sheet;
