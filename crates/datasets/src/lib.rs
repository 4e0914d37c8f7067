//! Dataset loading helpers: cache-or-fetch retrieval of the public
//! short-term-rental listings snapshots, plus a small CSV table type with
//! merge-by-row-index support.

pub mod fetch;
pub mod table;

pub use fetch::{DatasetError, ListingsClient};
pub use table::DataTable;
