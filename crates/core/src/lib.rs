#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models and logic for the stock watcher: payload extraction,
//! normalization of the upstream shape, and change detection.

pub mod api;
pub mod diff;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalize;

pub use diff::{diff_stock, render_changes};
pub use error::{ExtractionError, WatchError};
pub use extract::extract_json_object;
pub use model::{Change, ChangeKind, StockItem};
pub use normalize::{normalize, normalize_records, PayloadShape};
