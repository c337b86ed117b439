pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod merge;
pub mod payload;
mod query;
mod retry;
pub mod shared;
pub mod source;
pub mod view;

pub use catalog::{Catalog, Entry, LoadOutcome, LoadTicket};
pub use dashboard::Dashboard;
pub use error::{CatalogError, LoadError};
pub use merge::{dedupe_key, merge_into_file, merge_records, MergeOutcome};
pub use shared::SharedCatalog;
pub use source::{Source, SourceClient};
pub use view::{build_view, BusinessView, ContactLink, ErrorView, RecordView, Schedule};
