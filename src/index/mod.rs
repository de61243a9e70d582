pub mod filter;
pub mod header;
pub mod indexer;
pub mod range;
pub mod scan;

pub use filter::FilterCriteria;
pub use header::{parse_header, Header};
pub use indexer::{
    FetchKind, FetchState, IndexCommand, IndexEvent, IndexerHandle, IndexerOptions, LineIndexer,
    Page,
};
pub use range::{decode, encode, LogRange, RangeError};
pub use scan::{scan_page, ScanOutcome};
