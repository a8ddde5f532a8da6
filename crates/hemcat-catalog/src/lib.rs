pub mod cache;
pub mod columns;
pub mod error;
pub mod hydrate;
pub mod index;
pub mod merge;
pub mod overlay;
pub mod pipeline;
pub mod remote;
pub mod resolve;
pub mod sheet;

pub use cache::{CatalogCache, RefreshToken};
pub use columns::ColumnMap;
pub use error::CatalogError;
pub use hydrate::{hydrate_images, HydrationStats};
pub use index::AssetIndex;
pub use merge::{MergeOutcome, MergeStats, Merger, SourceFailure};
pub use overlay::{
    CustomProductAdded, NewCustomProduct, OverlayDocument, OverlayStore, ProductStatus,
};
pub use pipeline::{CatalogPipeline, CatalogSnapshot};
pub use remote::{AssetSource, DocumentBackup, ImageFetcher, MediaBackup, NoBackup};
pub use resolve::{resolve, ImageMatch, MatchTier};
pub use sheet::{RawSheet, SheetReader, SpreadsheetSource, WorkbookReader};
