pub mod kv;
pub mod photo_analysis;

pub use kv::SqliteKvAdapter;
pub use photo_analysis::CannedPhotoAnalyzer;
