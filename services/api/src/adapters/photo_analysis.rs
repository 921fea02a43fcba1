//! services/api/src/adapters/photo_analysis.rs
//!
//! Placeholder implementation of the `PhotoAnalysisService` port. No image is
//! inspected; the text only reflects how many photos were attached.

use async_trait::async_trait;
use sanctuary_core::ports::{PhotoAnalysisService, PortResult};

#[derive(Clone, Default)]
pub struct CannedPhotoAnalyzer;

impl CannedPhotoAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PhotoAnalysisService for CannedPhotoAnalyzer {
    async fn analyze_photos(&self, room_name: &str, photo_names: &[String]) -> PortResult<String> {
        let room = if room_name.trim().is_empty() {
            "this room"
        } else {
            room_name.trim()
        };
        Ok(format!(
            "AI Analysis: {} photo(s) reviewed for {}. No visible mold, water damage or \
             wiring concerns detected. Confirm with on-site readings.",
            photo_names.len(),
            room
        ))
    }
}
