//! crates/sanctuary_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! These are the records persisted in the key-value store, so their serde
//! shape (camelCase field names) is part of the storage format.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//=========================================================================================
// Users and Sessions
//=========================================================================================

/// A registered account. Passwords are stored as entered; this is not a
/// security surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// The active login. Same shape as a `User`, persisted under its own key so a
/// restart can restore it without re-authenticating.
pub type Session = User;

//=========================================================================================
// Measurements
//=========================================================================================

/// A single numeric reading as entered on the form.
///
/// The raw text is kept verbatim. It is parsed to a float only when someone
/// asks for [`Measurement::value`], and an empty or unparsable entry means
/// "not measured". It is never read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measurement(String);

impl Measurement {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Parses the reading. Blank, unparsable and non-finite entries all yield
    /// `None`.
    pub fn value(&self) -> Option<f64> {
        let trimmed = self.0.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.trim())
    }
}

//=========================================================================================
// Property and Rooms
//=========================================================================================

/// Header information for the inspected property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyInfo {
    pub address: String,
    pub client: String,
    pub assessor: String,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
}

impl PropertyInfo {
    /// The blank header used for a fresh form.
    pub fn for_assessor(assessor: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            address: String::new(),
            client: String::new(),
            assessor: assessor.into(),
            date: today.format("%Y-%m-%d").to_string(),
        }
    }
}

/// One room's readings, notes and photo metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomRecord {
    pub name: String,
    pub emf: Measurement,
    pub rf: Measurement,
    pub air_quality: Measurement,
    pub radon: Measurement,
    pub light: Measurement,
    pub sound: Measurement,
    pub temperature: Measurement,
    pub humidity: Measurement,
    pub energetic_notes: String,
    pub photo_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
}

impl RoomRecord {
    pub fn blank() -> Self {
        Self::default()
    }

    /// True when nothing at all has been entered for the room.
    pub fn is_blank(&self) -> bool {
        self == &Self::default()
    }
}

//=========================================================================================
// Assessments
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Draft,
    Completed,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "draft",
            AssessmentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A saved inspection. Immutable once appended to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Milliseconds since the Unix epoch, strictly increasing within the store.
    pub id: u64,
    pub status: AssessmentStatus,
    pub property: PropertyInfo,
    pub rooms: Vec<RoomRecord>,
    pub recommendations: Vec<String>,
    pub user_email: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl Assessment {
    /// Formats a timestamp the way `created_at` is stored.
    pub fn timestamp(now: DateTime<Utc>) -> String {
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Heading used in the history list.
    pub fn title(&self) -> &str {
        let address = self.property.address.trim();
        if address.is_empty() {
            "Untitled"
        } else {
            address
        }
    }

    pub fn summary(&self) -> AssessmentSummary {
        AssessmentSummary {
            id: self.id,
            title: self.title().to_string(),
            client: self.property.client.clone(),
            created_at: self.created_at.clone(),
            status: self.status,
            room_count: self.rooms.len(),
        }
    }
}

/// The condensed row shown in the history list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub id: u64,
    pub title: String,
    pub client: String,
    pub created_at: String,
    pub status: AssessmentStatus,
    pub room_count: usize,
}
