//! crates/sanctuary_core/src/form.rs
//!
//! The in-memory draft edited before an assessment is saved.

use crate::domain::{Measurement, PropertyInfo, RoomRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a draft room. Positions shift when rooms are removed;
/// ids do not.
pub type RoomId = Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("An assessment needs at least one room")]
    LastRoom,
    #[error("No room at position {0}")]
    NoSuchRoom(usize),
}

/// Editable text fields of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomField {
    Name,
    Emf,
    Rf,
    AirQuality,
    Radon,
    Light,
    Sound,
    Temperature,
    Humidity,
    EnergeticNotes,
}

/// Editable fields of the property header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyField {
    Address,
    Client,
    Assessor,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftRoom {
    pub id: RoomId,
    #[serde(flatten)]
    pub record: RoomRecord,
}

impl DraftRoom {
    fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            record: RoomRecord::blank(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentForm {
    pub property: PropertyInfo,
    rooms: Vec<DraftRoom>,
}

impl AssessmentForm {
    /// A fresh form: one blank room, assessor and date pre-filled.
    pub fn new(assessor: &str, today: NaiveDate) -> Self {
        Self {
            property: PropertyInfo::for_assessor(assessor, today),
            rooms: vec![DraftRoom::blank()],
        }
    }

    pub fn reset(&mut self, assessor: &str, today: NaiveDate) {
        *self = Self::new(assessor, today);
    }

    pub fn rooms(&self) -> &[DraftRoom] {
        &self.rooms
    }

    /// The room records in order, as they will be saved.
    pub fn room_records(&self) -> Vec<RoomRecord> {
        self.rooms.iter().map(|r| r.record.clone()).collect()
    }

    pub fn add_room(&mut self) -> RoomId {
        let room = DraftRoom::blank();
        let id = room.id;
        self.rooms.push(room);
        id
    }

    /// Removes the room at `position`. The last remaining room cannot be removed.
    pub fn remove_room(&mut self, position: usize) -> Result<RoomId, FormError> {
        if position >= self.rooms.len() {
            return Err(FormError::NoSuchRoom(position));
        }
        if self.rooms.len() == 1 {
            return Err(FormError::LastRoom);
        }
        Ok(self.rooms.remove(position).id)
    }

    pub fn update_room(
        &mut self,
        position: usize,
        field: RoomField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let record = &mut self.room_mut(position)?.record;
        let value = value.into();
        match field {
            RoomField::Name => record.name = value,
            RoomField::EnergeticNotes => record.energetic_notes = value,
            RoomField::Emf => record.emf = Measurement::new(value),
            RoomField::Rf => record.rf = Measurement::new(value),
            RoomField::AirQuality => record.air_quality = Measurement::new(value),
            RoomField::Radon => record.radon = Measurement::new(value),
            RoomField::Light => record.light = Measurement::new(value),
            RoomField::Sound => record.sound = Measurement::new(value),
            RoomField::Temperature => record.temperature = Measurement::new(value),
            RoomField::Humidity => record.humidity = Measurement::new(value),
        }
        Ok(())
    }

    pub fn update_property(&mut self, field: PropertyField, value: impl Into<String>) {
        let value = value.into();
        match field {
            PropertyField::Address => self.property.address = value,
            PropertyField::Client => self.property.client = value,
            PropertyField::Assessor => self.property.assessor = value,
            PropertyField::Date => self.property.date = value,
        }
    }

    /// Appends photo names to a room and returns the room's id, which is what
    /// a later analysis update must be addressed to.
    pub fn attach_photos(
        &mut self,
        position: usize,
        names: impl IntoIterator<Item = String>,
    ) -> Result<RoomId, FormError> {
        let room = self.room_mut(position)?;
        room.record.photo_names.extend(names);
        Ok(room.id)
    }

    /// Stores analysis text on the room with `room_id`. Returns `false`, and
    /// changes nothing, when that room no longer exists.
    pub fn apply_photo_analysis(&mut self, room_id: RoomId, analysis: impl Into<String>) -> bool {
        match self.rooms.iter_mut().find(|r| r.id == room_id) {
            Some(room) => {
                room.record.ai_analysis = Some(analysis.into());
                true
            }
            None => false,
        }
    }

    fn room_mut(&mut self, position: usize) -> Result<&mut DraftRoom, FormError> {
        self.rooms
            .get_mut(position)
            .ok_or(FormError::NoSuchRoom(position))
    }
}
