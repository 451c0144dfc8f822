//! Field directory collaborator.
//!
//! Maps a field identifier to its static irrigation parameters. The workflow
//! depends only on the [`FieldDirectory`] lookup operation and is agnostic to
//! whether it is backed by this in-memory table or a real database.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IrrigatorError;

/// Crop grown on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Wheat,
    Corn,
    Tomato,
    Cotton,
    Potato,
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropType::Wheat => write!(f, "wheat"),
            CropType::Corn => write!(f, "corn"),
            CropType::Tomato => write!(f, "tomato"),
            CropType::Cotton => write!(f, "cotton"),
            CropType::Potato => write!(f, "potato"),
        }
    }
}

/// Static irrigation parameters for a single field.
///
/// Thresholds must satisfy `0 ≤ min < optimal < max ≤ 100`; the directory
/// enforces this on insertion, so profiles handed to the workflow are always
/// usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProfile {
    pub field_id: u32,
    pub crop_type: CropType,
    pub soil_type: String,
    pub min_moisture: f64,
    pub max_moisture: f64,
    pub optimal_moisture: f64,
}

impl FieldProfile {
    /// Check the threshold ordering invariant.
    pub fn validate(&self) -> Result<(), IrrigatorError> {
        let ordered = 0.0 <= self.min_moisture
            && self.min_moisture < self.optimal_moisture
            && self.optimal_moisture < self.max_moisture
            && self.max_moisture <= 100.0;
        if !ordered {
            return Err(IrrigatorError::InvalidProfile {
                field_id: self.field_id,
                reason: format!(
                    "thresholds must satisfy 0 <= min < optimal < max <= 100, got min {} / optimal {} / max {}",
                    self.min_moisture, self.optimal_moisture, self.max_moisture
                ),
            });
        }
        Ok(())
    }
}

/// Maps a field identifier to its irrigation parameters.
pub trait FieldDirectory {
    async fn lookup(&self, field_id: u32) -> Option<FieldProfile>;
}

/// In-memory directory of field profiles.
#[derive(Debug, Clone, Default)]
pub struct StaticFieldDirectory {
    fields: HashMap<u32, FieldProfile>,
}

impl StaticFieldDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory seeded with the built-in demo fields.
    pub fn demo() -> Self {
        let mut directory = Self::new();
        let demo_fields = [
            (1, CropType::Wheat, "loamy", 25.0, 45.0, 35.0),
            (2, CropType::Corn, "clay", 30.0, 50.0, 40.0),
            (12, CropType::Tomato, "sandy-loam", 35.0, 60.0, 47.5),
            (15, CropType::Cotton, "sandy", 20.0, 40.0, 30.0),
            (20, CropType::Potato, "loamy", 40.0, 65.0, 52.5),
        ];
        for (field_id, crop_type, soil_type, min, max, optimal) in demo_fields {
            directory
                .insert(FieldProfile {
                    field_id,
                    crop_type,
                    soil_type: soil_type.to_string(),
                    min_moisture: min,
                    max_moisture: max,
                    optimal_moisture: optimal,
                })
                .expect("built-in demo profile is valid");
        }
        directory
    }

    /// Insert a profile after validating its thresholds. Replaces any
    /// existing profile with the same id.
    pub fn insert(&mut self, profile: FieldProfile) -> Result<(), IrrigatorError> {
        profile.validate()?;
        self.fields.insert(profile.field_id, profile);
        Ok(())
    }

    pub fn get(&self, field_id: u32) -> Option<FieldProfile> {
        self.fields.get(&field_id).cloned()
    }

    /// All known profiles, ordered by field id.
    pub fn profiles(&self) -> Vec<FieldProfile> {
        let mut profiles: Vec<FieldProfile> = self.fields.values().cloned().collect();
        profiles.sort_by_key(|p| p.field_id);
        profiles
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldDirectory for StaticFieldDirectory {
    async fn lookup(&self, field_id: u32) -> Option<FieldProfile> {
        self.get(field_id)
    }
}
