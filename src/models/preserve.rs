// Preserve entity - storage record, administrator drafts/patches and the public projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::PreserveId;
use crate::error::{AppResult, ValidationErrors};
use crate::models::amenity::{Amenity, AmenitySet};
use crate::models::geo::{latitude_in_range, longitude_in_range, GeoPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreserveStatus {
    #[default]
    Draft,
    Published,
}

impl PreserveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreserveStatus::Draft => "draft",
            PreserveStatus::Published => "published",
        }
    }
}

impl std::str::FromStr for PreserveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PreserveStatus::Draft),
            "published" => Ok(PreserveStatus::Published),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: alt.into(),
        }
    }
}

/// Canonical stored record. Only the store constructs these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preserve {
    pub id: PreserveId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<GeoPoint>,
    pub acreage: Option<f64>,
    pub trail_length_miles: Option<f64>,
    pub amenities: AmenitySet,
    pub images: Vec<ImageRef>,
    pub status: PreserveStatus,
    pub admin_notes: Option<String>,
    pub last_modified: DateTime<Utc>,
}

impl Preserve {
    pub fn from_fields(id: PreserveId, fields: PreserveFields, last_modified: DateTime<Utc>) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            location: fields.location,
            acreage: fields.acreage,
            trail_length_miles: fields.trail_length_miles,
            amenities: fields.amenities,
            images: fields.images,
            status: fields.status,
            admin_notes: fields.admin_notes,
            last_modified,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PreserveStatus::Published
    }

    /// Editable view of this record, the starting point for applying a patch.
    pub fn to_draft(&self) -> PreserveDraft {
        PreserveDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            latitude: self.location.map(|l| l.latitude),
            longitude: self.location.map(|l| l.longitude),
            acreage: self.acreage,
            trail_length_miles: self.trail_length_miles,
            amenities: self.amenities.iter().map(|a| a.as_str().to_string()).collect(),
            images: self.images.clone(),
            status: self.status,
            admin_notes: self.admin_notes.clone(),
        }
    }
}

/// Validated field values, everything a record holds except identity and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PreserveFields {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<GeoPoint>,
    pub acreage: Option<f64>,
    pub trail_length_miles: Option<f64>,
    pub amenities: AmenitySet,
    pub images: Vec<ImageRef>,
    pub status: PreserveStatus,
    pub admin_notes: Option<String>,
}

/// Administrator input for creating a preserve, as submitted by the edit form.
/// Coordinates are flat `latitude`/`longitude`; unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PreserveDraft {
    pub title: String,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub acreage: Option<f64>,
    pub trail_length_miles: Option<f64>,
    pub amenities: Vec<String>,
    pub images: Vec<ImageRef>,
    pub status: PreserveStatus,
    pub admin_notes: Option<String>,
}

impl PreserveDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenities = amenities.into_iter().map(Into::into).collect();
        self
    }

    pub fn status(mut self, status: PreserveStatus) -> Self {
        self.status = status;
        self
    }

    /// Checks every invariant and reports all violations at once.
    pub fn validate(self) -> AppResult<PreserveFields> {
        let mut errors = ValidationErrors::new();

        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.add("title", "must not be empty");
        }

        let location = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                if !latitude_in_range(latitude) {
                    errors.add("latitude", "must be within [-90, 90]");
                }
                if !longitude_in_range(longitude) {
                    errors.add("longitude", "must be within [-180, 180]");
                }
                Some(GeoPoint::new(latitude, longitude))
            }
            (None, None) => None,
            (Some(_), None) => {
                errors.add("longitude", "latitude and longitude must be set together");
                None
            }
            (None, Some(_)) => {
                errors.add("latitude", "latitude and longitude must be set together");
                None
            }
        };

        if let Some(acreage) = self.acreage {
            if !acreage.is_finite() || acreage <= 0.0 {
                errors.add("acreage", "must be a positive number");
            }
        }

        if let Some(miles) = self.trail_length_miles {
            if !miles.is_finite() || miles < 0.0 {
                errors.add("trailLengthMiles", "must be a non-negative number");
            }
        }

        let mut amenities = AmenitySet::new();
        let mut unknown = Vec::new();
        for tag in &self.amenities {
            match tag.parse::<Amenity>() {
                Ok(amenity) => {
                    amenities.insert(amenity);
                }
                Err(_) => unknown.push(tag.trim().to_string()),
            }
        }
        if !unknown.is_empty() {
            errors.add(
                "amenities",
                format!("unrecognized amenities: {}", unknown.join(", ")),
            );
        }

        for (index, image) in self.images.iter().enumerate() {
            if image.url.trim().is_empty() {
                errors.add(format!("images[{}].url", index), "must not be empty");
            }
        }

        errors.into_result()?;

        Ok(PreserveFields {
            title,
            description: self.description,
            location,
            acreage: self.acreage,
            trail_length_miles: self.trail_length_miles,
            amenities,
            images: self.images,
            status: self.status,
            admin_notes: self.admin_notes,
        })
    }
}

// Distinguishes an absent key (leave unchanged) from an explicit null (clear).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Partial update. `None` leaves a field unchanged, `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PreservePatch {
    pub title: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub latitude: Option<Option<f64>>,
    #[serde(deserialize_with = "double_option")]
    pub longitude: Option<Option<f64>>,
    #[serde(deserialize_with = "double_option")]
    pub acreage: Option<Option<f64>>,
    #[serde(deserialize_with = "double_option")]
    pub trail_length_miles: Option<Option<f64>>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<ImageRef>>,
    pub status: Option<PreserveStatus>,
    #[serde(deserialize_with = "double_option")]
    pub admin_notes: Option<Option<String>>,
}

impl PreservePatch {
    pub fn apply_to(self, mut draft: PreserveDraft) -> PreserveDraft {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(latitude) = self.latitude {
            draft.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            draft.longitude = longitude;
        }
        if let Some(acreage) = self.acreage {
            draft.acreage = acreage;
        }
        if let Some(miles) = self.trail_length_miles {
            draft.trail_length_miles = miles;
        }
        if let Some(amenities) = self.amenities {
            draft.amenities = amenities;
        }
        if let Some(images) = self.images {
            draft.images = images;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(notes) = self.admin_notes {
            draft.admin_notes = notes;
        }
        draft
    }
}

/// Public projection served by the read API and consumed by the explorer client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPreserve {
    pub id: PreserveId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub acreage: Option<f64>,
    #[serde(default)]
    pub trail_length_miles: Option<f64>,
    #[serde(default)]
    pub amenities: AmenitySet,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    pub status: PreserveStatus,
    pub last_modified: DateTime<Utc>,
}

impl From<&Preserve> for PublicPreserve {
    fn from(preserve: &Preserve) -> Self {
        Self {
            id: preserve.id,
            title: preserve.title.clone(),
            description: preserve.description.clone(),
            location: preserve.location,
            acreage: preserve.acreage,
            trail_length_miles: preserve.trail_length_miles,
            amenities: preserve.amenities.clone(),
            images: preserve.images.clone(),
            status: preserve.status,
            last_modified: preserve.last_modified,
        }
    }
}
