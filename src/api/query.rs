// Collection query parameters - parsed strictly; malformed input is a BadRequest

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{parse_amenity_list, AmenitySet, BoundingBox, PublicPreserve};

/// Raw query string as received, e.g. `?amenities=parking,restroom&bbox=44.5,-87.5,45.5,-86.5`
#[derive(Debug, Default, Deserialize)]
pub struct CollectionParams {
    pub amenities: Option<String>,
    pub bbox: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionQuery {
    pub amenities: AmenitySet,
    pub bbox: Option<BoundingBox>,
}

impl CollectionQuery {
    pub fn parse(params: &CollectionParams) -> AppResult<Self> {
        let amenities = match params.amenities.as_deref() {
            Some(raw) => parse_amenity_list(raw)
                .map_err(|e| AppError::BadRequest(format!("Invalid amenities filter: {}", e)))?,
            None => AmenitySet::new(),
        };

        let bbox = match params.bbox.as_deref() {
            Some(raw) => Some(
                raw.parse::<BoundingBox>()
                    .map_err(|e| AppError::BadRequest(format!("Invalid bbox filter: {}", e)))?,
            ),
            None => None,
        };

        Ok(Self { amenities, bbox })
    }

    /// Amenities match when the record's set is a superset of the requested set.
    /// A bbox excludes records that have no location.
    pub fn matches(&self, preserve: &PublicPreserve) -> bool {
        if !self.amenities.is_subset(&preserve.amenities) {
            return false;
        }
        match (&self.bbox, &preserve.location) {
            (None, _) => true,
            (Some(bbox), Some(location)) => bbox.contains(location),
            (Some(_), None) => false,
        }
    }
}
