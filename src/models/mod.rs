// Preserve domain model - entity, vocabulary and geographic primitives

pub mod amenity;
pub mod geo;
pub mod preserve;

pub use amenity::{parse_amenity_list, Amenity, AmenitySet};
pub use geo::{BoundingBox, GeoPoint};
pub use preserve::{
    ImageRef, Preserve, PreserveDraft, PreserveFields, PreservePatch, PreserveStatus,
    PublicPreserve,
};
