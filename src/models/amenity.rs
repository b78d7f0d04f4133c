// Amenity vocabulary - the fixed set of tags a preserve may carry

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Amenity {
    Parking,
    Restroom,
    AdaAccessible,
    Trails,
    PicnicArea,
    DogsAllowed,
    BoatLaunch,
    Fishing,
    Hunting,
    ObservationDeck,
}

impl Amenity {
    pub const ALL: [Amenity; 10] = [
        Amenity::Parking,
        Amenity::Restroom,
        Amenity::AdaAccessible,
        Amenity::Trails,
        Amenity::PicnicArea,
        Amenity::DogsAllowed,
        Amenity::BoatLaunch,
        Amenity::Fishing,
        Amenity::Hunting,
        Amenity::ObservationDeck,
    ];

    /// Canonical wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Amenity::Parking => "parking",
            Amenity::Restroom => "restroom",
            Amenity::AdaAccessible => "ADA-accessible",
            Amenity::Trails => "trails",
            Amenity::PicnicArea => "picnic-area",
            Amenity::DogsAllowed => "dogs-allowed",
            Amenity::BoatLaunch => "boat-launch",
            Amenity::Fishing => "fishing",
            Amenity::Hunting => "hunting",
            Amenity::ObservationDeck => "observation-deck",
        }
    }
}

impl fmt::Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Amenity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Amenity::ALL
            .iter()
            .copied()
            .find(|a| a.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown amenity '{}'", wanted))
    }
}

impl Serialize for Amenity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Amenity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

pub type AmenitySet = BTreeSet<Amenity>;

/// Parses a comma-separated list such as `parking,restroom`.
/// Empty tokens and unknown names are errors rather than being skipped.
pub fn parse_amenity_list(raw: &str) -> Result<AmenitySet, String> {
    let mut set = AmenitySet::new();
    for token in raw.split(',') {
        if token.trim().is_empty() {
            return Err(format!("empty amenity in '{}'", raw));
        }
        set.insert(token.parse()?);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("ada-accessible".parse::<Amenity>().unwrap(), Amenity::AdaAccessible);
        assert_eq!(" Parking ".parse::<Amenity>().unwrap(), Amenity::Parking);
        assert!("helipad".parse::<Amenity>().is_err());
    }

    #[test]
    fn test_serializes_canonical_name() {
        let json = serde_json::to_string(&Amenity::AdaAccessible).unwrap();
        assert_eq!(json, "\"ADA-accessible\"");
    }

    #[test]
    fn test_parse_amenity_list() {
        let set = parse_amenity_list("restroom,ADA-accessible").unwrap();
        assert!(set.contains(&Amenity::Restroom));
        assert!(set.contains(&Amenity::AdaAccessible));

        assert!(parse_amenity_list("parking,,restroom").is_err());
        assert!(parse_amenity_list("").is_err());
        assert!(parse_amenity_list("parking,helipad").is_err());
    }
}
