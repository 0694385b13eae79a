//! Disposition classes: the final-handling category of a unit of waste

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Final-handling category of waste.
///
/// The declaration order is the canonical order used everywhere a
/// deterministic ordering over classes is needed (graph layout, map
/// iteration, reports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispositionClass {
    /// Sent to a recycling facility
    Recycling,
    /// Sent to composting / organics processing
    Compost,
    /// Reused without reprocessing
    Reuse,
    /// Sent to landfill
    Landfill,
}

impl DispositionClass {
    /// All classes in canonical order
    pub const ALL: [DispositionClass; 4] = [
        DispositionClass::Recycling,
        DispositionClass::Compost,
        DispositionClass::Reuse,
        DispositionClass::Landfill,
    ];

    /// Stable machine key, used in node ids and config files
    #[inline]
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Recycling => "recycling",
            Self::Compost => "compost",
            Self::Reuse => "reuse",
            Self::Landfill => "landfill",
        }
    }

    /// True for every class that keeps mass out of landfill
    #[inline]
    #[must_use]
    pub const fn is_diverted(self) -> bool {
        !matches!(self, Self::Landfill)
    }
}

impl fmt::Display for DispositionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DispositionClass {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recycling" | "recycle" | "recycled" | "recyclable" => Ok(Self::Recycling),
            "compost" | "composting" | "composted" | "organic" | "organics" => Ok(Self::Compost),
            "reuse" | "reused" => Ok(Self::Reuse),
            "landfill" | "landfilled" => Ok(Self::Landfill),
            _ => Err(ModelError::UnknownDisposition(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_matches_declaration() {
        let mut sorted = DispositionClass::ALL;
        sorted.sort();
        assert_eq!(sorted, DispositionClass::ALL);
    }

    #[test]
    fn only_landfill_is_not_diverted() {
        let diverted: Vec<_> = DispositionClass::ALL
            .into_iter()
            .filter(|c| c.is_diverted())
            .collect();
        assert_eq!(diverted.len(), 3);
        assert!(!DispositionClass::Landfill.is_diverted());
    }

    #[test]
    fn parse_accepts_keys_and_aliases() {
        for class in DispositionClass::ALL {
            assert_eq!(class.key().parse::<DispositionClass>(), Ok(class));
        }
        assert_eq!(" Organics ".parse(), Ok(DispositionClass::Compost));
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert_eq!(
            "incinerate".parse::<DispositionClass>(),
            Err(ModelError::UnknownDisposition("incinerate".to_string()))
        );
    }

    #[test]
    fn serde_uses_snake_case_keys() {
        let json = serde_json::to_string(&DispositionClass::Compost).unwrap();
        assert_eq!(json, "\"compost\"");
    }
}
