//! Stable node ids
//!
//! Ids are derived only from disposition classes and material names, never
//! from counters, randomness or the clock, so rebuilding a graph from the
//! same records yields the same ids.

use diversion_model::DispositionClass;

/// Id of the single source node
pub const SOURCE_ID: &str = "source_total";

const PROCESS_PREFIX: &str = "process_";
const DESTINATION_PREFIX: &str = "destination_";
const MATERIAL_PREFIX: &str = "material_";

/// Id of the process (category) node for `class`
#[must_use]
pub fn process_id(class: DispositionClass) -> String {
    format!("{PROCESS_PREFIX}{}", class.key())
}

/// Id of the destination (facility) node for `class`
#[must_use]
pub fn destination_id(class: DispositionClass) -> String {
    format!("{DESTINATION_PREFIX}{}", class.key())
}

/// Id of a per-material node inside `class`
#[must_use]
pub fn material_id(class: DispositionClass, material: &str) -> String {
    format!("{MATERIAL_PREFIX}{}_{}", class.key(), slug(material))
}

/// Lowercase slug keeping Unicode letters and digits; runs of other
/// characters become one underscore
#[must_use]
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        out.push_str("unnamed");
    }
    out
}

/// Disposition class encoded in a generated id, if any
#[must_use]
pub fn class_from_id(id: &str) -> Option<DispositionClass> {
    let rest = id
        .strip_prefix(PROCESS_PREFIX)
        .or_else(|| id.strip_prefix(DESTINATION_PREFIX))
        .or_else(|| id.strip_prefix(MATERIAL_PREFIX))?;
    DispositionClass::ALL.into_iter().find(|class| {
        rest.strip_prefix(class.key())
            .is_some_and(|tail| tail.is_empty() || tail.starts_with('_'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_embed_class_key() {
        assert_eq!(process_id(DispositionClass::Recycling), "process_recycling");
        assert_eq!(destination_id(DispositionClass::Landfill), "destination_landfill");
        assert_eq!(
            material_id(DispositionClass::Recycling, "Mixed Paper / Card"),
            "material_recycling_mixed_paper_card"
        );
    }

    #[test]
    fn slug_handles_symbols_only() {
        assert_eq!(slug("--"), "unnamed");
        assert_eq!(slug("  PET #1 "), "pet_1");
    }

    #[test]
    fn slug_keeps_non_ascii_letters() {
        assert_eq!(slug("Papier Gemischt"), "papier_gemischt");
        assert_eq!(slug("Glas Grün"), "glas_grün");
        assert_eq!(slug("段ボール"), "段ボール");
        assert_ne!(
            material_id(DispositionClass::Recycling, "段ボール"),
            material_id(DispositionClass::Recycling, "新聞紙")
        );
    }

    #[test]
    fn class_round_trips_through_ids() {
        for class in DispositionClass::ALL {
            assert_eq!(class_from_id(&process_id(class)), Some(class));
            assert_eq!(class_from_id(&destination_id(class)), Some(class));
            assert_eq!(class_from_id(&material_id(class, "glass")), Some(class));
        }
    }

    #[test]
    fn class_from_foreign_id_is_none() {
        assert_eq!(class_from_id(SOURCE_ID), None);
        assert_eq!(class_from_id("ghost"), None);
        assert_eq!(class_from_id("process_recyclingplant"), None);
    }
}
