//! Fixed vocabularies used to canonicalise loosely-typed plan data.
//!
//! Lookups are built once and shared; nothing here is mutable.

use crate::types::{Equipment, MuscleGroup};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Equipment spellings seen in upstream plans
const EQUIPMENT_ALIASES: &[(&str, Equipment)] = &[
    ("barbell", Equipment::Barbell),
    ("bb", Equipment::Barbell),
    ("ez_bar", Equipment::Barbell),
    ("trap_bar", Equipment::Barbell),
    ("dumbbell", Equipment::Dumbbell),
    ("dumbbells", Equipment::Dumbbell),
    ("db", Equipment::Dumbbell),
    ("kettlebell", Equipment::Kettlebell),
    ("kettlebells", Equipment::Kettlebell),
    ("kb", Equipment::Kettlebell),
    ("bodyweight", Equipment::Bodyweight),
    ("body_weight", Equipment::Bodyweight),
    ("none", Equipment::Bodyweight),
    ("machine", Equipment::Machine),
    ("smith_machine", Equipment::Machine),
    ("leg_press", Equipment::Machine),
    ("cable", Equipment::Cable),
    ("cables", Equipment::Cable),
    ("cable_machine", Equipment::Cable),
    ("band", Equipment::Band),
    ("bands", Equipment::Band),
    ("resistance_band", Equipment::Band),
    ("bench", Equipment::Bench),
    ("pullup_bar", Equipment::PullupBar),
    ("pull_up_bar", Equipment::PullupBar),
    ("chin_up_bar", Equipment::PullupBar),
    ("other", Equipment::Other),
];

/// Muscle group spellings, in substring-match priority order
const MUSCLE_ALIASES: &[(&str, MuscleGroup)] = &[
    ("chest", MuscleGroup::Chest),
    ("pecs", MuscleGroup::Chest),
    ("pectorals", MuscleGroup::Chest),
    ("back", MuscleGroup::Back),
    ("lats", MuscleGroup::Back),
    ("latissimus", MuscleGroup::Back),
    ("traps", MuscleGroup::Back),
    ("rhomboids", MuscleGroup::Back),
    ("shoulders", MuscleGroup::Shoulders),
    ("shoulder", MuscleGroup::Shoulders),
    ("delts", MuscleGroup::Shoulders),
    ("deltoids", MuscleGroup::Shoulders),
    ("biceps", MuscleGroup::Biceps),
    ("bicep", MuscleGroup::Biceps),
    ("triceps", MuscleGroup::Triceps),
    ("tricep", MuscleGroup::Triceps),
    ("forearms", MuscleGroup::Forearms),
    ("forearm", MuscleGroup::Forearms),
    ("grip", MuscleGroup::Forearms),
    ("quads", MuscleGroup::Quads),
    ("quadriceps", MuscleGroup::Quads),
    ("quad", MuscleGroup::Quads),
    ("hamstrings", MuscleGroup::Hamstrings),
    ("hamstring", MuscleGroup::Hamstrings),
    ("glutes", MuscleGroup::Glutes),
    ("glute", MuscleGroup::Glutes),
    ("calves", MuscleGroup::Calves),
    ("calf", MuscleGroup::Calves),
    ("core", MuscleGroup::Core),
    ("abs", MuscleGroup::Core),
    ("abdominals", MuscleGroup::Core),
    ("obliques", MuscleGroup::Core),
    ("full_body", MuscleGroup::FullBody),
    ("fullbody", MuscleGroup::FullBody),
    ("total_body", MuscleGroup::FullBody),
];

/// Tags that mark an exercise as a core lift
const CORE_LIFT_TAGS: &[&str] = &[
    "core_lift",
    "corelift",
    "main_lift",
    "primary_lift",
    "compound_primary",
    "competition_lift",
];

/// Movement patterns that count as core lifts when loaded with free weights
const CORE_LIFT_PATTERNS: &[&str] = &[
    "squat",
    "hinge",
    "press",
    "horizontal_press",
    "vertical_press",
    "horizontal_push",
    "vertical_push",
];

/// Canonical lift names
const CORE_LIFT_NAMES: &[&str] = &[
    "squat",
    "deadlift",
    "bench press",
    "overhead press",
    "military press",
    "push press",
    "power clean",
    "clean and jerk",
    "snatch",
    "pull-up",
    "pull up",
    "pullup",
    "chin-up",
    "chin up",
    "chinup",
];

/// Names that contain a lift keyword but are accessory variants
const FALSE_POSITIVE_NAMES: &[&str] = &[
    "split squat",
    "goblet squat",
    "bulgarian",
    "step-up",
    "step up",
    "sissy squat",
    "hack squat",
    "squat jump",
    "jump squat",
];

static EQUIPMENT_LOOKUP: Lazy<HashMap<&'static str, Equipment>> =
    Lazy::new(|| EQUIPMENT_ALIASES.iter().copied().collect());

static MUSCLE_LOOKUP: Lazy<HashMap<&'static str, MuscleGroup>> =
    Lazy::new(|| MUSCLE_ALIASES.iter().copied().collect());

/// Lowercase, trim and fold separators into underscores
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_' || c == '/')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Map an equipment spelling onto the vocabulary; unknowns become `Other`
pub fn parse_equipment(raw: &str) -> Equipment {
    let key = normalize_key(raw);
    EQUIPMENT_LOOKUP
        .get(key.as_str())
        .copied()
        .unwrap_or(Equipment::Other)
}

/// Exact alias match first, then the first vocabulary entry contained in the input
pub fn match_muscle_group(raw: &str) -> Option<MuscleGroup> {
    let key = normalize_key(raw);
    if key.is_empty() {
        return None;
    }
    if let Some(group) = MUSCLE_LOOKUP.get(key.as_str()) {
        return Some(*group);
    }
    MUSCLE_ALIASES
        .iter()
        .find(|(alias, _)| key.contains(alias))
        .map(|(_, group)| *group)
}

pub fn is_core_lift_tag(raw: &str) -> bool {
    let key = normalize_key(raw);
    CORE_LIFT_TAGS.contains(&key.as_str())
}

pub fn is_core_lift_pattern(raw: &str) -> bool {
    let key = normalize_key(raw);
    CORE_LIFT_PATTERNS.contains(&key.as_str())
}

/// Name keyword check with known accessory variants excluded
pub fn name_is_core_lift(name: &str) -> bool {
    let lowered = name.to_lowercase();
    if FALSE_POSITIVE_NAMES.iter().any(|fp| lowered.contains(fp)) {
        return false;
    }
    CORE_LIFT_NAMES.iter().any(|kw| lowered.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_aliases() {
        assert_eq!(parse_equipment("Barbell"), Equipment::Barbell);
        assert_eq!(parse_equipment("DB"), Equipment::Dumbbell);
        assert_eq!(parse_equipment("pull-up bar"), Equipment::PullupBar);
        assert_eq!(parse_equipment("Cable Machine"), Equipment::Cable);
        assert_eq!(parse_equipment("sandbag"), Equipment::Other);
    }

    #[test]
    fn test_muscle_exact_then_substring() {
        assert_eq!(match_muscle_group("Quadriceps"), Some(MuscleGroup::Quads));
        assert_eq!(match_muscle_group("rear delts"), Some(MuscleGroup::Shoulders));
        assert_eq!(match_muscle_group("upper back"), Some(MuscleGroup::Back));
        assert_eq!(match_muscle_group("hip flexors"), None);
        assert_eq!(match_muscle_group("   "), None);
    }

    #[test]
    fn test_name_keywords() {
        assert!(name_is_core_lift("Back Squat"));
        assert!(name_is_core_lift("Conventional Deadlift"));
        assert!(name_is_core_lift("Barbell Bench Press"));
        assert!(name_is_core_lift("Weighted Pull-Up"));
        assert!(!name_is_core_lift("Bulgarian Split Squat"));
        assert!(!name_is_core_lift("Goblet Squat"));
        assert!(!name_is_core_lift("Dumbbell Step-Up"));
        assert!(!name_is_core_lift("Leg Curl"));
    }

    #[test]
    fn test_tags_and_patterns() {
        assert!(is_core_lift_tag("Main Lift"));
        assert!(is_core_lift_tag("core-lift"));
        assert!(!is_core_lift_tag("accessory"));
        assert!(is_core_lift_pattern("Hinge"));
        assert!(is_core_lift_pattern("vertical press"));
        assert!(!is_core_lift_pattern("isolation"));
    }
}
