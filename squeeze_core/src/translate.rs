//! Translation of loosely-typed plans into canonical sessions.
//!
//! Upstream plans are not versioned with this engine, so every field is
//! optional and may arrive in several shapes (camelCase or snake_case keys,
//! numbers as strings, a set count instead of a set list, one equipment
//! string instead of a list). Malformed data is absorbed with defaults;
//! anything that leaves nothing usable is dropped and logged at debug level.

use crate::types::{
    Equipment, MuscleGroup, PlanCompressionInput, Reps, SessionContext, SessionExercise,
    SetPrescription,
};
use crate::vocabulary;
use chrono::Weekday;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

/// Sets synthesised when a plan gives no usable set count
pub const DEFAULT_SET_COUNT: u32 = 3;
/// Rest between sets when the plan gives none
pub const DEFAULT_CORE_LIFT_REST_SECONDS: u32 = 150;
pub const DEFAULT_ACCESSORY_REST_SECONDS: u32 = 60;
/// Set duration when reps are not a plain number
pub const DEFAULT_SET_DURATION_SECONDS: u32 = 40;
pub const MIN_SET_DURATION_SECONDS: u32 = 25;
/// Ceilings applied to plan values; anything larger is clamped with a warning
pub const MAX_SET_COUNT: u32 = 20;
pub const MAX_REST_SECONDS: u32 = 3600;
pub const MAX_SET_DURATION_SECONDS: u32 = 3600;

const ID_KEYS: &[&str] = &["id", "uuid", "_id"];
const MICROCYCLE_KEYS: &[&str] = &["microcycles", "micro_cycles", "weeks"];
const SESSION_KEYS: &[&str] = &["sessions", "workouts", "days"];
const EXERCISE_KEYS: &[&str] = &["exercises", "movements"];
const TARGET_KEYS: &[&str] = &[
    "targetMinutes",
    "target_minutes",
    "timeConstraintMinutes",
    "time_constraint_minutes",
];
const DAY_KEYS: &[&str] = &["dayOfWeek", "day_of_week", "weekday", "day"];
const DURATION_SECONDS_KEYS: &[&str] = &["durationSeconds", "duration_seconds"];
const DURATION_MINUTES_KEYS: &[&str] = &[
    "durationMinutes",
    "duration_minutes",
    "estimatedDurationMinutes",
    "estimated_duration_minutes",
];
const NAME_KEYS: &[&str] = &["name", "exerciseName", "exercise_name", "title"];
const EQUIPMENT_KEYS: &[&str] = &["equipment", "equipments"];
const PRIMARY_MUSCLE_KEYS: &[&str] = &[
    "primaryMuscleGroup",
    "primary_muscle_group",
    "primaryMuscle",
    "primary_muscle",
    "muscleGroup",
    "muscle_group",
];
const SECONDARY_MUSCLE_KEYS: &[&str] = &[
    "secondaryMuscleGroups",
    "secondary_muscle_groups",
    "secondaryMuscles",
    "secondary_muscles",
];
const CORE_FLAG_KEYS: &[&str] = &["isCoreLift", "is_core_lift", "coreLift", "core_lift"];
const PATTERN_KEYS: &[&str] = &["movementPattern", "movement_pattern", "pattern"];
const REST_KEYS: &[&str] = &[
    "restSeconds",
    "rest_seconds",
    "targetRestSeconds",
    "target_rest_seconds",
    "restPeriodSeconds",
    "rest_period_seconds",
    "rest",
];
const SETS_KEYS: &[&str] = &["sets", "setPrescriptions", "set_prescriptions"];
const SET_COUNT_KEYS: &[&str] = &["setCount", "set_count", "targetSets", "target_sets"];
const REPS_KEYS: &[&str] = &["reps", "targetReps", "target_reps", "repetitions"];
const LOAD_KEYS: &[&str] = &["load", "weight", "targetLoad", "target_load"];
const EFFORT_KEYS: &[&str] = &["effort", "rpe", "targetRpe", "target_rpe", "rir", "intensity"];
const SET_DURATION_KEYS: &[&str] = &[
    "estimatedDurationSeconds",
    "estimated_duration_seconds",
    "durationSeconds",
    "duration_seconds",
];
const CATEGORY_KEYS: &[&str] = &["category", "exerciseCategory", "exercise_category"];

/// Translate a raw plan into canonical sessions
///
/// Returns `None` when no session survives normalization; callers treat that
/// as "nothing to compress".
pub fn translate(raw: &Value) -> Option<PlanCompressionInput> {
    let Some(plan) = raw.as_object() else {
        tracing::debug!("Plan is not a JSON object, nothing to translate");
        return None;
    };

    let plan_id = text_field(plan, ID_KEYS);
    let target_minutes = field(plan, TARGET_KEYS).and_then(as_u32);

    // A plan without microcycles is treated as a single microcycle
    let microcycles: Vec<&Value> = match field(plan, MICROCYCLE_KEYS) {
        Some(Value::Array(items)) => items.iter().collect(),
        _ => vec![raw],
    };

    let mut sessions = Vec::new();
    for (mc_index, microcycle) in microcycles.into_iter().enumerate() {
        let Some(mc) = microcycle.as_object() else {
            tracing::debug!("Skipping microcycle #{}: not an object", mc_index + 1);
            continue;
        };
        let microcycle_id = text_field(mc, ID_KEYS)
            .or_else(|| plan_id.clone())
            .unwrap_or_else(|| format!("microcycle-{}", mc_index + 1));

        let Some(raw_sessions) = field(mc, SESSION_KEYS).and_then(Value::as_array) else {
            tracing::debug!("Microcycle {} has no sessions", microcycle_id);
            continue;
        };

        for (s_index, raw_session) in raw_sessions.iter().enumerate() {
            if let Some(session) = translate_session(raw_session, &microcycle_id, s_index) {
                sessions.push(session);
            }
        }
    }

    if sessions.is_empty() {
        tracing::debug!("Plan yielded no usable sessions");
        return None;
    }

    tracing::info!("Translated plan with {} session(s)", sessions.len());

    Some(PlanCompressionInput {
        plan_id,
        target_minutes,
        sessions,
    })
}

/// Translate one raw session; `None` when no exercise survives
pub fn translate_session(raw: &Value, microcycle_id: &str, index: usize) -> Option<SessionContext> {
    let obj = raw.as_object()?;
    let session_id =
        text_field(obj, ID_KEYS).unwrap_or_else(|| format!("{}-s{}", microcycle_id, index + 1));

    let raw_exercises = field(obj, EXERCISE_KEYS)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut seen = HashSet::new();
    let mut exercises = Vec::new();
    for (e_index, raw_exercise) in raw_exercises.iter().enumerate() {
        let Some(exercise) = translate_exercise(raw_exercise, &session_id, e_index) else {
            continue;
        };
        if !seen.insert(exercise.id.clone()) {
            tracing::warn!(
                "Session {}: duplicate exercise id {}, keeping the first",
                session_id,
                exercise.id
            );
            continue;
        }
        exercises.push(exercise);
    }

    if exercises.is_empty() {
        tracing::debug!("Session {} has no usable exercises, dropping it", session_id);
        return None;
    }

    let mut context = SessionContext {
        session_id,
        microcycle_id: microcycle_id.to_string(),
        day_of_week: field(obj, DAY_KEYS).and_then(parse_weekday),
        original_duration_seconds: 0,
        exercises,
    };
    context.original_duration_seconds =
        declared_duration_seconds(obj).unwrap_or_else(|| context.derived_duration_seconds());

    Some(context)
}

/// Translate one raw exercise; `None` when it yields zero sets
pub fn translate_exercise(raw: &Value, session_id: &str, index: usize) -> Option<SessionExercise> {
    let obj = raw.as_object()?;
    let id = text_field(obj, ID_KEYS).unwrap_or_else(|| format!("{}-ex{}", session_id, index + 1));
    let name = text_field(obj, NAME_KEYS).unwrap_or_else(|| id.clone());

    let sets = build_sets(obj, &id);
    if sets.is_empty() {
        tracing::debug!("Exercise {} ({}) has no sets, dropping it", id, name);
        return None;
    }

    let equipment = normalize_equipment(field(obj, EQUIPMENT_KEYS));
    let primary_muscle_group = field(obj, PRIMARY_MUSCLE_KEYS)
        .and_then(Value::as_str)
        .and_then(vocabulary::match_muscle_group)
        .unwrap_or(MuscleGroup::Other);
    let mut secondary_muscle_groups: BTreeSet<MuscleGroup> =
        string_list(field(obj, SECONDARY_MUSCLE_KEYS))
            .iter()
            .filter_map(|s| vocabulary::match_muscle_group(s))
            .collect();
    secondary_muscle_groups.remove(&primary_muscle_group);

    let is_core_lift = classify_core_lift(obj, &name, &equipment);
    let target_rest_seconds = match REST_KEYS.iter().find_map(|k| obj.get(*k).and_then(as_u32)) {
        Some(rest) => clamp(rest, MAX_REST_SECONDS, &id, "rest seconds"),
        None if is_core_lift => DEFAULT_CORE_LIFT_REST_SECONDS,
        None => DEFAULT_ACCESSORY_REST_SECONDS,
    };

    Some(SessionExercise {
        id,
        name,
        is_core_lift,
        primary_muscle_group,
        secondary_muscle_groups,
        equipment,
        target_rest_seconds,
        sets,
        category: text_field(obj, CATEGORY_KEYS),
    })
}

/// Explicit flag, then tags, then movement pattern, then name keywords
fn classify_core_lift(obj: &Map<String, Value>, name: &str, equipment: &BTreeSet<Equipment>) -> bool {
    if let Some(flag) = field(obj, CORE_FLAG_KEYS).and_then(as_flag) {
        return flag;
    }

    if string_list(obj.get("tags"))
        .iter()
        .any(|t| vocabulary::is_core_lift_tag(t))
    {
        tracing::debug!("{}: core lift by tag", name);
        return true;
    }

    let pattern = obj
        .get("metadata")
        .and_then(Value::as_object)
        .and_then(|meta| field(meta, PATTERN_KEYS))
        .or_else(|| field(obj, PATTERN_KEYS))
        .and_then(Value::as_str);
    if let Some(pattern) = pattern {
        let loadable = equipment
            .iter()
            .any(|e| e.is_free_weight() || *e == Equipment::Bodyweight);
        if loadable && vocabulary::is_core_lift_pattern(pattern) {
            tracing::debug!("{}: core lift by movement pattern {}", name, pattern);
            return true;
        }
    }

    vocabulary::name_is_core_lift(name)
}

fn build_sets(obj: &Map<String, Value>, id: &str) -> Vec<SetPrescription> {
    let reps = field(obj, REPS_KEYS).and_then(parse_reps);
    let load = field(obj, LOAD_KEYS).and_then(as_text);
    let effort = field(obj, EFFORT_KEYS).and_then(as_text);

    match field(obj, SETS_KEYS) {
        Some(Value::Array(items)) => {
            if items.len() > MAX_SET_COUNT as usize {
                tracing::warn!(
                    "Exercise {}: {} sets listed, keeping the first {}",
                    id,
                    items.len(),
                    MAX_SET_COUNT
                );
            }
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(set) => Some(SetDraft {
                        reps: field(set, REPS_KEYS).and_then(parse_reps).or_else(|| reps.clone()),
                        load: field(set, LOAD_KEYS).and_then(as_text).or_else(|| load.clone()),
                        effort: field(set, EFFORT_KEYS)
                            .and_then(as_text)
                            .or_else(|| effort.clone()),
                        duration: field(set, SET_DURATION_KEYS).and_then(as_u32),
                    }),
                    Value::Number(_) | Value::String(_) => Some(SetDraft {
                        reps: parse_reps(item),
                        load: load.clone(),
                        effort: effort.clone(),
                        duration: None,
                    }),
                    _ => None,
                })
                .enumerate()
                .take(MAX_SET_COUNT as usize)
                .map(|(i, draft)| draft.into_set(i as u32 + 1))
                .collect()
        }
        other => {
            let count = other
                .or_else(|| field(obj, SET_COUNT_KEYS))
                .map(|v| as_u32(v).unwrap_or(DEFAULT_SET_COUNT))
                .unwrap_or(DEFAULT_SET_COUNT);
            let count = clamp(count, MAX_SET_COUNT, id, "sets");
            (1..=count)
                .map(|index| {
                    SetDraft {
                        reps: reps.clone(),
                        load: load.clone(),
                        effort: effort.clone(),
                        duration: None,
                    }
                    .into_set(index)
                })
                .collect()
        }
    }
}

struct SetDraft {
    reps: Option<Reps>,
    load: Option<String>,
    effort: Option<String>,
    duration: Option<u32>,
}

impl SetDraft {
    fn into_set(self, index: u32) -> SetPrescription {
        let estimated_duration_seconds = self
            .duration
            .filter(|d| *d > 0)
            .unwrap_or_else(|| estimate_set_duration(self.reps.as_ref()))
            .min(MAX_SET_DURATION_SECONDS);
        SetPrescription {
            index,
            reps: self.reps,
            load: self.load,
            effort: self.effort,
            estimated_duration_seconds,
        }
    }
}

/// reps×3+10 seconds with a 25s floor; 40s when reps are not a number
pub fn estimate_set_duration(reps: Option<&Reps>) -> u32 {
    match reps.and_then(Reps::as_count) {
        Some(n) => n
            .saturating_mul(3)
            .saturating_add(10)
            .max(MIN_SET_DURATION_SECONDS),
        None => DEFAULT_SET_DURATION_SECONDS,
    }
}

fn clamp(value: u32, ceiling: u32, exercise_id: &str, what: &str) -> u32 {
    if value > ceiling {
        tracing::warn!(
            "Exercise {}: {} {} exceeds {}, clamping",
            exercise_id,
            value,
            what,
            ceiling
        );
        ceiling
    } else {
        value
    }
}

fn normalize_equipment(value: Option<&Value>) -> BTreeSet<Equipment> {
    let mut equipment: BTreeSet<Equipment> = string_list(value)
        .iter()
        .map(|s| vocabulary::parse_equipment(s))
        .collect();
    if equipment.is_empty() {
        equipment.insert(Equipment::Other);
    }
    equipment
}

fn declared_duration_seconds(obj: &Map<String, Value>) -> Option<u32> {
    field(obj, DURATION_SECONDS_KEYS)
        .and_then(as_u32)
        .or_else(|| {
            field(obj, DURATION_MINUTES_KEYS)
                .and_then(as_u32)
                .map(|m| m.saturating_mul(60))
        })
        .filter(|s| *s > 0)
}

fn parse_weekday(value: &Value) -> Option<Weekday> {
    let number = match value {
        Value::Number(_) => as_u32(value),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    match number {
        Some(1) => Some(Weekday::Mon),
        Some(2) => Some(Weekday::Tue),
        Some(3) => Some(Weekday::Wed),
        Some(4) => Some(Weekday::Thu),
        Some(5) => Some(Weekday::Fri),
        Some(6) => Some(Weekday::Sat),
        Some(7) => Some(Weekday::Sun),
        Some(_) => None,
        None => value.as_str().and_then(|s| s.trim().parse().ok()),
    }
}

fn parse_reps(value: &Value) -> Option<Reps> {
    match value {
        Value::Number(_) => as_u32(value).map(Reps::Count),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else if let Ok(n) = trimmed.parse::<u32>() {
                Some(Reps::Count(n))
            } else {
                Some(Reps::Text(trimmed.to_string()))
            }
        }
        _ => None,
    }
}

// ============================================================================
// Value helpers
// ============================================================================

/// First key that is present and not null
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(obj, keys).and_then(as_text)
}

/// Non-empty string, or a number rendered as text
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-negative whole number from a number or a string such as "90" or "90s"
fn as_u32(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s
            .trim()
            .trim_end_matches(|c: char| c.is_alphabetic())
            .trim()
            .parse::<f64>()
            .ok()?,
        _ => return None,
    };
    if number.is_finite() && number >= 0.0 {
        Some(number.round().min(u32::MAX as f64) as u32)
    } else {
        None
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A single string, a comma-separated string, or a list of strings
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => items.iter().filter_map(as_text).collect(),
        _ => Vec::new(),
    }
}
