//! Coarse "trim sets, then drop exercises" reducer.
//!
//! An alternate strategy to segment compression that works on flat
//! exercise records. It has its own per-set duration model (a fixed cost per
//! set by priority tier, rest included) and shares no heuristics with the
//! segment engine, so results from the two are not comparable
//! second-for-second.

use crate::types::SessionContext;
use serde::{Deserialize, Serialize};

/// Seconds budgeted per set, rest included
pub const HIGH_PRIORITY_SET_SECONDS: u32 = 180;
pub const MEDIUM_PRIORITY_SET_SECONDS: u32 = 150;
pub const LOW_PRIORITY_SET_SECONDS: u32 = 120;

/// Sets never trimmed below these floors
pub const HIGH_PRIORITY_SET_FLOOR: u32 = 3;
pub const DEFAULT_SET_FLOOR: u32 = 2;

const COMPOUND_KEYWORDS: &[&str] = &[
    "compound", "squat", "deadlift", "bench", "press", "row", "pull-up", "pullup", "chin-up",
    "clean", "snatch", "lunge",
];
const ISOLATION_KEYWORDS: &[&str] = &[
    "isolation", "curl", "raise", "extension", "fly", "flye", "kickback", "pushdown", "shrug",
    "crunch", "plank", "calf",
];

/// Exercise importance for trimming
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TrimPriority {
    Low,
    Medium,
    High,
}

impl TrimPriority {
    /// Category keywords win over name keywords
    pub fn classify(name: &str, category: Option<&str>) -> Self {
        let category = category.map(str::to_lowercase);
        if let Some(priority) = category.as_deref().and_then(keyword_priority) {
            return priority;
        }
        keyword_priority(&name.to_lowercase()).unwrap_or(TrimPriority::Medium)
    }

    pub fn seconds_per_set(self) -> u32 {
        match self {
            TrimPriority::High => HIGH_PRIORITY_SET_SECONDS,
            TrimPriority::Medium => MEDIUM_PRIORITY_SET_SECONDS,
            TrimPriority::Low => LOW_PRIORITY_SET_SECONDS,
        }
    }

    pub fn set_floor(self) -> u32 {
        match self {
            TrimPriority::High => HIGH_PRIORITY_SET_FLOOR,
            _ => DEFAULT_SET_FLOOR,
        }
    }
}

fn keyword_priority(text: &str) -> Option<TrimPriority> {
    // isolation first so "leg curl" is not promoted by a compound-sounding word
    if ISOLATION_KEYWORDS.iter().any(|k| text.contains(k)) {
        Some(TrimPriority::Low)
    } else if COMPOUND_KEYWORDS.iter().any(|k| text.contains(k)) {
        Some(TrimPriority::High)
    } else {
        None
    }
}

/// A stored exercise as the reducer sees it
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseRecord {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    /// Position in the session; later exercises are cut first
    pub position: usize,
    pub sets: u32,
}

impl ExerciseRecord {
    pub fn priority(&self) -> TrimPriority {
        TrimPriority::classify(&self.name, self.category.as_deref())
    }

    pub fn estimated_seconds(&self) -> u32 {
        self.sets.saturating_mul(self.priority().seconds_per_set())
    }
}

/// A stored session as the reducer sees it
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub id: String,
    pub exercises: Vec<ExerciseRecord>,
}

impl SessionRecord {
    pub fn from_context(context: &SessionContext) -> Self {
        Self {
            id: context.session_id.clone(),
            exercises: context
                .exercises
                .iter()
                .enumerate()
                .map(|(position, e)| ExerciseRecord {
                    id: e.id.clone(),
                    name: e.name.clone(),
                    category: e.category.clone(),
                    position,
                    sets: e.sets.len() as u32,
                })
                .collect(),
        }
    }

    pub fn estimated_seconds(&self) -> u32 {
        self.exercises
            .iter()
            .map(ExerciseRecord::estimated_seconds)
            .fold(0, u32::saturating_add)
    }
}

/// One change made by the reducer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TrimAction {
    TrimmedSet {
        exercise_id: String,
        from: u32,
        to: u32,
    },
    Dropped {
        exercise_id: String,
    },
}

/// Outcome of reducing one session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrimResult {
    pub session_id: String,
    /// Surviving exercises in original order with their new set counts
    pub exercises: Vec<ExerciseRecord>,
    pub dropped: Vec<String>,
    pub actions: Vec<TrimAction>,
    pub original_seconds: u32,
    pub estimated_seconds: u32,
    pub target_seconds: u32,
    pub meets_target: bool,
}

/// Trim sets from the least important exercises, then drop whole exercises
///
/// High-priority exercises are never dropped and the last remaining exercise
/// always survives.
pub fn reduce_session(record: &SessionRecord, target_minutes: u32) -> TrimResult {
    let target = target_minutes.saturating_mul(60);
    let original_seconds = record.estimated_seconds();
    let mut kept = record.exercises.clone();
    let mut actions = Vec::new();
    let mut dropped = Vec::new();

    // Cheapest-to-lose first: lowest priority, then latest position
    let cut_order = |e: &ExerciseRecord| (e.priority(), std::cmp::Reverse(e.position));
    let total = |exercises: &[ExerciseRecord]| -> u32 {
        exercises
            .iter()
            .map(ExerciseRecord::estimated_seconds)
            .fold(0, u32::saturating_add)
    };

    while total(&kept) > target {
        let Some(victim) = kept
            .iter_mut()
            .filter(|e| e.sets > e.priority().set_floor())
            .min_by_key(|e| cut_order(e))
        else {
            break;
        };
        actions.push(TrimAction::TrimmedSet {
            exercise_id: victim.id.clone(),
            from: victim.sets,
            to: victim.sets - 1,
        });
        victim.sets -= 1;
    }

    while total(&kept) > target && kept.len() > 1 {
        let Some(index) = kept
            .iter()
            .enumerate()
            .filter(|(_, e)| e.priority() != TrimPriority::High)
            .min_by_key(|(_, e)| cut_order(e))
            .map(|(i, _)| i)
        else {
            break;
        };
        let removed = kept.remove(index);
        tracing::debug!("Trim reducer dropped {} from {}", removed.name, record.id);
        actions.push(TrimAction::Dropped {
            exercise_id: removed.id.clone(),
        });
        dropped.push(removed.id);
    }

    let estimated_seconds = total(&kept);
    tracing::info!(
        "Trim reducer: session {} {}s -> {}s ({} action(s))",
        record.id,
        original_seconds,
        estimated_seconds,
        actions.len()
    );

    TrimResult {
        session_id: record.id.clone(),
        exercises: kept,
        dropped,
        actions,
        original_seconds,
        estimated_seconds,
        target_seconds: target,
        meets_target: estimated_seconds <= target,
    }
}
