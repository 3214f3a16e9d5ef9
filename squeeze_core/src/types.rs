//! Core domain types for the session compression engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Canonical exercises, sets and sessions produced by the translator
//! - Segments, the schedulable units of a compressed session
//! - Telemetry records and duration summaries

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Vocabulary Types
// ============================================================================

/// Equipment an exercise needs
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Kettlebell,
    Bodyweight,
    Machine,
    Cable,
    Band,
    Bench,
    PullupBar,
    Other,
}

impl Equipment {
    /// Barbells, dumbbells and kettlebells
    pub fn is_free_weight(self) -> bool {
        matches!(
            self,
            Equipment::Barbell | Equipment::Dumbbell | Equipment::Kettlebell
        )
    }

    /// Whether two exercises using this could end up waiting on each other.
    /// Bodyweight work needs no station and `Other` tells us nothing.
    pub fn is_contended(self) -> bool {
        !matches!(self, Equipment::Bodyweight | Equipment::Other)
    }
}

/// Muscle group targeted by an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Core,
    FullBody,
    Other,
}

impl MuscleGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Forearms => "forearms",
            MuscleGroup::Quads => "quads",
            MuscleGroup::Hamstrings => "hamstrings",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Calves => "calves",
            MuscleGroup::Core => "core",
            MuscleGroup::FullBody => "full_body",
            MuscleGroup::Other => "other",
        }
    }
}

// ============================================================================
// Canonical Session Types
// ============================================================================

/// Repetition target for a set: a count, or free text such as "8-10" or "AMRAP"
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Reps {
    Count(u32),
    Text(String),
}

impl Reps {
    /// Numeric rep count, if the target is a plain number
    pub fn as_count(&self) -> Option<u32> {
        match self {
            Reps::Count(n) => Some(*n),
            Reps::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One planned set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetPrescription {
    /// 1-based position within the exercise
    pub index: u32,
    pub reps: Option<Reps>,
    pub load: Option<String>,
    pub effort: Option<String>,
    pub estimated_duration_seconds: u32,
}

/// Canonical exercise produced by the translator
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionExercise {
    pub id: String,
    pub name: String,
    pub is_core_lift: bool,
    pub primary_muscle_group: MuscleGroup,
    pub secondary_muscle_groups: BTreeSet<MuscleGroup>,
    pub equipment: BTreeSet<Equipment>,
    pub target_rest_seconds: u32,
    /// Never empty
    pub sets: Vec<SetPrescription>,
    /// Free-form category from the source plan, if any
    pub category: Option<String>,
}

impl SessionExercise {
    /// Sum of estimated set durations
    pub fn work_seconds(&self) -> u32 {
        self.sets
            .iter()
            .fold(0, |acc, s| acc.saturating_add(s.estimated_duration_seconds))
    }

    /// Work plus rest between consecutive sets, as originally planned
    pub fn planned_duration_seconds(&self) -> u32 {
        let rests = self.sets.len().saturating_sub(1) as u32;
        self.work_seconds()
            .saturating_add(rests.saturating_mul(self.target_rest_seconds))
    }

    /// Primary and secondary groups together
    pub fn muscle_groups(&self) -> BTreeSet<MuscleGroup> {
        let mut groups = self.secondary_muscle_groups.clone();
        groups.insert(self.primary_muscle_group);
        groups
    }

    /// Whether both exercises need the same station or implement
    pub fn competes_for_equipment(&self, other: &SessionExercise) -> bool {
        self.equipment
            .iter()
            .any(|e| e.is_contended() && other.equipment.contains(e))
    }

    /// Whether both exercises hit the same primary group. `Other` never clashes.
    pub fn shares_primary_muscle(&self, other: &SessionExercise) -> bool {
        self.primary_muscle_group != MuscleGroup::Other
            && self.primary_muscle_group == other.primary_muscle_group
    }
}

/// One training session in canonical form
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionContext {
    pub session_id: String,
    pub microcycle_id: String,
    pub day_of_week: Option<Weekday>,
    pub original_duration_seconds: u32,
    /// Original plan order; the tie-break for every downstream sort
    pub exercises: Vec<SessionExercise>,
}

impl SessionContext {
    /// Position of an exercise in the original plan order
    pub fn position_of(&self, exercise_id: &str) -> Option<usize> {
        self.exercises.iter().position(|e| e.id == exercise_id)
    }

    /// Σ(work + rest) over all exercises
    pub fn derived_duration_seconds(&self) -> u32 {
        self.exercises
            .iter()
            .map(SessionExercise::planned_duration_seconds)
            .fold(0, u32::saturating_add)
    }
}

/// Canonical plan handed to the compressor
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanCompressionInput {
    pub plan_id: Option<String>,
    /// Time constraint declared by the plan itself, if any
    pub target_minutes: Option<u32>,
    pub sessions: Vec<SessionContext>,
}

// ============================================================================
// Segment Types
// ============================================================================

/// Work/rest accounting for a segment
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SegmentTiming {
    pub work_seconds: u32,
    pub rest_seconds: u32,
    pub total_seconds: u32,
}

impl SegmentTiming {
    pub fn new(work_seconds: u32, rest_seconds: u32) -> Self {
        Self {
            work_seconds,
            rest_seconds,
            total_seconds: work_seconds.saturating_add(rest_seconds),
        }
    }
}

/// An exercise as it appears inside a segment: a prefix of its planned sets
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RetainedExercise {
    pub exercise_id: String,
    pub name: String,
    /// Position in the original plan
    pub position: usize,
    pub original_set_count: usize,
    pub sets: Vec<SetPrescription>,
}

impl RetainedExercise {
    pub fn work_seconds(&self) -> u32 {
        self.sets
            .iter()
            .fold(0, |acc, s| acc.saturating_add(s.estimated_duration_seconds))
    }
}

/// Discriminator for segment variants
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    CoreLift,
    AccessorySuperset,
    AccessoryBlock,
    AccessorySingle,
}

impl SegmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::CoreLift => "core_lift",
            SegmentKind::AccessorySuperset => "accessory_superset",
            SegmentKind::AccessoryBlock => "accessory_block",
            SegmentKind::AccessorySingle => "accessory_single",
        }
    }
}

/// How strongly a grouping is recommended
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GroupPriority {
    Primary,
    Secondary,
}

/// Why exercises were grouped together
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupingFeature {
    DisjointEquipment,
    DistinctPrimaryMuscle,
    NoSharedMuscles,
    MatchedSetCount,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CoreLiftSegment {
    pub id: String,
    pub order: u32,
    pub exercise: RetainedExercise,
    pub rest_seconds: u32,
    pub timing: SegmentTiming,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccessorySupersetSegment {
    pub id: String,
    pub order: u32,
    pub first: RetainedExercise,
    pub second: RetainedExercise,
    pub rounds: u32,
    pub rest_seconds: u32,
    pub priority: GroupPriority,
    pub features: Vec<GroupingFeature>,
    pub timing: SegmentTiming,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccessoryBlockSegment {
    pub id: String,
    pub order: u32,
    pub exercises: Vec<RetainedExercise>,
    pub rounds: u32,
    pub inter_exercise_rest_seconds: u32,
    pub inter_round_rest_seconds: u32,
    pub priority: GroupPriority,
    pub features: Vec<GroupingFeature>,
    pub rationale: String,
    pub timing: SegmentTiming,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccessorySingleSegment {
    pub id: String,
    pub order: u32,
    pub exercise: RetainedExercise,
    pub rest_seconds: u32,
    pub timing: SegmentTiming,
}

/// One schedulable unit of a compressed session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    CoreLift(CoreLiftSegment),
    AccessorySuperset(AccessorySupersetSegment),
    AccessoryBlock(AccessoryBlockSegment),
    AccessorySingle(AccessorySingleSegment),
}

impl Segment {
    pub fn id(&self) -> &str {
        match self {
            Segment::CoreLift(s) => &s.id,
            Segment::AccessorySuperset(s) => &s.id,
            Segment::AccessoryBlock(s) => &s.id,
            Segment::AccessorySingle(s) => &s.id,
        }
    }

    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::CoreLift(_) => SegmentKind::CoreLift,
            Segment::AccessorySuperset(_) => SegmentKind::AccessorySuperset,
            Segment::AccessoryBlock(_) => SegmentKind::AccessoryBlock,
            Segment::AccessorySingle(_) => SegmentKind::AccessorySingle,
        }
    }

    pub fn order(&self) -> u32 {
        match self {
            Segment::CoreLift(s) => s.order,
            Segment::AccessorySuperset(s) => s.order,
            Segment::AccessoryBlock(s) => s.order,
            Segment::AccessorySingle(s) => s.order,
        }
    }

    pub(crate) fn set_order(&mut self, order: u32) {
        match self {
            Segment::CoreLift(s) => s.order = order,
            Segment::AccessorySuperset(s) => s.order = order,
            Segment::AccessoryBlock(s) => s.order = order,
            Segment::AccessorySingle(s) => s.order = order,
        }
    }

    pub fn timing(&self) -> SegmentTiming {
        match self {
            Segment::CoreLift(s) => s.timing,
            Segment::AccessorySuperset(s) => s.timing,
            Segment::AccessoryBlock(s) => s.timing,
            Segment::AccessorySingle(s) => s.timing,
        }
    }

    /// Exercises in the order they are performed within the segment
    pub fn exercises(&self) -> Vec<&RetainedExercise> {
        match self {
            Segment::CoreLift(s) => vec![&s.exercise],
            Segment::AccessorySuperset(s) => vec![&s.first, &s.second],
            Segment::AccessoryBlock(s) => s.exercises.iter().collect(),
            Segment::AccessorySingle(s) => vec![&s.exercise],
        }
    }

    /// Earliest original plan position among the segment's exercises
    pub fn first_position(&self) -> usize {
        self.exercises()
            .iter()
            .map(|e| e.position)
            .min()
            .unwrap_or(usize::MAX)
    }

    pub fn retained_set_count(&self) -> usize {
        self.exercises().iter().map(|e| e.sets.len()).sum()
    }
}

// ============================================================================
// Telemetry and Summary Types
// ============================================================================

/// One decision record in the rationale trail
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum TelemetryEntry {
    Segment {
        segment_id: String,
        kind: SegmentKind,
        strategy: String,
        notes: Vec<String>,
    },
    /// A grouping that was proposed but would have taken longer than
    /// running its members as singles
    Skipped {
        candidate_id: String,
        kind: SegmentKind,
        grouped_seconds: u32,
        separate_seconds: u32,
    },
    Session {
        session_id: String,
        target_seconds: u32,
        original_seconds: u32,
        compressed_seconds: u32,
        segment_count: usize,
        meets_target: bool,
    },
}

/// Duration accounting for one session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub original_duration_seconds: u32,
    pub compressed_duration_seconds: u32,
    /// original − compressed; negative when compression made it longer
    pub duration_delta_seconds: i64,
    pub target_seconds: u32,
    /// target − compressed; negative when the target was missed
    pub target_delta_seconds: i64,
    pub meets_target: bool,
    pub segment_count: usize,
    pub original_set_count: usize,
    pub retained_set_count: usize,
}

/// A session after compression
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompressedSession {
    pub context: SessionContext,
    pub segments: Vec<Segment>,
    pub summary: SessionSummary,
    pub telemetry: Vec<TelemetryEntry>,
}

/// Plan-wide totals
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanSummary {
    pub session_count: usize,
    pub target_minutes: u32,
    pub original_duration_seconds: u64,
    pub compressed_duration_seconds: u64,
    pub duration_delta_seconds: i64,
    pub sessions_meeting_target: usize,
}

/// Result of compressing a whole plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompressionOutcome {
    pub plan_id: Option<String>,
    pub sessions: Vec<CompressedSession>,
    pub summary: PlanSummary,
    pub meets_time_constraint: bool,
}
