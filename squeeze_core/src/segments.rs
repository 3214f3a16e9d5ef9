//! Segment builders: one pure function per segment kind.
//!
//! Each builder keeps a prefix of every exercise's planned sets, computes
//! work/rest timing and emits the telemetry record explaining the decision.
//! Orders are left at 0 here; the aggregator assigns them after sequencing.

use crate::config::CompressionConfig;
use crate::pairing::{BlockCandidate, PoolEntry, SupersetCandidate};
use crate::types::{
    AccessoryBlockSegment, AccessorySingleSegment, AccessorySupersetSegment, CoreLiftSegment,
    RetainedExercise, Segment, SegmentKind, SegmentTiming, TelemetryEntry,
};

/// Hard cap on retained sets (or rounds) for any accessory work
pub const ACCESSORY_SET_CAP: usize = 3;

/// A segment and the decision record that explains it
#[derive(Clone, Debug)]
pub struct BuiltSegment {
    pub segment: Segment,
    pub telemetry: TelemetryEntry,
}

/// Core lift: keep up to the configured cap, fixed rest between sets
pub fn build_core_lift(entry: PoolEntry<'_>, config: &CompressionConfig) -> BuiltSegment {
    let exercise = retain(entry, config.core_lift_max_sets as usize);
    let kept = exercise.sets.len();
    let rest_seconds = config.core_lift_rest_seconds;
    let timing = SegmentTiming::new(
        exercise.work_seconds(),
        gaps(kept).saturating_mul(rest_seconds),
    );
    let id = format!("core:{}", exercise.exercise_id);

    let mut notes = vec![sets_note(&exercise)];
    if entry.exercise.target_rest_seconds != rest_seconds {
        notes.push(format!(
            "rest {}s between sets (planned {}s)",
            rest_seconds, entry.exercise.target_rest_seconds
        ));
    }

    BuiltSegment {
        telemetry: segment_entry(&id, SegmentKind::CoreLift, "protect_core_lift", notes),
        segment: Segment::CoreLift(CoreLiftSegment {
            id,
            order: 0,
            exercise,
            rest_seconds,
            timing,
        }),
    }
}

/// Superset: alternate two accessories for a shared number of rounds
pub fn build_superset(candidate: &SupersetCandidate<'_>, config: &CompressionConfig) -> BuiltSegment {
    let rounds = ACCESSORY_SET_CAP
        .min(candidate.first.exercise.sets.len())
        .min(candidate.second.exercise.sets.len());
    let first = retain(candidate.first, rounds);
    let second = retain(candidate.second, rounds);
    let rest_seconds = config.superset_rest_seconds;
    let timing = SegmentTiming::new(
        first.work_seconds().saturating_add(second.work_seconds()),
        gaps(rounds).saturating_mul(rest_seconds),
    );
    let id = format!("superset:{}+{}", first.exercise_id, second.exercise_id);

    let notes = vec![
        format!(
            "alternating {} and {} for {} round(s)",
            first.name, second.name, rounds
        ),
        sets_note(&first),
        sets_note(&second),
        format!("grouped by {:?}", candidate.features),
    ];

    BuiltSegment {
        telemetry: segment_entry(&id, SegmentKind::AccessorySuperset, "alternate_superset", notes),
        segment: Segment::AccessorySuperset(AccessorySupersetSegment {
            id,
            order: 0,
            first,
            second,
            rounds: rounds as u32,
            rest_seconds,
            priority: candidate.priority,
            features: candidate.features.clone(),
            timing,
        }),
    }
}

/// Block: run every member back to back for a shared number of rounds
pub fn build_block(candidate: &BlockCandidate<'_>, config: &CompressionConfig) -> BuiltSegment {
    let rounds = candidate
        .members
        .iter()
        .map(|m| m.exercise.sets.len())
        .fold(ACCESSORY_SET_CAP, usize::min);
    let exercises: Vec<RetainedExercise> = candidate
        .members
        .iter()
        .map(|m| retain(*m, rounds))
        .collect();

    let inter_exercise = config.block_inter_exercise_rest_seconds;
    let inter_round = config.block_inter_round_rest_seconds;
    let transitions = gaps(exercises.len()).saturating_mul(rounds as u32);
    let rest = transitions
        .saturating_mul(inter_exercise)
        .saturating_add(gaps(rounds).saturating_mul(inter_round));
    let work = exercises
        .iter()
        .map(RetainedExercise::work_seconds)
        .fold(0, u32::saturating_add);
    let timing = SegmentTiming::new(work, rest);

    let ids: Vec<&str> = exercises.iter().map(|e| e.exercise_id.as_str()).collect();
    let id = format!("block:{}", ids.join("+"));

    let mut notes = vec![candidate.rationale.clone()];
    notes.extend(exercises.iter().map(sets_note));
    notes.push(format!(
        "{}s between exercises, {}s between rounds",
        inter_exercise, inter_round
    ));

    BuiltSegment {
        telemetry: segment_entry(&id, SegmentKind::AccessoryBlock, "circuit_block", notes),
        segment: Segment::AccessoryBlock(AccessoryBlockSegment {
            id,
            order: 0,
            exercises,
            rounds: rounds as u32,
            inter_exercise_rest_seconds: inter_exercise,
            inter_round_rest_seconds: inter_round,
            priority: candidate.priority,
            features: candidate.features.clone(),
            rationale: candidate.rationale.clone(),
            timing,
        }),
    }
}

/// Single: trim a leftover accessory, keeping its own rest
pub fn build_single(entry: PoolEntry<'_>) -> BuiltSegment {
    let exercise = retain(entry, ACCESSORY_SET_CAP);
    let rest_seconds = entry.exercise.target_rest_seconds;
    let timing = SegmentTiming::new(
        exercise.work_seconds(),
        gaps(exercise.sets.len()).saturating_mul(rest_seconds),
    );
    let id = format!("single:{}", exercise.exercise_id);
    let notes = vec![
        sets_note(&exercise),
        "no compatible partner left in the pool".to_string(),
    ];

    BuiltSegment {
        telemetry: segment_entry(&id, SegmentKind::AccessorySingle, "trim_single", notes),
        segment: Segment::AccessorySingle(AccessorySingleSegment {
            id,
            order: 0,
            exercise,
            rest_seconds,
            timing,
        }),
    }
}

/// Keep the first `cap` sets, never fewer than one
fn retain(entry: PoolEntry<'_>, cap: usize) -> RetainedExercise {
    let source = entry.exercise;
    let keep = cap.max(1).min(source.sets.len());
    RetainedExercise {
        exercise_id: source.id.clone(),
        name: source.name.clone(),
        position: entry.position,
        original_set_count: source.sets.len(),
        sets: source.sets[..keep].to_vec(),
    }
}

/// Rest periods between `n` consecutive efforts
fn gaps(n: usize) -> u32 {
    n.saturating_sub(1) as u32
}

fn sets_note(exercise: &RetainedExercise) -> String {
    if exercise.sets.len() < exercise.original_set_count {
        format!(
            "{}: kept {} of {} sets",
            exercise.name,
            exercise.sets.len(),
            exercise.original_set_count
        )
    } else {
        format!("{}: all {} sets kept", exercise.name, exercise.sets.len())
    }
}

fn segment_entry(id: &str, kind: SegmentKind, strategy: &str, notes: Vec<String>) -> TelemetryEntry {
    TelemetryEntry::Segment {
        segment_id: id.to_string(),
        kind,
        strategy: strategy.to_string(),
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::{select_block_group, select_superset_pairs};
    use crate::types::{Equipment, MuscleGroup, Reps, SessionExercise, SetPrescription};
    use std::collections::BTreeSet;

    fn exercise(
        id: &str,
        muscle: MuscleGroup,
        equipment: Equipment,
        sets: u32,
        rest: u32,
    ) -> SessionExercise {
        SessionExercise {
            id: id.into(),
            name: id.into(),
            is_core_lift: false,
            primary_muscle_group: muscle,
            secondary_muscle_groups: BTreeSet::new(),
            equipment: BTreeSet::from([equipment]),
            target_rest_seconds: rest,
            sets: (1..=sets)
                .map(|index| SetPrescription {
                    index,
                    reps: Some(Reps::Count(10)),
                    load: None,
                    effort: None,
                    estimated_duration_seconds: 40,
                })
                .collect(),
            category: None,
        }
    }

    #[test]
    fn test_core_lift_capped_with_fixed_rest() {
        let squat = exercise("squat", MuscleGroup::Quads, Equipment::Barbell, 6, 180);
        let config = CompressionConfig::default();
        let built = build_core_lift(PoolEntry::new(0, &squat), &config);

        let Segment::CoreLift(segment) = &built.segment else {
            panic!("expected core lift segment");
        };
        assert_eq!(segment.id, "core:squat");
        assert_eq!(segment.exercise.sets.len(), 4);
        assert_eq!(segment.exercise.sets[3].index, 4);
        assert_eq!(segment.timing, SegmentTiming::new(160, 3 * 120));
        assert!(matches!(
            built.telemetry,
            TelemetryEntry::Segment { kind: SegmentKind::CoreLift, .. }
        ));
    }

    #[test]
    fn test_core_lift_below_cap_keeps_everything() {
        let press = exercise("press", MuscleGroup::Shoulders, Equipment::Barbell, 2, 150);
        let built = build_core_lift(PoolEntry::new(0, &press), &CompressionConfig::default());
        assert_eq!(built.segment.retained_set_count(), 2);
        assert_eq!(built.segment.timing().rest_seconds, 120);
    }

    #[test]
    fn test_superset_rounds_bounded_by_shorter_exercise() {
        let exercises = vec![
            exercise("a", MuscleGroup::Chest, Equipment::Dumbbell, 5, 60),
            exercise("b", MuscleGroup::Back, Equipment::Cable, 2, 60),
        ];
        let pool: Vec<_> = exercises
            .iter()
            .enumerate()
            .map(|(i, e)| PoolEntry::new(i, e))
            .collect();
        let pair = &select_superset_pairs(&pool)[0];
        let built = build_superset(pair, &CompressionConfig::default());

        let Segment::AccessorySuperset(segment) = &built.segment else {
            panic!("expected superset segment");
        };
        assert_eq!(segment.id, "superset:a+b");
        assert_eq!(segment.rounds, 2);
        assert_eq!(segment.first.sets.len(), 2);
        assert_eq!(segment.second.sets.len(), 2);
        assert_eq!(segment.timing, SegmentTiming::new(160, 60));
    }

    #[test]
    fn test_block_timing_formula() {
        let exercises = vec![
            exercise("a", MuscleGroup::Biceps, Equipment::Cable, 4, 60),
            exercise("b", MuscleGroup::Triceps, Equipment::Cable, 4, 60),
            exercise("c", MuscleGroup::Shoulders, Equipment::Cable, 5, 60),
        ];
        let pool: Vec<_> = exercises
            .iter()
            .enumerate()
            .map(|(i, e)| PoolEntry::new(i, e))
            .collect();
        let group = select_block_group(&pool, 4).unwrap();
        let built = build_block(&group, &CompressionConfig::default());

        let Segment::AccessoryBlock(segment) = &built.segment else {
            panic!("expected block segment");
        };
        assert_eq!(segment.id, "block:a+b+c");
        assert_eq!(segment.rounds, 3);
        // 15s × 2 transitions × 3 rounds + 60s × 2 round breaks
        assert_eq!(segment.timing.rest_seconds, 15 * 2 * 3 + 60 * 2);
        assert_eq!(segment.timing.work_seconds, 9 * 40);
        assert!(!segment.rationale.is_empty());
    }

    #[test]
    fn test_single_uses_own_rest() {
        let raise = exercise("raise", MuscleGroup::Shoulders, Equipment::Dumbbell, 4, 45);
        let built = build_single(PoolEntry::new(3, &raise));

        let Segment::AccessorySingle(segment) = &built.segment else {
            panic!("expected single segment");
        };
        assert_eq!(segment.id, "single:raise");
        assert_eq!(segment.exercise.position, 3);
        assert_eq!(segment.exercise.sets.len(), ACCESSORY_SET_CAP);
        assert_eq!(segment.timing, SegmentTiming::new(120, 90));
    }

    #[test]
    fn test_timing_saturates_instead_of_overflowing() {
        let stretch = exercise("stretch", MuscleGroup::Other, Equipment::Band, 3, u32::MAX);
        let built = build_single(PoolEntry::new(0, &stretch));
        assert_eq!(built.segment.timing().rest_seconds, u32::MAX);
        assert_eq!(built.segment.timing().total_seconds, u32::MAX);

        let config = CompressionConfig {
            core_lift_rest_seconds: u32::MAX,
            ..Default::default()
        };
        let built = build_core_lift(PoolEntry::new(0, &stretch), &config);
        assert_eq!(built.segment.timing().total_seconds, u32::MAX);
    }

    #[test]
    fn test_single_set_exercise_keeps_its_set() {
        let plank = exercise("plank", MuscleGroup::Core, Equipment::Bodyweight, 1, 60);
        let built = build_single(PoolEntry::new(0, &plank));
        assert_eq!(built.segment.retained_set_count(), 1);
        assert_eq!(built.segment.timing().rest_seconds, 0);
    }
}
