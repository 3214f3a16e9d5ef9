//! Session and plan compression.
//!
//! A single forward pass per session:
//! 1. Core lifts become capped core-lift segments
//! 2. Compatible accessories are paired into supersets
//! 3. Remaining accessories are grouped into circuit blocks until none qualify
//! 4. Leftovers become singles
//!
//! A superset or block is only kept when it is no slower than its members
//! run as singles. A rejected block releases its anchor as a single so the
//! rest of the pool can still be grouped.
//! 5. Segments are sequenced, numbered, checked for exercise conservation
//!    and summarised
//!
//! There is no retry: when the target is missed the result says so.

use crate::config::CompressionConfig;
use crate::pairing::{remove_placed, select_block_group, select_superset_pairs, PoolEntry};
use crate::segments::{build_block, build_core_lift, build_single, build_superset, BuiltSegment};
use crate::types::{
    CompressedSession, CompressionOutcome, PlanCompressionInput, PlanSummary, Segment,
    SessionContext, SessionSummary, TelemetryEntry,
};
use crate::{Error, Result};
use std::collections::HashMap;

/// Compress one session towards `target_minutes`
pub fn compress_session(
    context: &SessionContext,
    target_minutes: u32,
    config: &CompressionConfig,
) -> Result<CompressedSession> {
    config.validate()?;

    let mut built: Vec<BuiltSegment> = Vec::with_capacity(context.exercises.len());
    let mut pool: Vec<PoolEntry<'_>> = Vec::new();

    for (position, exercise) in context.exercises.iter().enumerate() {
        let entry = PoolEntry::new(position, exercise);
        if exercise.is_core_lift {
            built.push(build_core_lift(entry, config));
        } else {
            pool.push(entry);
        }
    }

    let mut skipped: Vec<TelemetryEntry> = Vec::new();

    for pair in select_superset_pairs(&pool) {
        let candidate = build_superset(&pair, config);
        if let Some(entry) = slower_than_separate(&candidate, &[pair.first, pair.second]) {
            skipped.push(entry);
            continue;
        }
        remove_placed(&mut pool, &pair.exercise_ids());
        built.push(candidate);
    }

    let max_block = config.max_block_exercises as usize;
    let mut released: Vec<PoolEntry<'_>> = Vec::new();
    while let Some(group) = select_block_group(&pool, max_block) {
        let candidate = build_block(&group, config);
        if let Some(entry) = slower_than_separate(&candidate, &group.members) {
            skipped.push(entry);
            let anchor = group.members[0];
            remove_placed(&mut pool, &[anchor.id()]);
            released.push(anchor);
            continue;
        }
        remove_placed(&mut pool, &group.exercise_ids());
        built.push(candidate);
    }

    built.extend(released.into_iter().chain(pool.drain(..)).map(build_single));

    sequence(&mut built);
    let (segments, mut telemetry): (Vec<Segment>, Vec<TelemetryEntry>) = built
        .into_iter()
        .map(|b| (b.segment, b.telemetry))
        .unzip();

    verify_conservation(context, &segments)?;
    telemetry.extend(skipped);

    let summary = summarize(context, &segments, target_minutes);
    telemetry.push(TelemetryEntry::Session {
        session_id: context.session_id.clone(),
        target_seconds: summary.target_seconds,
        original_seconds: summary.original_duration_seconds,
        compressed_seconds: summary.compressed_duration_seconds,
        segment_count: summary.segment_count,
        meets_target: summary.meets_target,
    });

    if summary.meets_target {
        tracing::info!(
            "Session {}: {}s -> {}s in {} segment(s)",
            context.session_id,
            summary.original_duration_seconds,
            summary.compressed_duration_seconds,
            summary.segment_count
        );
    } else {
        tracing::warn!(
            "Session {}: {}s still exceeds the {}s target",
            context.session_id,
            summary.compressed_duration_seconds,
            summary.target_seconds
        );
    }

    Ok(CompressedSession {
        context: context.clone(),
        segments,
        summary,
        telemetry,
    })
}

/// Compress every session of a plan independently
pub fn compress_plan(
    input: &PlanCompressionInput,
    target_minutes: u32,
    config: &CompressionConfig,
) -> Result<CompressionOutcome> {
    let sessions = input
        .sessions
        .iter()
        .map(|s| compress_session(s, target_minutes, config))
        .collect::<Result<Vec<_>>>()?;

    let original: u64 = sessions
        .iter()
        .map(|s| u64::from(s.summary.original_duration_seconds))
        .sum();
    let compressed: u64 = sessions
        .iter()
        .map(|s| u64::from(s.summary.compressed_duration_seconds))
        .sum();
    let meeting = sessions.iter().filter(|s| s.summary.meets_target).count();
    let meets_time_constraint = meeting == sessions.len();

    tracing::info!(
        "Compressed {} session(s); {} within {} min",
        sessions.len(),
        meeting,
        target_minutes
    );

    Ok(CompressionOutcome {
        plan_id: input.plan_id.clone(),
        summary: PlanSummary {
            session_count: sessions.len(),
            target_minutes,
            original_duration_seconds: original,
            compressed_duration_seconds: compressed,
            duration_delta_seconds: original as i64 - compressed as i64,
            sessions_meeting_target: meeting,
        },
        sessions,
        meets_time_constraint,
    })
}

/// Decision record when a grouping takes longer than its members as singles
fn slower_than_separate(
    candidate: &BuiltSegment,
    members: &[PoolEntry<'_>],
) -> Option<TelemetryEntry> {
    let grouped_seconds = candidate.segment.timing().total_seconds;
    let separate_seconds = members
        .iter()
        .map(|m| build_single(*m).segment.timing().total_seconds)
        .fold(0, u32::saturating_add);
    if grouped_seconds <= separate_seconds {
        return None;
    }

    tracing::debug!(
        "Skipping {}: {}s grouped vs {}s as singles",
        candidate.segment.id(),
        grouped_seconds,
        separate_seconds
    );
    Some(TelemetryEntry::Skipped {
        candidate_id: candidate.segment.id().to_string(),
        kind: candidate.segment.kind(),
        grouped_seconds,
        separate_seconds,
    })
}

/// Core lifts first in plan order, then accessories by earliest plan position
fn sequence(built: &mut [BuiltSegment]) {
    built.sort_by_key(|b| {
        let accessory = !matches!(b.segment, Segment::CoreLift(_));
        (accessory, b.segment.first_position())
    });
    for (index, b) in built.iter_mut().enumerate() {
        b.segment.set_order(index as u32 + 1);
    }
}

/// Every session exercise appears in exactly one segment, and nothing else does
///
/// A failure here is a defect in the engine and is never repaired.
pub fn verify_conservation(context: &SessionContext, segments: &[Segment]) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for segment in segments {
        for exercise in segment.exercises() {
            let id = exercise.exercise_id.as_str();
            if context.position_of(id).is_none() {
                return Err(invariant(
                    context,
                    format!("segment {} references unknown exercise {}", segment.id(), id),
                ));
            }
            if let Some(previous) = seen.insert(id, segment.id()) {
                return Err(invariant(
                    context,
                    format!(
                        "exercise {} placed in both {} and {}",
                        id,
                        previous,
                        segment.id()
                    ),
                ));
            }
        }
    }

    if let Some(missing) = context
        .exercises
        .iter()
        .find(|e| !seen.contains_key(e.id.as_str()))
    {
        return Err(invariant(
            context,
            format!("exercise {} is not in any segment", missing.id),
        ));
    }

    Ok(())
}

fn invariant(context: &SessionContext, detail: String) -> Error {
    tracing::error!("Session {}: {}", context.session_id, detail);
    Error::Invariant {
        session_id: context.session_id.clone(),
        detail,
    }
}

fn summarize(context: &SessionContext, segments: &[Segment], target_minutes: u32) -> SessionSummary {
    let compressed = segments
        .iter()
        .map(|s| s.timing().total_seconds)
        .fold(0, u32::saturating_add);
    let original = context.original_duration_seconds;
    let target = target_minutes.saturating_mul(60);

    SessionSummary {
        session_id: context.session_id.clone(),
        original_duration_seconds: original,
        compressed_duration_seconds: compressed,
        duration_delta_seconds: i64::from(original) - i64::from(compressed),
        target_seconds: target,
        target_delta_seconds: i64::from(target) - i64::from(compressed),
        meets_target: compressed <= target,
        segment_count: segments.len(),
        original_set_count: context.exercises.iter().map(|e| e.sets.len()).sum(),
        retained_set_count: segments.iter().map(Segment::retained_set_count).sum(),
    }
}
