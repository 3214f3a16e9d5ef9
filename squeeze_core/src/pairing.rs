//! Superset and circuit-block selection over a session's accessory pool.
//!
//! Selection is greedy, first-fit and never backtracks. The pool is walked in
//! original plan order, so earlier exercises anchor groups and win ties.
//!
//! Compatibility rules:
//! - a superset needs disjoint (contended) equipment AND distinct primary
//!   muscle groups, so both halves can be set up at once and each muscle
//!   recovers while the other works
//! - a block only needs distinct primary muscle groups between every pair
//!   of members; equipment may be shared because the circuit is sequential

use crate::types::{GroupPriority, GroupingFeature, MuscleGroup, SessionExercise};

/// An unplaced exercise and its original plan position
#[derive(Clone, Copy, Debug)]
pub struct PoolEntry<'a> {
    pub position: usize,
    pub exercise: &'a SessionExercise,
}

impl<'a> PoolEntry<'a> {
    pub fn new(position: usize, exercise: &'a SessionExercise) -> Self {
        Self { position, exercise }
    }

    pub fn id(&self) -> &'a str {
        &self.exercise.id
    }
}

/// Pairwise compatibility between two exercises
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Compatibility {
    pub disjoint_equipment: bool,
    pub distinct_primary_muscle: bool,
    pub no_shared_muscles: bool,
    pub matched_set_count: bool,
}

impl Compatibility {
    pub fn between(a: &SessionExercise, b: &SessionExercise) -> Self {
        let a_groups = a.muscle_groups();
        let no_shared_muscles = b
            .muscle_groups()
            .iter()
            .all(|g| *g == MuscleGroup::Other || !a_groups.contains(g));
        Self {
            disjoint_equipment: !a.competes_for_equipment(b),
            distinct_primary_muscle: !a.shares_primary_muscle(b),
            no_shared_muscles,
            matched_set_count: a.sets.len() == b.sets.len(),
        }
    }

    pub fn supports_superset(&self) -> bool {
        self.disjoint_equipment && self.distinct_primary_muscle
    }

    pub fn supports_block(&self) -> bool {
        self.distinct_primary_muscle
    }
}

/// Two accessories proposed for alternating sets
#[derive(Clone, Debug)]
pub struct SupersetCandidate<'a> {
    pub first: PoolEntry<'a>,
    pub second: PoolEntry<'a>,
    pub priority: GroupPriority,
    pub features: Vec<GroupingFeature>,
}

impl<'a> SupersetCandidate<'a> {
    pub fn exercise_ids(&self) -> Vec<&'a str> {
        vec![self.first.id(), self.second.id()]
    }
}

/// Accessories proposed for one circuit
#[derive(Clone, Debug)]
pub struct BlockCandidate<'a> {
    pub members: Vec<PoolEntry<'a>>,
    pub priority: GroupPriority,
    pub features: Vec<GroupingFeature>,
    pub rationale: String,
}

impl<'a> BlockCandidate<'a> {
    pub fn exercise_ids(&self) -> Vec<&'a str> {
        self.members.iter().map(PoolEntry::id).collect()
    }
}

/// Propose alternating pairs, earliest exercise first, first compatible partner wins
pub fn select_superset_pairs<'a>(pool: &[PoolEntry<'a>]) -> Vec<SupersetCandidate<'a>> {
    let mut used = vec![false; pool.len()];
    let mut pairs = Vec::new();

    for i in 0..pool.len() {
        if used[i] {
            continue;
        }
        for j in (i + 1)..pool.len() {
            if used[j] {
                continue;
            }
            let compat = Compatibility::between(pool[i].exercise, pool[j].exercise);
            if !compat.supports_superset() {
                continue;
            }

            used[i] = true;
            used[j] = true;
            let features = features_for(&[compat]);
            let priority = if compat.no_shared_muscles {
                GroupPriority::Primary
            } else {
                GroupPriority::Secondary
            };
            tracing::debug!(
                "Superset candidate: {} + {} ({:?})",
                pool[i].exercise.name,
                pool[j].exercise.name,
                priority
            );
            pairs.push(SupersetCandidate {
                first: pool[i],
                second: pool[j],
                priority,
                features,
            });
            break;
        }
    }

    pairs
}

/// Propose one circuit of 2..=`max_block_exercises` members, or `None`
///
/// Call repeatedly, removing the selected members from the pool each time.
pub fn select_block_group<'a>(
    pool: &[PoolEntry<'a>],
    max_block_exercises: usize,
) -> Option<BlockCandidate<'a>> {
    if max_block_exercises < 2 {
        return None;
    }

    for anchor in 0..pool.len() {
        let mut members = vec![pool[anchor]];
        for candidate in &pool[(anchor + 1)..] {
            if members.len() == max_block_exercises {
                break;
            }
            let fits = members.iter().all(|m| {
                Compatibility::between(m.exercise, candidate.exercise).supports_block()
            });
            if fits {
                members.push(*candidate);
            }
        }

        if members.len() >= 2 {
            let mut pairwise = Vec::new();
            for (i, a) in members.iter().enumerate() {
                for b in &members[(i + 1)..] {
                    pairwise.push(Compatibility::between(a.exercise, b.exercise));
                }
            }
            let priority = if pairwise.iter().all(Compatibility::supports_superset) {
                GroupPriority::Primary
            } else {
                GroupPriority::Secondary
            };
            let features = features_for(&pairwise);
            let rationale = block_rationale(&members, &features);
            tracing::debug!("Block candidate: {}", rationale);
            return Some(BlockCandidate {
                members,
                priority,
                features,
                rationale,
            });
        }
    }

    None
}

/// Drop placed exercises from the pool
pub fn remove_placed(pool: &mut Vec<PoolEntry<'_>>, placed: &[&str]) {
    pool.retain(|entry| !placed.contains(&entry.id()));
}

/// Features shared by every pair in the group
fn features_for(pairwise: &[Compatibility]) -> Vec<GroupingFeature> {
    let all = |f: fn(&Compatibility) -> bool| pairwise.iter().all(f);
    let mut features = Vec::new();
    if all(|c| c.disjoint_equipment) {
        features.push(GroupingFeature::DisjointEquipment);
    }
    if all(|c| c.distinct_primary_muscle) {
        features.push(GroupingFeature::DistinctPrimaryMuscle);
    }
    if all(|c| c.no_shared_muscles) {
        features.push(GroupingFeature::NoSharedMuscles);
    }
    if all(|c| c.matched_set_count) {
        features.push(GroupingFeature::MatchedSetCount);
    }
    features
}

fn block_rationale(members: &[PoolEntry<'_>], features: &[GroupingFeature]) -> String {
    let muscles: Vec<&str> = members
        .iter()
        .map(|m| m.exercise.primary_muscle_group.as_str())
        .collect();
    let equipment_note = if features.contains(&GroupingFeature::DisjointEquipment) {
        "separate stations"
    } else {
        "shared equipment, performed in sequence"
    };
    format!(
        "circuit of {} accessories rotating {} ({})",
        members.len(),
        muscles.join(" / "),
        equipment_note
    )
}
