//! Allocation engine.
//!
//! Assigns every eligible taken course to exactly one requirement category by
//! walking the fixed chain `required > core > area > free`. Each course's walk
//! is a small state machine over the chain: at every category the course is
//! either assigned there or advanced to the next category. It advances when
//!
//! - its equivalence group was already used in that category, or
//! - that category has minimums, they are already met, and it is not the
//!   terminal category.
//!
//! An equivalence-blocked course at the terminal category is dropped.
//! Equivalence usage is tracked per category, so one member of a substitute
//! pair may count in `required` while another counts in `core`.
//!
//! Allocation is a pure fold over the sorted course list: buckets are built
//! fresh on every call and nothing is shared between evaluations.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{Catalog, CategoryKey, RequirementSpec, TakenCourse};

/// How repeated enrollments of the same course are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetakePolicy {
    /// A code counts once no matter how often it appears.
    #[default]
    CountOnce,
    /// Every passing enrollment is allocated separately.
    CountEach,
}

/// Knobs for a single allocation run.
#[derive(Debug, Clone, Default)]
pub struct AllocationOptions {
    pub retake_policy: RetakePolicy,
}

/// Courses and credits collected by one category during one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationBucket {
    pub course_count: u32,
    pub credit_sum: f64,
    /// Equivalence group indices consumed in this category only.
    pub used_equivalence_groups: BTreeSet<usize>,
    /// Codes assigned here, in allocation order.
    pub courses: Vec<String>,
}

static EMPTY_BUCKET: AllocationBucket = AllocationBucket {
    course_count: 0,
    credit_sum: 0.0,
    used_equivalence_groups: BTreeSet::new(),
    courses: Vec::new(),
};

/// Where a course's walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "category", rename_all = "lowercase")]
pub enum Placement {
    Assigned(CategoryKey),
    Dropped,
}

/// The allocation decision for one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoursePlacement {
    pub code: String,
    /// Category the walk started in.
    pub base: CategoryKey,
    pub credit: f64,
    pub placement: Placement,
}

impl CoursePlacement {
    /// True if the course ended up below its base category.
    pub fn moved_down(&self) -> bool {
        match self.placement {
            Placement::Assigned(key) => key != self.base,
            Placement::Dropped => true,
        }
    }
}

/// Result of allocating a student's courses against one specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// One bucket per chain category.
    pub buckets: BTreeMap<CategoryKey, AllocationBucket>,
    /// Per-course decisions in allocation order.
    pub placements: Vec<CoursePlacement>,
    /// Every non-failed taken code, whether or not the catalog knows it.
    pub taken: BTreeSet<String>,
}

impl Allocation {
    fn empty(taken: BTreeSet<String>) -> Self {
        Self {
            buckets: CategoryKey::CHAIN
                .into_iter()
                .map(|key| (key, AllocationBucket::default()))
                .collect(),
            placements: Vec::new(),
            taken,
        }
    }

    pub fn bucket(&self, key: CategoryKey) -> &AllocationBucket {
        self.buckets.get(&key).unwrap_or(&EMPTY_BUCKET)
    }

    pub fn total_courses(&self) -> u32 {
        self.buckets.values().map(|b| b.course_count).sum()
    }

    pub fn total_credits(&self) -> f64 {
        self.buckets.values().map(|b| b.credit_sum).sum()
    }

    pub fn placement_of(&self, code: &str) -> Option<Placement> {
        self.placements
            .iter()
            .find(|p| p.code == code)
            .map(|p| p.placement)
    }

    pub fn dropped(&self) -> impl Iterator<Item = &CoursePlacement> {
        self.placements
            .iter()
            .filter(|p| p.placement == Placement::Dropped)
    }

    fn record(mut self, candidate: &Candidate<'_>, placement: Placement, spec: &RequirementSpec) -> Self {
        if let Placement::Assigned(key) = placement {
            let group = spec.category(key).and_then(|rules| rules.group_of(candidate.code));
            let bucket = self.buckets.entry(key).or_default();
            bucket.course_count += 1;
            bucket.credit_sum += candidate.credit;
            bucket.courses.push(candidate.code.to_string());
            if let Some(group) = group {
                bucket.used_equivalence_groups.insert(group);
            }
            tracing::debug!(
                "allocated {} ({} -> {}, {} credits)",
                candidate.code,
                candidate.base,
                key,
                candidate.credit
            );
        } else {
            tracing::debug!("dropped {}: equivalent already counted", candidate.code);
        }
        self.placements.push(CoursePlacement {
            code: candidate.code.to_string(),
            base: candidate.base,
            credit: candidate.credit,
            placement,
        });
        self
    }
}

/// An eligible, catalog-resolved course waiting for placement.
#[derive(Debug, Clone)]
struct Candidate<'a> {
    code: &'a str,
    base: CategoryKey,
    credit: f64,
}

/// States of one course's walk down the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    At(CategoryKey),
    Done(Placement),
}

/// Allocate with the default options (retakes count once).
pub fn allocate(taken: &[TakenCourse], catalog: &Catalog, spec: &RequirementSpec) -> Allocation {
    allocate_with(taken, catalog, spec, &AllocationOptions::default())
}

/// Allocate `taken` courses to the categories of `spec`.
///
/// Failed courses are ignored, codes missing from `catalog` are skipped, and
/// the result is fully determined by the inputs.
pub fn allocate_with(
    taken: &[TakenCourse],
    catalog: &Catalog,
    spec: &RequirementSpec,
    options: &AllocationOptions,
) -> Allocation {
    let eligible: Vec<&TakenCourse> = taken.iter().filter(|c| !c.is_failed()).collect();
    let taken_codes: BTreeSet<String> = eligible.iter().map(|c| c.code.clone()).collect();

    let mut seen = BTreeSet::new();
    let mut candidates: Vec<Candidate<'_>> = eligible
        .into_iter()
        .filter(|c| match options.retake_policy {
            RetakePolicy::CountOnce => seen.insert(c.code.as_str()),
            RetakePolicy::CountEach => true,
        })
        .filter_map(|c| {
            catalog.get(&c.code).map(|record| Candidate {
                code: c.code.as_str(),
                base: record.category.base_key(),
                credit: record.credit_su,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.base
            .rank()
            .cmp(&b.base.rank())
            .then_with(|| a.code.cmp(b.code))
    });

    candidates
        .iter()
        .fold(Allocation::empty(taken_codes), |allocation, candidate| {
            let placement = walk(candidate, &allocation, spec);
            allocation.record(candidate, placement, spec)
        })
}

/// Run one course through the chain state machine.
fn walk(candidate: &Candidate<'_>, allocation: &Allocation, spec: &RequirementSpec) -> Placement {
    let mut state = Walk::At(candidate.base);
    loop {
        match state {
            Walk::At(at) => state = step(at, candidate.code, allocation, spec),
            Walk::Done(placement) => return placement,
        }
    }
}

/// Transition function: assign at `at`, or advance per the chain rules.
fn step(at: CategoryKey, code: &str, allocation: &Allocation, spec: &RequirementSpec) -> Walk {
    let bucket = allocation.bucket(at);
    let rules = spec.category(at);

    let blocked = rules
        .and_then(|r| r.group_of(code))
        .is_some_and(|group| bucket.used_equivalence_groups.contains(&group));
    if blocked {
        return match at.next() {
            Some(next) => Walk::At(next),
            None => Walk::Done(Placement::Dropped),
        };
    }

    if let Some(next) = at.next() {
        if surplus_flows_on(at, bucket, spec) {
            return Walk::At(next);
        }
    }

    Walk::Done(Placement::Assigned(at))
}

/// A satisfied category passes further courses down the chain. Categories
/// without minimums never count as satisfied.
fn surplus_flows_on(at: CategoryKey, bucket: &AllocationBucket, spec: &RequirementSpec) -> bool {
    spec.category(at)
        .is_some_and(|rules| rules.has_minimums() && rules.minimums_met(bucket.course_count, bucket.credit_sum))
}
