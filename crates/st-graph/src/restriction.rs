//! Turn restrictions and their copy-on-write per-edge list.
//!
//! # Concurrency
//!
//! Each street edge owns one [`TurnRestrictions`].  Readers clone the current
//! `Arc<[TurnRestriction]>` under a short read lock and then iterate without
//! holding anything, so they never observe a half-updated list.  Writers
//! build a fresh slice and swap it in under the write lock; concurrent
//! writers to the same edge are serialised by that lock.
//!
//! Most edges have no restrictions.  They all point at one shared empty
//! slice, so an unrestricted edge costs no allocation.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use st_core::{EdgeId, TraverseMode, TraverseModeSet};

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;
/// 1970-01-01 was a Thursday, three days after the Monday that starts the week.
const EPOCH_WEEK_OFFSET: i64 = 3 * SECONDS_PER_DAY;

static EMPTY: Lazy<Arc<[TurnRestriction]>> = Lazy::new(|| Arc::from(Vec::new()));

// ── Time predicate ────────────────────────────────────────────────────────────

/// A set of weekly windows, in seconds since Monday 00:00 UTC.
///
/// A window whose end is before its start wraps over the week boundary.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepeatingTimePeriod {
    windows: Vec<(u32, u32)>,
}

impl RepeatingTimePeriod {
    pub fn new(windows: Vec<(u32, u32)>) -> Self {
        Self { windows }
    }

    /// Weekly window on one day: `day` 0 = Monday, times in seconds of day.
    pub fn daily_window(day: u32, start_s: u32, end_s: u32) -> (u32, u32) {
        let base = day * SECONDS_PER_DAY as u32;
        (base + start_s, base + end_s)
    }

    /// `true` if `time_s` (Unix seconds) falls into any window.
    pub fn active(&self, time_s: i64) -> bool {
        let sow = (time_s + EPOCH_WEEK_OFFSET).rem_euclid(SECONDS_PER_WEEK) as u32;
        self.windows.iter().any(|&(start, end)| {
            if start <= end {
                (start..end).contains(&sow)
            } else {
                sow >= start || sow < end
            }
        })
    }
}

// ── TurnRestriction ───────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnRestrictionType {
    /// From `from`, only `to` may be taken.
    Only,
    /// From `from`, `to` may not be taken.
    No,
}

/// A conditional ban (or forced turn) between two street edges.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnRestriction {
    pub from: EdgeId,
    pub to: EdgeId,
    pub kind: TurnRestrictionType,
    pub modes: TraverseModeSet,
    pub time: Option<RepeatingTimePeriod>,
}

impl TurnRestriction {
    pub fn new(from: EdgeId, to: EdgeId, kind: TurnRestrictionType, modes: TraverseModeSet) -> Self {
        Self { from, to, kind, modes, time: None }
    }

    pub fn with_time(mut self, time: RepeatingTimePeriod) -> Self {
        self.time = Some(time);
        self
    }

    /// A copy of this restriction between two other edges.
    pub fn retarget(&self, from: EdgeId, to: EdgeId) -> Self {
        Self { from, to, kind: self.kind, modes: self.modes, time: self.time.clone() }
    }

    #[inline]
    pub fn active(&self, time_s: i64) -> bool {
        self.time.as_ref().is_none_or(|t| t.active(time_s))
    }

    #[inline]
    pub fn applies(&self, mode: TraverseMode, time_s: i64) -> bool {
        self.modes.contains(mode) && self.active(time_s)
    }
}

// ── Copy-on-write list ────────────────────────────────────────────────────────

/// The restrictions whose `from` is one edge.
pub struct TurnRestrictions {
    inner: RwLock<Arc<[TurnRestriction]>>,
}

impl TurnRestrictions {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Arc::clone(&EMPTY)) }
    }

    /// The current list.  Later writes do not affect the returned slice.
    #[inline]
    pub fn snapshot(&self) -> Arc<[TurnRestriction]> {
        Arc::clone(&self.inner.read())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// `true` if this list is the shared empty instance.
    pub fn is_shared_empty(&self) -> bool {
        Arc::ptr_eq(&self.inner.read(), &EMPTY)
    }

    /// Add `r` unless an equal restriction is present.
    pub fn add(&self, r: TurnRestriction) {
        let mut guard = self.inner.write();
        if guard.contains(&r) {
            return;
        }
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend_from_slice(&guard);
        next.push(r);
        *guard = Arc::from(next);
    }

    /// Remove every restriction equal to `r`.  Returns `true` if one was found.
    pub fn remove(&self, r: &TurnRestriction) -> bool {
        self.retain(|x| x != r) > 0
    }

    /// Remove every restriction pointing at `to`.  Returns the number removed.
    pub fn remove_to(&self, to: EdgeId) -> usize {
        self.retain(|x| x.to != to)
    }

    pub fn remove_all(&self) {
        *self.inner.write() = Arc::clone(&EMPTY);
    }

    fn retain(&self, keep: impl Fn(&TurnRestriction) -> bool) -> usize {
        let mut guard = self.inner.write();
        if guard.iter().all(&keep) {
            return 0;
        }
        let next: Vec<TurnRestriction> = guard.iter().filter(|r| keep(r)).cloned().collect();
        let removed = guard.len() - next.len();
        *guard = if next.is_empty() { Arc::clone(&EMPTY) } else { Arc::from(next) };
        removed
    }
}

impl Default for TurnRestrictions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TurnRestrictions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.snapshot().iter()).finish()
    }
}
