//! Fixed-capacity pool of in-flight transitions.
//!
//! The pool holds at most one active transition per [`TransitionKey`].
//! Allocation never fails for a non-empty pool: a request either replaces
//! the transition already animating its key, takes the first free slot, or
//! evicts the longest-running transition.

use crate::time::{TimeDuration, TimeInstant};
use crate::transition::Transition;
use crate::types::TransitionKey;

/// How a request obtained its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Allocation {
    /// The key was already animating; its transition was restarted in place.
    Reused(usize),
    /// A free slot was populated.
    Fresh(usize),
    /// The pool was full; the oldest transition was discarded.
    Evicted {
        /// Slot that now carries the new request.
        slot: usize,
        /// Key whose unfinished transition was dropped.
        evicted: TransitionKey,
    },
}

impl Allocation {
    /// Returns the slot index that carries the request.
    pub const fn slot(&self) -> usize {
        match *self {
            Allocation::Reused(slot) | Allocation::Fresh(slot) => slot,
            Allocation::Evicted { slot, .. } => slot,
        }
    }
}

/// Result of advancing every active transition once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdvanceStats {
    /// Transitions that were evaluated.
    pub advanced: usize,
    /// Transitions that reached their target and freed their slot.
    pub completed: usize,
}

/// A fixed set of `N` transition slots.
///
/// # Type Parameters
/// * `I` - Time instant type
/// * `N` - Number of slots, sized for the worst-case number of channels
///   animating at once
pub struct TransitionPool<I: TimeInstant, const N: usize> {
    slots: [Option<Transition<I>>; N],
}

impl<I: TimeInstant, const N: usize> TransitionPool<I, N> {
    /// Creates a pool with every slot free.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Total number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of active transitions.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns true if no transition is active.
    pub fn is_idle(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Returns the slot index animating `key`, if any.
    pub fn find(&self, key: TransitionKey) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|t| t.key == key))
    }

    /// Returns the active transition for `key`, if any.
    pub fn get(&self, key: TransitionKey) -> Option<&Transition<I>> {
        self.slots.iter().flatten().find(|t| t.key == key)
    }

    /// Returns the transition held by a slot, if it is active.
    pub fn slot(&self, index: usize) -> Option<&Transition<I>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Iterates over active transitions in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Transition<I>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|t| (index, t)))
    }

    /// Finds or creates the transition for `key`.
    ///
    /// `current_value` is the channel's live buffered value and becomes the
    /// ramp's start, so a request interrupting an in-flight transition
    /// continues from wherever that animation currently is.
    ///
    /// Priority:
    /// 1. restart the transition already animating `key`
    /// 2. take the first free slot
    /// 3. evict the transition with the earliest start time
    ///
    /// Returns `None` only for a zero-capacity pool.
    pub fn allocate(
        &mut self,
        key: TransitionKey,
        current_value: u8,
        target_value: u8,
        duration: I::Duration,
        now: I,
    ) -> Option<Allocation> {
        let transition = Transition::new(key, current_value, target_value, now, duration);

        let allocation = if let Some(index) = self.find(key) {
            Allocation::Reused(index)
        } else if let Some(index) = self.slots.iter().position(Option::is_none) {
            Allocation::Fresh(index)
        } else {
            let index = self.oldest(now)?;
            let evicted = self.slots[index].as_ref()?.key;
            warn!(
                "transition pool full, evicting slot {=usize} (strip {=usize}, pixel {=usize})",
                index,
                evicted.strip,
                evicted.pixel
            );
            Allocation::Evicted {
                slot: index,
                evicted,
            }
        };

        self.slots[allocation.slot()] = Some(transition);
        Some(allocation)
    }

    /// Slot holding the transition that started earliest.
    ///
    /// Ties go to the lowest slot index.
    fn oldest(&self, now: I) -> Option<usize> {
        let mut oldest: Option<(usize, u64)> = None;
        for (index, transition) in self.iter() {
            let age = transition.age(now).as_millis();
            match oldest {
                Some((_, oldest_age)) if age <= oldest_age => {}
                _ => oldest = Some((index, age)),
            }
        }
        oldest.map(|(index, _)| index)
    }

    /// Evaluates every active transition at `now`, in slot order.
    ///
    /// `apply` receives each transition and its interpolated value. Slots
    /// whose transition reached its target are freed afterwards.
    pub fn advance<F>(&mut self, now: I, mut apply: F) -> AdvanceStats
    where
        F: FnMut(&Transition<I>, u8),
    {
        let mut stats = AdvanceStats::default();

        for slot in &mut self.slots {
            let Some(transition) = slot.as_ref() else {
                continue;
            };

            let progress = transition.progress(now);
            apply(transition, transition.value_for_progress(progress));
            stats.advanced += 1;

            if progress >= 1.0 {
                *slot = None;
                stats.completed += 1;
            }
        }

        stats
    }

    /// Drops every transition without touching the strips.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

impl<I: TimeInstant, const N: usize> Default for TransitionPool<I, N> {
    fn default() -> Self {
        Self::new()
    }
}
