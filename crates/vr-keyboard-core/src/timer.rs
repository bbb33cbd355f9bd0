//! Logical timer queue.
//!
//! Timers are delayed callbacks posted to the owner's event queue. Time is a
//! logical millisecond clock supplied by the host, so the queue never sleeps
//! and never reads the wall clock. Each timer carries a payload that the owner
//! interprets when the timer fires.
//!
//! Expired timers are popped one at a time with [`TimerQueue::pop_expired`]
//! so that handling one timer may stop others that are due in the same batch.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use slotmap::{SlotMap, new_key_type};

use crate::error::TimerError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// Logical time in milliseconds.
pub type Millis = u64;

/// The type of timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once at its due time.
    OneShot,
    /// Fires at its due time, then every `interval` after that.
    Repeating,
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData<T> {
    /// When this timer should next fire.
    next_fire: Millis,
    /// The interval for repeating timers.
    interval: Millis,
    /// The kind of timer.
    kind: TimerKind,
    /// Owner-defined payload handed back on fire.
    payload: T,
}

/// An entry in the timer queue (min-heap by fire time, then insertion order).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Millis,
    sequence: u64,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.sequence == other.sequence
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// A timer that has come due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTimer<T> {
    /// The timer that fired.
    pub id: TimerId,
    /// The logical time the timer was due.
    pub due: Millis,
    /// Whether the timer is still armed after this fire.
    pub kind: TimerKind,
    /// The payload registered with the timer.
    pub payload: T,
}

/// Queue of one-shot and repeating timers on a logical clock.
#[derive(Debug)]
pub struct TimerQueue<T> {
    /// All registered timers.
    timers: SlotMap<TimerId, TimerData<T>>,
    /// Priority queue of pending timer fires.
    queue: BinaryHeap<TimerQueueEntry>,
    /// Tie-breaker so timers due at the same instant fire in schedule order.
    sequence: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty timer queue.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            sequence: 0,
        }
    }

    fn push_entry(&mut self, id: TimerId, fire_time: Millis) {
        self.sequence += 1;
        self.queue.push(TimerQueueEntry {
            id,
            fire_time,
            sequence: self.sequence,
        });
    }

    /// Start a one-shot timer that fires `delay` milliseconds after `now`.
    pub fn start_one_shot(&mut self, now: Millis, delay: Millis, payload: T) -> TimerId {
        let next_fire = now.saturating_add(delay);
        let id = self.timers.insert(TimerData {
            next_fire,
            interval: delay,
            kind: TimerKind::OneShot,
            payload,
        });
        self.push_entry(id, next_fire);
        id
    }

    /// Start a repeating timer.
    ///
    /// The first fire occurs `first_delay` milliseconds after `now`, then
    /// every `interval` milliseconds measured from the previous due time.
    pub fn start_repeating(
        &mut self,
        now: Millis,
        first_delay: Millis,
        interval: Millis,
        payload: T,
    ) -> Result<TimerId, TimerError> {
        if interval == 0 {
            return Err(TimerError::ZeroInterval);
        }
        let next_fire = now.saturating_add(first_delay);
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
            kind: TimerKind::Repeating,
            payload,
        });
        self.push_entry(id, next_fire);
        Ok(id)
    }

    /// Stop and remove a timer.
    pub fn stop(&mut self, id: TimerId) -> Result<(), TimerError> {
        self.timers
            .remove(id)
            .map(|_| ())
            .ok_or(TimerError::InvalidTimerId)
    }

    /// Stop every timer whose payload matches `predicate`.
    ///
    /// Returns how many timers were stopped.
    pub fn stop_matching(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, timer| !predicate(&timer.payload));
        before - self.timers.len()
    }

    /// Stop every timer.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Drop queue entries whose timers were stopped.
    fn prune_front(&mut self) {
        while let Some(entry) = self.queue.peek() {
            match self.timers.get(entry.id) {
                Some(timer) if timer.next_fire == entry.fire_time => break,
                _ => {
                    self.queue.pop();
                }
            }
        }
    }

    /// The logical time the next timer is due, if any.
    pub fn next_deadline(&mut self) -> Option<Millis> {
        self.prune_front();
        self.queue.peek().map(|entry| entry.fire_time)
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl<T: Clone> TimerQueue<T> {
    /// Pop the earliest timer due at or before `now`.
    ///
    /// One-shot timers are removed when popped; repeating timers are re-armed
    /// at `due + interval`, so a late caller sees every missed interval.
    pub fn pop_expired(&mut self, now: Millis) -> Option<FiredTimer<T>> {
        self.prune_front();
        let entry = *self.queue.peek()?;
        if entry.fire_time > now {
            return None;
        }
        self.queue.pop();

        let timer = self.timers.get_mut(entry.id)?;
        let fired = FiredTimer {
            id: entry.id,
            due: entry.fire_time,
            kind: timer.kind,
            payload: timer.payload.clone(),
        };
        tracing::trace!(target: targets::TIMER, id = ?entry.id, due = entry.fire_time, "timer fired");

        match timer.kind {
            TimerKind::OneShot => {
                self.timers.remove(entry.id);
            }
            TimerKind::Repeating => {
                timer.next_fire = entry.fire_time.saturating_add(timer.interval);
                let next_fire = timer.next_fire;
                self.push_entry(entry.id, next_fire);
            }
        }

        Some(fired)
    }
}
