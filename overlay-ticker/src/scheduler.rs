use log::*;
use std::{collections::BTreeMap, fmt::Debug};
use tokio::time::Instant;

/// Handle to a scheduled task, usable to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// A timer queue driven entirely by the `now` values handed to it.
///
/// Nothing in here reads a clock, so tests can walk time forward in exact
/// steps. Tasks with the same deadline come out in the order they were
/// scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
    next_ticket: u64,
    pending: BTreeMap<(Instant, Ticket), T>,
}

impl<T: Debug> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_ticket: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn schedule(&mut self, at: Instant, task: T) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        trace!("Scheduling {task:?} as {ticket:?} at {at:?}");
        self.pending.insert((at, ticket), task);
        ticket
    }

    pub fn cancel(&mut self, ticket: Ticket) -> Option<T> {
        let key = *self.pending.keys().find(|(_, t)| *t == ticket)?;
        let task = self.pending.remove(&key);
        debug!("Cancelled {ticket:?}: {task:?}");
        task
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.keys().next().map(|(at, _)| *at)
    }

    /// Removes and returns the earliest task whose deadline is not after `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<(Instant, T)> {
        let (at, _) = *self.pending.keys().next()?;
        if at > now {
            return None;
        }
        self.pending.pop_first().map(|((at, _), task)| (at, task))
    }

    pub fn pending(&self) -> impl Iterator<Item = (Ticket, Instant, &T)> {
        self.pending
            .iter()
            .map(|((at, ticket), task)| (*ticket, *at, task))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T: Debug> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
