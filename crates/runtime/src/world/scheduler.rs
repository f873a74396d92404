//! Tick-driven timer queue backing [`creature_core::Scheduler`].
use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use creature_core::{CreatureEvent, ErrorContext, EventHandle, ScheduleError, Tick};

/// Pending creature events ordered by due tick, then by scheduling order.
///
/// The clock only moves through [`EventQueue::pop_due`] and
/// [`EventQueue::advance_to`]; it never goes backwards.
#[derive(Debug, Default)]
pub struct EventQueue {
    now: Tick,
    next_handle: u64,
    queue: BTreeMap<(Tick, EventHandle), CreatureEvent>,
    due: HashMap<EventHandle, Tick>,
    closed: bool,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn schedule(
        &mut self,
        delay: u64,
        event: CreatureEvent,
    ) -> Result<EventHandle, ScheduleError> {
        if self.closed {
            return Err(ScheduleError::Closed);
        }
        let Some(next) = self.next_handle.checked_add(1) else {
            return Err(ScheduleError::Rejected {
                event,
                context: ErrorContext::new(self.now)
                    .with_creature(event.creature())
                    .with_message("event handles exhausted"),
            });
        };
        self.next_handle = next;

        let handle = EventHandle(next);
        let due = self.now + delay;
        self.queue.insert((due, handle), event);
        self.due.insert(handle, due);
        trace!(target: "runtime::scheduler", ?event, %due, handle = handle.0, "scheduled");
        Ok(handle)
    }

    /// Drops a pending event. Unknown or fired handles are ignored.
    pub fn cancel(&mut self, handle: EventHandle) {
        if let Some(due) = self.due.remove(&handle) {
            self.queue.remove(&(due, handle));
            trace!(target: "runtime::scheduler", handle = handle.0, "cancelled");
        }
    }

    /// Removes the earliest event due at or before `until` and moves the clock to it.
    pub fn pop_due(&mut self, until: Tick) -> Option<CreatureEvent> {
        let (&(due, handle), _) = self.queue.first_key_value()?;
        if due > until {
            return None;
        }
        let event = self.queue.remove(&(due, handle))?;
        self.due.remove(&handle);
        self.now = self.now.max(due);
        Some(event)
    }

    pub fn advance_to(&mut self, tick: Tick) {
        self.now = self.now.max(tick);
    }

    /// Refuses every further schedule request.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creature_core::CreatureId;

    fn walk(id: u32) -> CreatureEvent {
        CreatureEvent::Walk(CreatureId(id))
    }

    #[test]
    fn pops_in_due_order_and_moves_clock() {
        let mut queue = EventQueue::new();
        queue.schedule(300, walk(1)).expect("scheduled");
        queue.schedule(100, walk(2)).expect("scheduled");
        queue.schedule(100, walk(3)).expect("scheduled");

        assert_eq!(queue.pop_due(Tick(1000)), Some(walk(2)));
        assert_eq!(queue.pop_due(Tick(1000)), Some(walk(3)));
        assert_eq!(queue.now(), Tick(100));
        assert_eq!(queue.pop_due(Tick(200)), None);
        assert_eq!(queue.pop_due(Tick(300)), Some(walk(1)));
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut queue = EventQueue::new();
        let handle = queue.schedule(10, walk(1)).expect("scheduled");
        queue.cancel(handle);
        queue.cancel(handle);
        queue.cancel(EventHandle(999));
        assert_eq!(queue.pop_due(Tick(100)), None);
    }

    #[test]
    fn closed_queue_rejects() {
        let mut queue = EventQueue::new();
        queue.close();
        assert_eq!(queue.schedule(1, walk(1)), Err(ScheduleError::Closed));
    }

    #[test]
    fn clock_never_goes_back() {
        let mut queue = EventQueue::new();
        queue.advance_to(Tick(500));
        queue.advance_to(Tick(100));
        assert_eq!(queue.now(), Tick(500));
        queue.schedule(0, walk(1)).expect("scheduled");
        assert_eq!(queue.pop_due(Tick(500)), Some(walk(1)));
        assert_eq!(queue.now(), Tick(500));
    }
}
