use std::time::Instant;

/// Identifies one run of an engine. Deadlines carry the id of the run that
/// scheduled them and are discarded once a newer run has begun.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u64);

impl RunId {
    pub fn next(self) -> Self {
        RunId(self.0.wrapping_add(1))
    }
}

/// What happens when a deadline expires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// End of the display (or exposure) window of the current stimulus
    Hide,
    /// End of a pause or feedback window; move on to the next stimulus
    Advance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    pub run: RunId,
    pub at: Instant,
    pub task: Task,
}

/// Holds at most one pending deadline; scheduling replaces whatever was there.
#[derive(Debug, Default)]
pub struct TaskSlot {
    pending: Option<Deadline>,
}

impl TaskSlot {
    pub fn schedule(&mut self, run: RunId, at: Instant, task: Task) {
        if let Some(old) = self.pending.replace(Deadline { run, at, task }) {
            tracing::trace!(?old, "replaced pending deadline");
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&Deadline> {
        self.pending.as_ref()
    }

    /// Take the pending task if it is due at `now`. A due deadline scheduled
    /// by a run other than `current` is dropped without firing.
    pub fn take_due(&mut self, current: RunId, now: Instant) -> Option<Task> {
        match self.pending {
            Some(deadline) if deadline.at <= now => {
                self.pending = None;
                if deadline.run == current {
                    Some(deadline.task)
                } else {
                    tracing::debug!(
                        stale = ?deadline.run,
                        ?current,
                        "discarding deadline from a previous run"
                    );
                    None
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn nothing_fires_before_deadline() {
        let t0 = Instant::now();
        let run = RunId::default().next();
        let mut slot = TaskSlot::default();
        slot.schedule(run, t0 + Duration::from_millis(500), Task::Hide);

        assert_eq!(slot.take_due(run, t0 + Duration::from_millis(499)), None);
        assert_eq!(
            slot.take_due(run, t0 + Duration::from_millis(500)),
            Some(Task::Hide)
        );
        assert!(slot.pending().is_none());
    }

    #[test]
    fn scheduling_replaces_previous_deadline() {
        let t0 = Instant::now();
        let run = RunId::default();
        let mut slot = TaskSlot::default();
        slot.schedule(run, t0, Task::Hide);
        slot.schedule(run, t0 + Duration::from_secs(2), Task::Advance);

        assert_eq!(slot.take_due(run, t0 + Duration::from_secs(1)), None);
        assert_eq!(
            slot.take_due(run, t0 + Duration::from_secs(2)),
            Some(Task::Advance)
        );
    }

    #[test]
    fn stale_deadline_is_discarded() {
        let t0 = Instant::now();
        let old = RunId::default().next();
        let new = old.next();
        let mut slot = TaskSlot::default();
        slot.schedule(old, t0, Task::Advance);

        assert_eq!(slot.take_due(new, t0 + Duration::from_secs(1)), None);
        assert!(slot.pending().is_none(), "stale deadline must be consumed");
    }

    #[test]
    fn cancel_clears_slot() {
        let t0 = Instant::now();
        let run = RunId::default();
        let mut slot = TaskSlot::default();
        slot.schedule(run, t0, Task::Hide);
        slot.cancel();
        assert_eq!(slot.take_due(run, t0 + Duration::from_secs(1)), None);
    }
}
