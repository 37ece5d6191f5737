use crate::error::{ChartError, Result};

/// Monotonic tag handed to every dataset load when it is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

/// Decides which load result may replace the dataset.
///
/// Only a result carrying the most recently issued generation is accepted;
/// anything older lost the race to a newer request and is discarded.
#[derive(Debug, Default)]
pub struct LoadTracker {
    latest: u64,
    applied: Option<u64>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> Generation {
        self.latest += 1;
        Generation(self.latest)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.latest
    }

    /// Accept or reject a finished load.
    pub fn accept(&mut self, generation: Generation) -> Result<()> {
        if !self.is_current(generation) {
            return Err(ChartError::StaleResponse {
                issued: generation.0,
                current: self.latest,
            });
        }
        self.applied = Some(generation.0);
        Ok(())
    }

    /// Generation of the dataset currently on screen.
    pub fn applied(&self) -> Option<Generation> {
        self.applied.map(Generation)
    }
}

/// Keeps at most one regeneration request in flight. A submission made
/// while one is outstanding waits here; a newer submission replaces an older
/// waiting one.
#[derive(Debug)]
pub struct RequestQueue<T> {
    in_flight: Option<Generation>,
    waiting: Option<(Generation, T)>,
}

impl<T> Default for RequestQueue<T> {
    fn default() -> Self {
        Self {
            in_flight: None,
            waiting: None,
        }
    }
}

impl<T> RequestQueue<T> {
    /// Returns the request back if it may be dispatched right away.
    pub fn submit(&mut self, generation: Generation, request: T) -> Option<(Generation, T)> {
        if self.in_flight.is_some() {
            if let Some((dropped, _)) = self.waiting.replace((generation, request)) {
                tracing::debug!("Queued request {} replaced by {}", dropped.0, generation.0);
            }
            None
        } else {
            self.in_flight = Some(generation);
            Some((generation, request))
        }
    }

    /// Mark the in-flight request settled and hand out the waiting one, if any.
    pub fn settle(&mut self, generation: Generation) -> Option<(Generation, T)> {
        if self.in_flight != Some(generation) {
            return None;
        }
        self.in_flight = None;
        let (next_generation, next) = self.waiting.take()?;
        self.in_flight = Some(next_generation);
        Some((next_generation, next))
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_waiting(&self) -> bool {
        self.waiting.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_request_wins_when_it_lands_first() {
        let mut tracker = LoadTracker::new();
        let first = tracker.issue();
        let second = tracker.issue();

        assert!(tracker.accept(second).is_ok());
        let err = tracker.accept(first).unwrap_err();
        assert!(matches!(err, ChartError::StaleResponse { issued: 1, current: 2 }));
        assert_eq!(tracker.applied(), Some(second));
    }

    #[test]
    fn in_order_completion_keeps_only_the_newest() {
        let mut tracker = LoadTracker::new();
        let first = tracker.issue();
        let second = tracker.issue();
        assert!(tracker.accept(first).is_err());
        assert!(tracker.accept(second).is_ok());
        assert_eq!(tracker.applied(), Some(second));
    }

    #[test]
    fn queue_holds_one_waiting_request() {
        let mut tracker = LoadTracker::new();
        let mut queue = RequestQueue::default();

        let g1 = tracker.issue();
        assert_eq!(queue.submit(g1, "first"), Some((g1, "first")));
        assert!(queue.is_busy());

        let g2 = tracker.issue();
        assert_eq!(queue.submit(g2, "second"), None);
        let g3 = tracker.issue();
        assert_eq!(queue.submit(g3, "third"), None);
        assert!(queue.has_waiting());

        // The in-flight result is superseded by the waiting submission.
        assert!(!tracker.is_current(g1));
        assert_eq!(queue.settle(g1), Some((g3, "third")));
        assert_eq!(queue.settle(g1), None);
        assert_eq!(queue.settle(g3), None);
        assert!(!queue.is_busy());
    }
}
