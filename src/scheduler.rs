//! Frame clock and deferred one-shot actions
//!
//! The host calls in with its own frame timestamps; nothing here reads a
//! system clock, which keeps the game testable frame by frame.

use std::cell::Cell;
use std::rc::Rc;

use crate::consts::{FRAME_MS, MAX_SUBSTEPS};

/// Absorbs float noise when frame timestamps are multiples of the step
const STEP_EPSILON: f64 = 1e-6;

/// Converts host frame timestamps into fixed simulation steps
#[derive(Debug, Clone)]
pub struct FrameClock {
    step_ms: f64,
    max_substeps: u32,
    accumulator: f64,
    last_time: Option<f64>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(FRAME_MS, MAX_SUBSTEPS)
    }
}

impl FrameClock {
    pub fn new(step_ms: f64, max_substeps: u32) -> Self {
        Self {
            step_ms,
            max_substeps,
            accumulator: 0.0,
            last_time: None,
        }
    }

    /// Number of ticks to run for a frame at `now` (ms)
    ///
    /// The first frame always runs one tick. Long stalls are capped at
    /// `max_substeps` and the rest of the backlog is dropped.
    pub fn advance(&mut self, now: f64) -> u32 {
        let Some(last) = self.last_time.replace(now) else {
            return 1;
        };
        let dt = (now - last).clamp(0.0, self.step_ms * self.max_substeps as f64);
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator + STEP_EPSILON >= self.step_ms && steps < self.max_substeps {
            self.accumulator -= self.step_ms;
            steps += 1;
        }
        steps
    }
}

/// Shared flag flipped once when its owner is torn down
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

struct Task<A> {
    due: f64,
    action: A,
    token: CancelToken,
}

/// One-shot actions waiting for a due time
///
/// Tasks are bound to the queue's `CancelToken` when scheduled; once that
/// token is cancelled they are discarded instead of firing.
pub struct Deferred<A> {
    tasks: Vec<Task<A>>,
    token: CancelToken,
}

impl<A> Deferred<A> {
    pub fn new(token: CancelToken) -> Self {
        Self {
            tasks: Vec::new(),
            token,
        }
    }

    pub fn schedule(&mut self, due: f64, action: A) {
        self.tasks.push(Task {
            due,
            action,
            token: self.token.clone(),
        });
    }

    /// Remove and return every live action due at or before `now`, oldest first
    pub fn take_due(&mut self, now: f64) -> Vec<A> {
        self.tasks.sort_by(|a, b| a.due.total_cmp(&b.due));
        let ready = self.tasks.partition_point(|t| t.due <= now);
        self.tasks
            .drain(..ready)
            .filter(|t| !t.token.is_cancelled())
            .map(|t| t.action)
            .collect()
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Drop everything still pending
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_runs_one_tick() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance(1000.0), 1);
    }

    #[test]
    fn test_fixed_steps() {
        let mut clock = FrameClock::new(10.0, 8);
        clock.advance(0.0);
        assert_eq!(clock.advance(25.0), 2);
        // Leftover 5ms carries over
        assert_eq!(clock.advance(30.0), 1);
        assert_eq!(clock.advance(31.0), 0);
    }

    #[test]
    fn test_stall_is_capped() {
        let mut clock = FrameClock::new(10.0, 4);
        clock.advance(0.0);
        assert_eq!(clock.advance(10_000.0), 4);
        assert_eq!(clock.advance(10_001.0), 0);
    }

    #[test]
    fn test_step_multiples_run_one_tick_each() {
        let mut clock = FrameClock::default();
        clock.advance(0.0);
        for i in 1..1000 {
            assert_eq!(clock.advance(i as f64 * FRAME_MS), 1, "frame {i}");
        }
    }

    #[test]
    fn test_deferred_fires_once_when_due() {
        let mut queue = Deferred::new(CancelToken::new());
        queue.schedule(400.0, "relaunch");

        assert!(queue.take_due(399.0).is_empty());
        assert_eq!(queue.take_due(400.0), vec!["relaunch"]);
        assert!(queue.take_due(1000.0).is_empty());
    }

    #[test]
    fn test_deferred_orders_by_due_time() {
        let mut queue = Deferred::new(CancelToken::new());
        queue.schedule(30.0, 3);
        queue.schedule(10.0, 1);
        queue.schedule(20.0, 2);
        assert_eq!(queue.take_due(25.0), vec![1, 2]);
        assert_eq!(queue.pending(), 1);
    }

    #[test]
    fn test_cancelled_task_never_fires() {
        let token = CancelToken::new();
        let mut queue = Deferred::new(token.clone());
        queue.schedule(10.0, ());

        token.cancel();
        assert!(queue.take_due(100.0).is_empty());
        assert_eq!(queue.pending(), 0);
    }
}
