//! Artificial-latency decorator, used to rehearse tournaments against the
//! timing profile of real remote players without standing up servers.

use std::time::Duration;

use engine_interface::{Decision, Event, GameState, Player};
use rand::Rng;

/// Wraps another player and sleeps a uniformly random amount before every
/// decision. Everything else delegates.
pub struct DelayedPlayer {
    inner: Box<dyn Player>,
    min_delay: Duration,
    max_delay: Duration,
}

impl DelayedPlayer {
    /// Delay bounds are in milliseconds, both inclusive. `max_ms` is clamped
    /// up to `min_ms`.
    pub fn new(inner: Box<dyn Player>, min_ms: u64, max_ms: u64) -> Self {
        DelayedPlayer {
            inner,
            min_delay: Duration::from_millis(min_ms),
            max_delay: Duration::from_millis(max_ms.max(min_ms)),
        }
    }
}

impl Player for DelayedPlayer {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn decide(
        &mut self,
        state: &GameState,
        options: &[Decision],
        reason: Option<&Event>,
    ) -> anyhow::Result<Decision> {
        let delay = rand::thread_rng().gen_range(self.min_delay..=self.max_delay);
        std::thread::sleep(delay);
        self.inner.decide(state, options, reason)
    }

    fn observe(&mut self, state: &GameState, event: &Event) {
        self.inner.observe(state, event);
    }
}
