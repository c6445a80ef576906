use tracing::debug;

/// Identifies one arming of the round timer. A token goes stale as soon as
/// the timer is re-armed or cancelled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimerToken(u64);

#[derive(Copy, Clone, Debug)]
struct Deadline {
    token: TimerToken,
    fires_at_ms: u64,
}

/// Single-shot unlock timer, polled with the current time.
#[derive(Clone, Debug, Default)]
pub struct RoundTimer {
    generation: u64,
    pending: Option<Deadline>,
}

impl RoundTimer {
    pub fn new() -> Self { Self::default() }

    /// Arms a fresh deadline, discarding any pending one.
    pub fn arm(&mut self, now_ms: u64, delay_ms: u64) -> TimerToken {
        self.generation += 1;
        let token = TimerToken(self.generation);
        self.pending = Some(Deadline { token, fires_at_ms: now_ms + delay_ms });
        token
    }

    pub fn cancel(&mut self) {
        if let Some(d) = self.pending.take() {
            debug!(fires_at_ms = d.fires_at_ms, "round timer cancelled");
        }
        self.generation += 1;
    }

    /// Returns the token once, when the deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<TimerToken> {
        match self.pending {
            Some(d) if now_ms >= d.fires_at_ms => {
                self.pending = None;
                Some(d.token)
            }
            _ => None,
        }
    }

    pub fn is_current(&self, token: TimerToken) -> bool { token.0 == self.generation }

    pub fn is_pending(&self) -> bool { self.pending.is_some() }

    pub fn fires_at_ms(&self) -> Option<u64> { self.pending.map(|d| d.fires_at_ms) }
}
