use foundation::time::Time;

/// Sequence number assigned to every submitted event, in arrival order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Seq(pub u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    seq: Seq,
    value: T,
    at: Time,
}

/// Coalesces bursts of events.
///
/// Only the latest submitted value survives. It is released by `poll` once no
/// newer value has arrived for `window_s` seconds. Time is supplied by the
/// caller so behavior is deterministic and replayable.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window_s: f64,
    next_seq: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(window_s: f64) -> Self {
        Self {
            window_s: window_s.max(0.0),
            next_seq: 0,
            pending: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(ms as f64 / 1000.0)
    }

    pub fn window_s(&self) -> f64 {
        self.window_s
    }

    /// Replace any pending value with `value`, restarting the window.
    pub fn submit(&mut self, value: T, now: Time) -> Seq {
        let seq = Seq(self.next_seq);
        self.next_seq += 1;
        self.pending = Some(Pending { seq, value, at: now });
        seq
    }

    /// Release the pending value if its window has elapsed at `now`.
    pub fn poll(&mut self, now: Time) -> Option<(Seq, T)> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|p| now.since(p.at) >= self.window_s);
        if !ready {
            return None;
        }
        self.flush()
    }

    /// Release the pending value immediately.
    pub fn flush(&mut self) -> Option<(Seq, T)> {
        self.pending.take().map(|p| (p.seq, p.value))
    }

    /// Drop the pending value, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes releasable.
    pub fn deadline(&self) -> Option<Time> {
        self.pending.as_ref().map(|p| p.at.add_seconds(self.window_s))
    }

    /// Sequence number of the most recent submission.
    pub fn latest_seq(&self) -> Option<Seq> {
        self.next_seq.checked_sub(1).map(Seq)
    }

    /// True if a newer event than `seq` has been submitted.
    pub fn is_superseded(&self, seq: Seq) -> bool {
        self.latest_seq().is_some_and(|latest| latest > seq)
    }
}
