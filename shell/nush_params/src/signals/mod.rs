//! Signal deferral around multi-step mutations.
//!
//! The engine is single-threaded; the only external hazard is an
//! asynchronous signal arriving mid-mutation. Callers bracket any
//! multi-step update (table relink plus environment sync, tie
//! propagation) with defer/resume so a handler never observes a
//! half-updated table. Brackets nest; signals noted while deferred are
//! queued and handed back when the outermost bracket resumes.

/// Nesting defer/resume gate for asynchronous signals.
#[derive(Debug, Default)]
pub struct SignalGate {
    depth: u32,
    pending: Vec<i32>,
}

impl SignalGate {
    pub fn new() -> SignalGate {
        SignalGate::default()
    }

    /// Start (or nest) a deferred section.
    pub fn defer(&mut self) {
        self.depth += 1;
    }

    /// End one deferred section. Queued signals stay in the gate until
    /// drained.
    pub fn resume(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Record a signal arrival. Returns true when the signal was queued
    /// for later; false means no bracket is open and the caller should
    /// deliver it immediately.
    pub fn note(&mut self, signal: i32) -> bool {
        if self.depth == 0 {
            return false;
        }
        self.pending.push(signal);
        true
    }

    /// Take every signal queued while deferred, in arrival order. Only
    /// meaningful outside a bracket.
    pub fn drain_pending(&mut self) -> Vec<i32> {
        std::mem::take(&mut self.pending)
    }

    /// Whether a deferred section is open.
    pub fn is_deferred(&self) -> bool {
        self.depth > 0
    }
}

/// RAII guard that closes a deferred section on drop, including during
/// unwinding. Signals noted while the guard was held stay queued in the
/// gate for the engine to drain.
pub struct DeferGuard<'gate> {
    gate: &'gate mut SignalGate,
}

impl<'gate> DeferGuard<'gate> {
    pub fn new(gate: &'gate mut SignalGate) -> DeferGuard<'gate> {
        gate.defer();
        DeferGuard { gate }
    }

    /// Record a signal arrival inside the bracket.
    pub fn note(&mut self, signal: i32) -> bool {
        self.gate.note(signal)
    }
}

impl Drop for DeferGuard<'_> {
    fn drop(&mut self) {
        self.gate.resume();
    }
}

#[cfg(test)]
mod tests {
    use super::{DeferGuard, SignalGate};
    use pretty_assertions::assert_eq;

    #[test]
    fn signals_pass_through_when_not_deferred() {
        let mut gate = SignalGate::new();
        assert!(!gate.note(2));
        assert!(!gate.is_deferred());
    }

    #[test]
    fn deferred_signals_are_queued_until_drained() {
        let mut gate = SignalGate::new();
        gate.defer();
        gate.defer();
        assert!(gate.note(2));
        assert!(gate.note(15));

        gate.resume();
        assert!(gate.is_deferred());
        gate.resume();
        assert!(!gate.is_deferred());
        assert_eq!(gate.drain_pending(), vec![2, 15]);
        assert_eq!(gate.drain_pending(), Vec::<i32>::new());
    }

    #[test]
    fn guard_closes_the_bracket_on_drop() {
        let mut gate = SignalGate::new();
        {
            let mut guard = DeferGuard::new(&mut gate);
            assert!(guard.note(2));
        }
        assert!(!gate.is_deferred());
        assert_eq!(gate.drain_pending(), vec![2]);
    }
}
