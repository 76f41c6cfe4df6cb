use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A signal polled by an algorithm at each generation boundary. When the signal is raised, the
/// generation being evolved is completed and the run stops.
pub trait CancellationSignal {
    /// Whether the run was cancelled.
    ///
    /// return: `bool`
    fn is_cancelled(&self) -> bool;
}

/// A signal that is never raised.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancelled;

impl CancellationSignal for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A cancellation flag that can be shared between threads. Clones share the same flag, so one
/// clone can be handed to the algorithm and another one kept to cancel the run.
///
/// # Example
/// ```
/// use binsga3::algorithms::{CancellationSignal, CancellationToken};
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Default, Clone)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a new token that is not cancelled.
    ///
    /// returns: `CancellationToken`
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl CancellationSignal for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl<F: Fn() -> bool> CancellationSignal for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use crate::algorithms::{CancellationSignal, CancellationToken, NeverCancelled};

    #[test]
    fn test_signals() {
        assert!(!NeverCancelled.is_cancelled());

        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());

        let calls = Cell::new(0);
        let closure = || {
            calls.set(calls.get() + 1);
            calls.get() > 2
        };
        assert!(!closure.is_cancelled());
        assert!(!closure.is_cancelled());
        assert!(closure.is_cancelled());
    }
}
