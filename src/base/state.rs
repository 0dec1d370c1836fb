/// Lifecycle state of a [`crate::resolver::Resolver`].
///
/// `Created → Started → {Idle ⇄ Resolving} → Disposed`. `Started` and
/// `Disposed` are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverState {
    /// No listener registered yet.
    #[default]
    Created,

    /// Listener registered, no resolution attempted yet.
    Started,

    /// The last attempt has completed.
    Idle,

    /// An attempt is in flight.
    Resolving,

    /// Disposal has begun; every lifecycle operation now fails.
    Disposed,
}

impl ResolverState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResolverState::Disposed)
    }
}
