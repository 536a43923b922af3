/// Lifecycle of a tracker session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No selection in progress and no tracker bound
    #[default]
    Idle,
    /// A selection gesture is in progress
    Selecting,
    /// A tracker is bound and follows the selected object
    Tracking,
    /// The tracker reported failure; a new selection is accepted
    Lost,
}

impl SessionState {
    /// Whether a freshly finalized region may initialize a tracker.
    #[inline]
    pub fn accepts_selection(&self) -> bool {
        !matches!(self, SessionState::Tracking)
    }
}
