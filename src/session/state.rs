use crate::storage::Message;

/// Lifecycle phase of the displayed conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No conversation id assigned yet
    Empty,
    /// A conversation id is assigned
    Active,
}

/// In-memory state of the conversation currently displayed
///
/// Owned by the front end and handed to each `ChatController` operation.
///
/// # Examples
///
/// ```
/// use askdesk::session::{Phase, SessionState};
///
/// let state = SessionState::new();
/// assert_eq!(state.phase(), Phase::Empty);
/// assert!(state.messages().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) active_id: Option<i64>,
    pub(crate) messages: Vec<Message>,
    /// Ticket of the query still outstanding, if any
    pub(crate) in_flight: Option<u64>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.active_id.is_some() {
            Phase::Active
        } else {
            Phase::Empty
        }
    }

    pub fn active_id(&self) -> Option<i64> {
        self.active_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while a query for this session is outstanding
    pub fn awaiting_reply(&self) -> bool {
        self.in_flight.is_some()
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
