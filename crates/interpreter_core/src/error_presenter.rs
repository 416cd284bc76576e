use std::time::Duration;

/// How long a surfaced error stays visible.
pub const ERROR_VISIBLE_FOR: Duration = Duration::from_secs(5);

/// Generation of the most recently scheduled error clear.
pub type ErrorTicket = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorPresenter {
    message: Option<String>,
    visible: bool,
    ticket: ErrorTicket,
}

impl ErrorPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `message` and returns the ticket its clear must present.
    /// Any earlier ticket becomes stale.
    pub fn show(&mut self, message: impl Into<String>) -> ErrorTicket {
        self.message = Some(message.into());
        self.visible = true;
        self.ticket += 1;
        self.ticket
    }

    /// Hides the error if `ticket` is the current one.
    pub fn expire(&mut self, ticket: ErrorTicket) -> bool {
        if ticket != self.ticket || !self.visible {
            return false;
        }
        self.visible = false;
        true
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn visible_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|_| self.visible)
    }

    pub fn current_ticket(&self) -> ErrorTicket {
        self.ticket
    }
}
