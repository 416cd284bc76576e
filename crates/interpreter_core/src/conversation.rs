use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    #[serde(rename = "isUser")]
    pub is_user: bool,
    pub images: Vec<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
            images: Vec::new(),
        }
    }

    pub fn assistant(text: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
            images,
        }
    }
}

/// Ordered chat history for the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>, images: Vec<String>) {
        self.messages.push(Message::assistant(text, images));
    }

    /// Appends a user message that may later be reverted.
    pub fn append_tentative(&mut self, text: impl Into<String>) -> TentativeAppend {
        self.append_user(text);
        TentativeAppend {
            index: self.messages.len() - 1,
        }
    }

    pub fn rollback_last(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.messages)
    }
}

/// Handle to an optimistic append; resolved by exactly one of `commit` or `revert`.
///
/// The handle cannot be duplicated:
///
/// ```compile_fail
/// let mut log = interpreter_core::ConversationLog::new();
/// let token = log.append_tentative("hello");
/// let copy = token.clone();
/// token.commit();
/// copy.revert(&mut log);
/// ```
#[must_use = "a tentative append must be committed or reverted"]
#[derive(Debug, PartialEq, Eq)]
pub struct TentativeAppend {
    index: usize,
}

impl TentativeAppend {
    pub fn commit(self) {}

    /// Removes the tentative message if it is still the last entry.
    pub fn revert(self, log: &mut ConversationLog) -> bool {
        let is_last = log.len() == self.index + 1
            && log.messages.last().is_some_and(|message| message.is_user);
        if is_last {
            log.rollback_last();
        }
        is_last
    }
}
