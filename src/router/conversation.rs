//! Conversation model and the assembler that threads prior turns.
//!
//! A [`Message`] is immutable once built: fields are private and only
//! readable through accessors. A [`Conversation`] is an ordered, oldest-first
//! sequence of messages owned by the caller; the router only ever reads it.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single role-tagged turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

/// Ordered sequence of messages, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
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

    /// The most recent message authored by the user.
    pub fn latest_user(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    /// Content of [`Self::latest_user`], or `""` when there is none.
    pub fn latest_user_content(&self) -> &str {
        self.latest_user().map(Message::content).unwrap_or("")
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self::new(messages)
    }
}

/// Build the conversation a handler consumes: `prior_turns` followed by the
/// new user utterance.
///
/// `prior_turns` is expected to be already truncated by the caller; no bound
/// is enforced here. Neither input is modified.
pub fn assemble(prior_turns: &[Message], new_user_text: impl Into<String>) -> Conversation {
    let mut messages = Vec::with_capacity(prior_turns.len() + 1);
    messages.extend_from_slice(prior_turns);
    messages.push(Message::user(new_user_text));
    Conversation::new(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<Message> {
        vec![
            Message::user("hi"),
            Message::assistant("hello!"),
            Message::user("how are you?"),
            Message::assistant("fine"),
        ]
    }

    #[test]
    fn assemble_appends_user_turn() {
        let conv = assemble(&history(), "what's new?");
        assert_eq!(conv.len(), 5);
        let last = conv.messages().last().unwrap();
        assert_eq!(last.role(), Role::User);
        assert_eq!(last.content(), "what's new?");
    }

    #[test]
    fn assemble_preserves_prior_turns() {
        let prior = history();
        let conv = assemble(&prior, "next");
        let (_, rest) = conv.messages().split_last().unwrap();
        assert_eq!(rest, prior.as_slice());
    }

    #[test]
    fn assemble_with_empty_history() {
        let conv = assemble(&[], "What's the weather?");
        assert_eq!(conv.messages(), &[Message::user("What's the weather?")]);
    }

    #[test]
    fn latest_user_skips_assistant_turns() {
        let mut msgs = history();
        msgs.push(Message::assistant("trailing"));
        let conv = Conversation::from(msgs);
        assert_eq!(conv.latest_user_content(), "how are you?");
    }

    #[test]
    fn latest_user_content_empty_without_user() {
        let conv = Conversation::from(vec![Message::assistant("only me")]);
        assert!(conv.latest_user().is_none());
        assert_eq!(conv.latest_user_content(), "");
    }

    #[test]
    fn message_serializes_lowercase_role() {
        let json = serde_json::to_string(&Message::assistant("ok")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
        let back: Message = serde_json::from_str(r#"{"role":"user","content":"hey"}"#).unwrap();
        assert_eq!(back, Message::user("hey"));
    }
}
