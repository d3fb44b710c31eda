//! Chat messages accepted by network calls

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };
        f.write_str(name)
    }
}

/// A normalized chat message handed to a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// The `messages` field of a generate or stream request.
///
/// Clients may send a bare string, a list of strings, or a list of
/// `{ role, content }` objects, and may mix strings and objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageInput {
    Text(String),
    List(Vec<MessageItem>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageItem {
    Text(String),
    Message { role: Role, content: Value },
}

impl MessageInput {
    pub fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            MessageInput::Text(text) => vec![ChatMessage::user(text)],
            MessageInput::List(items) => items.into_iter().map(MessageItem::into_message).collect(),
        }
    }
}

impl MessageItem {
    fn into_message(self) -> ChatMessage {
        match self {
            MessageItem::Text(text) => ChatMessage::user(text),
            MessageItem::Message { role, content } => {
                let content = match content {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                ChatMessage::new(role, content)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Vec<ChatMessage> {
        serde_json::from_value::<MessageInput>(value)
            .unwrap()
            .into_messages()
    }

    #[test]
    fn test_bare_string_becomes_user_message() {
        assert_eq!(parse(json!("hello")), vec![ChatMessage::user("hello")]);
    }

    #[test]
    fn test_mixed_list() {
        let messages = parse(json!([
            "first",
            {"role": "assistant", "content": "second"},
            {"role": "system", "content": "third"}
        ]));
        assert_eq!(
            messages,
            vec![
                ChatMessage::user("first"),
                ChatMessage::assistant("second"),
                ChatMessage::system("third"),
            ]
        );
    }

    #[test]
    fn test_structured_content_rendered_as_json() {
        let messages = parse(json!([{"role": "user", "content": [{"type": "text", "text": "hi"}]}]));
        assert_eq!(messages[0].content, r#"[{"type":"text","text":"hi"}]"#);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = serde_json::from_value::<MessageInput>(json!([{"role": "robot", "content": "x"}]));
        assert!(result.is_err());
    }
}
