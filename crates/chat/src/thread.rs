//! Conversation threads and turns.

use chrono::{DateTime, Utc};
use faqchat_llm::{ChatMessage, Role};
use serde::{Deserialize, Serialize};

/// Identifier of a conversation thread.
pub type ThreadId = u64;

/// Placeholder title for a thread with no user turns yet.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum characters of the first user turn used for the thread title.
const TITLE_MAX_CHARS: usize = 30;

/// One turn of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a user turn stamped with the current time.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant turn stamped with the current time.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An independent conversation: an ordered list of turns plus a title
/// derived from the first user turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationThread {
    pub id: ThreadId,
    pub title: String,
    pub turns: Vec<ConversationTurn>,
}

impl ConversationThread {
    /// Create an empty thread with the placeholder title.
    pub fn new(id: ThreadId) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            turns: Vec::new(),
        }
    }

    /// Render the turns as role-tagged messages for the completion prompt.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .map(|turn| ChatMessage {
                role: turn.role,
                content: turn.text.clone(),
            })
            .collect()
    }
}

/// Derive a thread title from the first user turn, truncated char-safely.
pub fn derive_title(text: &str) -> String {
    let chars: Vec<char> = text.trim().chars().collect();
    if chars.len() <= TITLE_MAX_CHARS {
        chars.into_iter().collect()
    } else {
        let truncated: String = chars.into_iter().take(TITLE_MAX_CHARS).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_thread_has_placeholder_title() {
        let thread = ConversationThread::new(1);
        assert_eq!(thread.title, DEFAULT_TITLE);
        assert!(thread.turns.is_empty());
    }

    #[test]
    fn test_history_preserves_order_and_roles() {
        let mut thread = ConversationThread::new(1);
        thread.turns.push(ConversationTurn::user("hi"));
        thread.turns.push(ConversationTurn::assistant("hello"));

        let history = thread.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "hi");
        assert_eq!(history[1].role, Role::Assistant);
    }

    #[test]
    fn test_derive_title_short_text() {
        assert_eq!(derive_title("Short question?"), "Short question?");
    }

    #[test]
    fn test_derive_title_truncates_long_text() {
        let long = "This is a rather long first message for a chat";
        let title = derive_title(long);
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), 33);
    }

    #[test]
    fn test_derive_title_is_char_safe() {
        let text = "ответы на часто задаваемые вопросы о сервисе";
        let title = derive_title(text);
        assert!(title.ends_with("..."));
    }
}
