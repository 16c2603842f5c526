//! The session transcript.

use std::fmt;

/// Who said something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    User,
    Assistant,
}

/// One immutable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    speaker: Speaker,
    label: String,
    message: String,
}

impl Turn {
    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    /// Display name of the speaker, e.g. "You".
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "**{}:** {}", self.label, self.message)
    }
}

/// Append-only, chronologically ordered conversation log.
#[derive(Debug, Clone)]
pub struct Conversation {
    user_label: String,
    assistant_label: String,
    turns: Vec<Turn>,
}

impl Conversation {
    /// Empty conversation with the given speaker labels.
    pub fn new(user_label: impl Into<String>, assistant_label: impl Into<String>) -> Self {
        Self {
            user_label: user_label.into(),
            assistant_label: assistant_label.into(),
            turns: Vec::new(),
        }
    }

    pub fn append(&mut self, speaker: Speaker, message: impl Into<String>) {
        let label = match speaker {
            Speaker::User => self.user_label.clone(),
            Speaker::Assistant => self.assistant_label.clone(),
        };
        self.turns.push(Turn {
            speaker,
            label,
            message: message.into(),
        });
    }

    /// Snapshot of every turn in order. Later appends do not affect it.
    pub fn read_all(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new("You", "Assistant")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut conversation = Conversation::default();
        for i in 0..5 {
            let speaker = if i % 2 == 0 { Speaker::User } else { Speaker::Assistant };
            conversation.append(speaker, format!("message {i}"));
        }

        let turns = conversation.read_all();
        assert_eq!(turns.len(), 5);
        for (i, turn) in turns.iter().enumerate() {
            assert_eq!(turn.message(), format!("message {i}"));
        }
    }

    #[test]
    fn test_snapshot_is_not_aliased() {
        let mut conversation = Conversation::default();
        conversation.append(Speaker::User, "first");
        let snapshot = conversation.read_all();

        conversation.append(Speaker::Assistant, "second");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn test_labels_and_display() {
        let mut conversation = Conversation::new("You", "Bhagavad Gita");
        conversation.append(Speaker::User, "Who are you?");
        conversation.append(Speaker::Assistant, "The song of the Lord.");

        let turns = conversation.read_all();
        assert_eq!(turns[0].label(), "You");
        assert_eq!(turns[1].label(), "Bhagavad Gita");
        assert_eq!(turns[1].to_string(), "**Bhagavad Gita:** The song of the Lord.");
        assert_eq!(conversation.last().map(Turn::speaker), Some(Speaker::Assistant));
    }

    #[test]
    fn test_new_conversation_is_empty() {
        let conversation = Conversation::default();
        assert!(conversation.is_empty());
        assert!(conversation.read_all().is_empty());
    }
}
