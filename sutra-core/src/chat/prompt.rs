//! The grounding prompt sent with every question.

use crate::config::PersonaConfig;
use crate::provider::Message;

/// Line placed above and below the embedded context.
pub const CONTEXT_DELIMITER: &str = "-------------------------";

/// Builds the two-message exchange for one question.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    persona: PersonaConfig,
}

impl PromptTemplate {
    pub fn new(persona: PersonaConfig) -> Self {
        Self { persona }
    }

    /// The instruction message: persona, delimited context, and the
    /// restriction to answer from that context alone.
    pub fn system_message(&self, context: &str) -> String {
        format!(
            "You are {name}, {description}. Answer the following question strictly based on the text provided below. \
             Do not add any external knowledge or personal opinions. Use only the given text as your source.\n\n\
             Context from {title}:\n\
             {CONTEXT_DELIMITER}\n\
             {context}\n\
             {CONTEXT_DELIMITER}\n\
             Now, answer the following question:",
            name = self.persona.name,
            description = self.persona.description,
            title = self.persona.source_title,
        )
    }

    /// System instruction followed by the verbatim question.
    pub fn messages(&self, question: &str, context: &str) -> Vec<Message> {
        vec![
            Message::system(self.system_message(context)),
            Message::user(question),
        ]
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(PersonaConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_delimited_verbatim() {
        let context = "Page one.\n\nPage two: do your duty.";
        let prompt = PromptTemplate::default().system_message(context);

        let expected = format!("{CONTEXT_DELIMITER}\n{context}\n{CONTEXT_DELIMITER}");
        assert!(prompt.contains(&expected));
        assert!(prompt.starts_with("You are Bhagavad Gita, the divine scripture."));
        assert!(prompt.contains("Do not add any external knowledge"));
        assert!(prompt.ends_with("Now, answer the following question:"));
    }

    #[test]
    fn test_custom_persona() {
        let template = PromptTemplate::new(PersonaConfig {
            name: "Marcus".to_string(),
            description: "the emperor's private notebook".to_string(),
            source_title: "Meditations".to_string(),
        });
        let prompt = template.system_message("ctx");
        assert!(prompt.starts_with("You are Marcus, the emperor's private notebook."));
        assert!(prompt.contains("Context from Meditations:"));
    }

    #[test]
    fn test_messages_are_system_then_user() {
        let messages = PromptTemplate::default().messages("What is my duty?", "ctx");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1], Message::user("What is my duty?"));
    }
}
