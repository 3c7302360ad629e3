use serde::{Deserialize, Serialize};

use crate::types::{Content, Role};

/// One message in the conversation. Fixed once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    role: Role,
    text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn to_content(&self) -> Content {
        Content::text(self.role, self.text.clone())
    }
}

/// Chronological list of turns owned by a single session.
///
/// Only the pipeline appends: a user turn when a prompt is accepted, and a
/// model turn right after that same prompt's response yields code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn count(&self, role: Role) -> usize {
        self.turns.iter().filter(|turn| turn.role == role).count()
    }

    /// Empties the history. Nothing else changes.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub(crate) fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(ConversationTurn::user(text));
    }

    pub(crate) fn push_model(&mut self, text: impl Into<String>) {
        debug_assert!(
            matches!(self.last().map(ConversationTurn::role), Some(Role::User)),
            "model turn must follow a user turn"
        );
        self.turns.push(ConversationTurn::model(text));
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a ConversationTurn;
    type IntoIter = std::slice::Iter<'a, ConversationTurn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
