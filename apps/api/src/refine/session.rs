//! Refinement session — the conversational state machine behind ad
//! fine-tuning.
//!
//! Lifecycle: a session is created (primed) from the current ad the first
//! time refinement is requested after a successful generation. Each user
//! message appends a turn and sends the full transcript to the model. A
//! complete, non-empty, non-blocked reply is recorded as an assistant turn
//! and its sanitized form becomes the new ad. A failed reply (empty or
//! safety-stopped) records nothing: the user's turn stays in the transcript,
//! no synthetic assistant turn is added, and the ad is untouched. The
//! session is torn down whenever a fresh non-refinement generation replaces
//! the ad.

use serde::Serialize;

use crate::llm_client::Content;
use crate::refine::prompts::build_priming_message;
use crate::refine::sanitizer::sanitize;

/// Author of a transcript turn. `Priming` is system-authored and withheld
/// from conversational display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Priming,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// A refinement chat session. The transcript is never empty: the first turn
/// is always the priming turn.
#[derive(Debug, Clone)]
pub struct RefinementSession {
    turns: Vec<Turn>,
}

impl RefinementSession {
    /// Creates a primed session from the current ad text.
    pub fn primed(ad_text: &str) -> Self {
        Self {
            turns: vec![Turn {
                role: Role::Priming,
                text: build_priming_message(ad_text),
            }],
        }
    }

    /// Appends the user's outgoing message. The turn is recorded before the
    /// model is called and is kept even if the reply later fails.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::User,
            text: text.into(),
        });
    }

    /// Records a successful reply: the raw text joins the transcript as an
    /// assistant turn, and the sanitized form (the new ad) is returned.
    pub fn record_reply(&mut self, raw: &str) -> String {
        let cleaned = sanitize(raw).to_string();
        self.turns.push(Turn {
            role: Role::Assistant,
            text: raw.to_string(),
        });
        cleaned
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Turns shown to the user as chat bubbles. The priming turn is
    /// system-authored and excluded.
    pub fn visible_turns(&self) -> Vec<&Turn> {
        self.turns
            .iter()
            .filter(|t| t.role != Role::Priming)
            .collect()
    }

    /// Full transcript in Gemini wire format. The priming turn and assistant
    /// turns go out under the "model" role.
    pub fn to_contents(&self) -> Vec<Content> {
        self.turns
            .iter()
            .map(|t| match t.role {
                Role::User => Content::user(t.text.clone()),
                Role::Priming | Role::Assistant => Content::model(t.text.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AD: &str = "**Job Title:** Backend Engineer\n**Company:** Acme";

    #[test]
    fn test_fresh_session_has_exactly_one_priming_turn() {
        let session = RefinementSession::primed(AD);
        assert_eq!(session.turns().len(), 1);
        assert_eq!(session.turns()[0].role, Role::Priming);
        assert!(session.turns()[0].text.contains(AD));
    }

    #[test]
    fn test_priming_turn_not_visible() {
        let mut session = RefinementSession::primed(AD);
        assert!(session.visible_turns().is_empty());

        session.push_user("make it shorter");
        let visible = session.visible_turns();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].role, Role::User);
    }

    #[test]
    fn test_record_reply_appends_raw_and_returns_sanitized() {
        let mut session = RefinementSession::primed(AD);
        session.push_user("change the company to Globex");

        let raw = format!("Here's the revised ad:\n\n{AD}");
        let new_ad = session.record_reply(&raw);

        assert_eq!(new_ad, AD);
        let last = session.turns().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.text, raw); // transcript keeps the raw reply
    }

    #[test]
    fn test_failed_reply_keeps_user_turn_and_adds_nothing() {
        let mut session = RefinementSession::primed(AD);
        session.push_user("make it pop");
        // Reply was empty or safety-stopped: record_reply is never called.
        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.turns().last().unwrap().role, Role::User);
    }

    #[test]
    fn test_wire_roles() {
        let mut session = RefinementSession::primed(AD);
        session.push_user("hello");
        session.record_reply("hi there");

        let contents = session.to_contents();
        let roles: Vec<&str> = contents.iter().map(|c| c.role).collect();
        assert_eq!(roles, vec!["model", "user", "model"]);
    }
}
