//! Closed set of advertisement tones.
//!
//! A tone is always one of these five options — never a free-form string —
//! so the prompt directive and the configuration surface cannot drift apart.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    #[serde(rename = "Professional & Engaging")]
    ProfessionalEngaging,
    #[serde(rename = "Formal")]
    Formal,
    #[serde(rename = "Friendly & Casual")]
    FriendlyCasual,
    #[serde(rename = "Technical & Direct")]
    TechnicalDirect,
    #[serde(rename = "Creative & Unique")]
    CreativeUnique,
}

impl Tone {
    /// Human-readable label, embedded verbatim in the generation prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Tone::ProfessionalEngaging => "Professional & Engaging",
            Tone::Formal => "Formal",
            Tone::FriendlyCasual => "Friendly & Casual",
            Tone::TechnicalDirect => "Technical & Direct",
            Tone::CreativeUnique => "Creative & Unique",
        }
    }

    /// All selectable tones, in presentation order.
    pub const ALL: [Tone; 5] = [
        Tone::ProfessionalEngaging,
        Tone::Formal,
        Tone::FriendlyCasual,
        Tone::TechnicalDirect,
        Tone::CreativeUnique,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tone_is_professional_engaging() {
        assert_eq!(Tone::default(), Tone::ProfessionalEngaging);
    }

    #[test]
    fn test_tone_serializes_as_label() {
        for tone in Tone::ALL {
            let json = serde_json::to_string(&tone).unwrap();
            assert_eq!(json, format!("\"{}\"", tone.label()));
        }
    }

    #[test]
    fn test_tone_roundtrips_through_json() {
        for tone in Tone::ALL {
            let json = serde_json::to_string(&tone).unwrap();
            let back: Tone = serde_json::from_str(&json).unwrap();
            assert_eq!(back, tone);
        }
    }

    #[test]
    fn test_unknown_tone_rejected() {
        assert!(serde_json::from_str::<Tone>("\"Sarcastic\"").is_err());
    }
}
