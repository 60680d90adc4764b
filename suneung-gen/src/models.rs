//! The closed set of models an operator may pick

use clap::ValueEnum;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Model {
    /// Small tier: gemini-1.5-flash
    #[value(name = "gemini-1.5-flash")]
    Flash,
    /// Medium tier: gemini-1.5-pro
    #[value(name = "gemini-1.5-pro")]
    Pro,
    /// Next-generation tier: gemini-2.0-flash-exp
    #[value(name = "gemini-2.0-flash-exp")]
    NextFlash,
}

impl Model {
    pub const ALL: [Model; 3] = [Model::Flash, Model::Pro, Model::NextFlash];

    /// Bare identifier the gateway expects
    pub fn id(self) -> &'static str {
        match self {
            Self::Flash => "gemini-1.5-flash",
            Self::Pro => "gemini-1.5-pro",
            Self::NextFlash => "gemini-2.0-flash-exp",
        }
    }

    pub fn tier(self) -> &'static str {
        match self {
            Self::Flash => "small",
            Self::Pro => "medium",
            Self::NextFlash => "next-generation",
        }
    }

    /// Parse a bare identifier. Prefixed forms like `models/gemini-1.5-pro` are refused.
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL.into_iter().find(|m| m.id() == id)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_bare() {
        for model in Model::ALL {
            assert!(!model.id().contains('/'));
            assert_eq!(Model::from_id(model.id()), Some(model));
        }
    }

    #[test]
    fn test_prefixed_id_rejected() {
        assert_eq!(Model::from_id("models/gemini-1.5-pro"), None);
        assert_eq!(Model::from_id(""), None);
        assert_eq!(Model::from_id("gpt-4o"), None);
    }

    #[test]
    fn test_value_enum_names_match_ids() {
        for model in Model::ALL {
            let parsed = Model::from_str(model.id(), false).unwrap();
            assert_eq!(parsed, model);
        }
    }
}
