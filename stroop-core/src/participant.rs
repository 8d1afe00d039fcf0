use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
    #[serde(rename = "Prefer not to say")]
    PreferNotToSay,
}

impl Gender {
    pub const ALL: [Gender; 4] = [
        Gender::Male,
        Gender::Female,
        Gender::Other,
        Gender::PreferNotToSay,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
            Gender::PreferNotToSay => "Prefer not to say",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown gender `{0}` (expected male, female, other or prefer-not-to-say)")]
pub struct ParseGenderError(String);

impl FromStr for Gender {
    type Err = ParseGenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" | "o" => Ok(Gender::Other),
            "prefernottosay" | "na" => Ok(Gender::PreferNotToSay),
            _ => Err(ParseGenderError(s.to_string())),
        }
    }
}

/// Participant metadata copied into every output row
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub age: String,
    pub gender: Gender,
}

impl Participant {
    pub fn new(id: impl Into<String>, age: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: id.into(),
            age: age.into(),
            gender,
        }
    }
}
