use crate::participant::{Gender, Participant};
use crate::stimulus::InkColor;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialType {
    Stroop,
    ColorBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimeType {
    Congruent,
    Incongruent,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StroopType {
    Congruent,
    Incongruent,
}

impl TrialType {
    pub fn label(self) -> &'static str {
        match self {
            TrialType::Stroop => "stroop",
            TrialType::ColorBlock => "color_block",
        }
    }
}

impl PrimeType {
    pub const ALL: [PrimeType; 3] = [PrimeType::Congruent, PrimeType::Incongruent, PrimeType::Neutral];

    pub fn label(self) -> &'static str {
        match self {
            PrimeType::Congruent => "congruent",
            PrimeType::Incongruent => "incongruent",
            PrimeType::Neutral => "neutral",
        }
    }
}

impl StroopType {
    pub const ALL: [StroopType; 2] = [StroopType::Congruent, StroopType::Incongruent];

    pub fn label(self) -> &'static str {
        match self {
            StroopType::Congruent => "congruent",
            StroopType::Incongruent => "incongruent",
        }
    }
}

impl fmt::Display for TrialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The condition part of a trial, before it is placed in a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Condition {
    pub trial_type: TrialType,
    pub prime_type: PrimeType,
    pub stroop_type: StroopType,
    pub color: InkColor,
}

impl Condition {
    pub fn new(
        trial_type: TrialType,
        prime_type: PrimeType,
        stroop_type: StroopType,
        color: InkColor,
    ) -> Self {
        Self {
            trial_type,
            prime_type,
            stroop_type,
            color,
        }
    }
}

/// One main-study trial. Words and target color are derived from the
/// condition, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialSpec {
    pub trial_type: TrialType,
    pub prime_type: PrimeType,
    pub stroop_type: StroopType,
    pub color: InkColor,
    pub block_num: u32,
    pub trial_num: u32,
    pub is_practice: bool,
}

impl TrialSpec {
    pub fn from_condition(condition: Condition, block_num: u32, trial_num: u32, is_practice: bool) -> Self {
        Self {
            trial_type: condition.trial_type,
            prime_type: condition.prime_type,
            stroop_type: condition.stroop_type,
            color: condition.color,
            block_num,
            trial_num,
            is_practice,
        }
    }

    pub fn condition(&self) -> Condition {
        Condition::new(self.trial_type, self.prime_type, self.stroop_type, self.color)
    }

    /// Empty for practice and neutral trials
    pub fn prime_word(&self) -> &'static str {
        if self.is_practice {
            return "";
        }
        match self.prime_type {
            PrimeType::Neutral => "",
            PrimeType::Congruent => self.color.word(),
            PrimeType::Incongruent => self.color.other().word(),
        }
    }

    /// Stroop trials only; color blocks have no word
    pub fn target_word(&self) -> Option<&'static str> {
        match self.trial_type {
            TrialType::ColorBlock => None,
            TrialType::Stroop => Some(match self.stroop_type {
                StroopType::Congruent => self.color.word(),
                StroopType::Incongruent => self.color.other().word(),
            }),
        }
    }

    pub fn target_color(&self) -> InkColor {
        self.color
    }
}

/// Rows written to a tab-separated output file
pub trait Record: Serialize {
    const FIELDS: &'static [&'static str];
}

/// One persisted main-study trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    pub participant_id: String,
    pub age: String,
    pub gender: Gender,
    pub block: u32,
    pub trial: u32,
    pub trial_type: TrialType,
    pub prime_type: &'static str,
    pub stroop_type: &'static str,
    pub prime_word: &'static str,
    pub target_word: &'static str,
    pub target_color: InkColor,
    pub response: Option<String>,
    pub reaction_time: Option<f64>,
    pub correct: bool,
}

impl TrialRecord {
    pub fn new(
        participant: &Participant,
        spec: &TrialSpec,
        response: Option<String>,
        reaction_time: Option<f64>,
        correct: bool,
    ) -> Self {
        Self {
            participant_id: participant.id.clone(),
            age: participant.age.clone(),
            gender: participant.gender,
            block: spec.block_num,
            trial: spec.trial_num,
            trial_type: spec.trial_type,
            prime_type: if spec.is_practice {
                "none"
            } else {
                spec.prime_type.label()
            },
            stroop_type: match spec.trial_type {
                TrialType::Stroop => spec.stroop_type.label(),
                TrialType::ColorBlock => "N/A",
            },
            prime_word: spec.prime_word(),
            target_word: spec.target_word().unwrap_or("COLOR_BLOCK"),
            target_color: spec.target_color(),
            response,
            reaction_time,
            correct,
        }
    }
}

impl Record for TrialRecord {
    const FIELDS: &'static [&'static str] = &[
        "participant_id",
        "age",
        "gender",
        "block",
        "trial",
        "trial_type",
        "prime_type",
        "stroop_type",
        "prime_word",
        "target_word",
        "target_color",
        "response",
        "reaction_time",
        "correct",
    ];
}

/// One prime-detection trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionSpec {
    pub block_num: u32,
    pub trial_num: u32,
    pub duration_ms: u64,
    pub prime: InkColor,
}

impl DetectionSpec {
    pub fn prime_word(&self) -> &'static str {
        self.prime.word()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRecord {
    pub participant_id: String,
    pub age: String,
    pub gender: Gender,
    pub block: u32,
    pub trial: u32,
    pub prime: &'static str,
    pub duration_ms: u64,
    pub response: String,
}

impl DetectionRecord {
    pub fn new(participant: &Participant, spec: &DetectionSpec, response: String) -> Self {
        Self {
            participant_id: participant.id.clone(),
            age: participant.age.clone(),
            gender: participant.gender,
            block: spec.block_num,
            trial: spec.trial_num,
            prime: spec.prime_word(),
            duration_ms: spec.duration_ms,
            response,
        }
    }
}

impl Record for DetectionRecord {
    const FIELDS: &'static [&'static str] = &[
        "participant_id",
        "age",
        "gender",
        "block",
        "trial",
        "prime",
        "duration_ms",
        "response",
    ];
}
