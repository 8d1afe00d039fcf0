use std::fmt;

/// Session phases shared behavior
pub trait Phase: Copy + Clone + PartialEq + fmt::Debug + fmt::Display {
    /// Trials are running, so the trial sequencer owns the screen
    fn runs_trials(&self) -> bool;

    /// The session is over and the program may exit
    fn is_finished(&self) -> bool;

    fn is_practice(&self) -> bool {
        false
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum StroopPhase {
    #[default]
    Welcome,
    Practice,
    PracticeFeedback,
    /// Break screen shown before the given block (never before block 1)
    BlockBreak(u32),
    Block(u32),
    Complete,
    Terminated,
    Finished,
}

impl Phase for StroopPhase {
    fn runs_trials(&self) -> bool {
        matches!(self, Self::Practice | Self::Block(_))
    }

    fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    fn is_practice(&self) -> bool {
        matches!(self, Self::Practice)
    }
}

impl fmt::Display for StroopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome => f.write_str("welcome"),
            Self::Practice => f.write_str("practice"),
            Self::PracticeFeedback => f.write_str("practice feedback"),
            Self::BlockBreak(block) => write!(f, "break before block {block}"),
            Self::Block(block) => write!(f, "block {block}"),
            Self::Complete => f.write_str("complete"),
            Self::Terminated => f.write_str("terminated"),
            Self::Finished => f.write_str("finished"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum DetectionPhase {
    #[default]
    Welcome,
    Block(u32),
    /// Break screen shown after the given block
    Break(u32),
    Goodbye,
    Finished,
}

impl Phase for DetectionPhase {
    fn runs_trials(&self) -> bool {
        matches!(self, Self::Block(_))
    }

    fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for DetectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome => f.write_str("welcome"),
            Self::Block(block) => write!(f, "block {block}"),
            Self::Break(block) => write!(f, "break after block {block}"),
            Self::Goodbye => f.write_str("goodbye"),
            Self::Finished => f.write_str("finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_trial_phases_run_trials() {
        assert!(StroopPhase::Practice.runs_trials());
        assert!(StroopPhase::Block(3).runs_trials());
        assert!(!StroopPhase::BlockBreak(3).runs_trials());
        assert!(DetectionPhase::Block(1).runs_trials());
        assert!(!DetectionPhase::Break(1).runs_trials());
    }

    #[test]
    fn practice_flag() {
        assert!(StroopPhase::Practice.is_practice());
        assert!(!StroopPhase::Block(1).is_practice());
        assert!(!DetectionPhase::Block(1).is_practice());
    }

    #[test]
    fn display_names_blocks() {
        assert_eq!(StroopPhase::BlockBreak(2).to_string(), "break before block 2");
        assert_eq!(DetectionPhase::Break(1).to_string(), "break after block 1");
    }
}
