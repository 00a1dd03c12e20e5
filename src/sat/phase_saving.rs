#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Polarity choice for decisions.

use clap::ValueEnum;

/// Which value a heap decision assigns to the chosen variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Phase {
    /// The negation of the variable's last setting. Fresh variables have a
    /// last setting of `false`, so their first decision is `true`.
    #[default]
    Saved,
    /// Always `false`.
    Negative,
    /// Always `true`.
    Positive,
}

impl Phase {
    /// Polarity for a variable whose last concrete value was `previous`.
    #[must_use]
    pub const fn decide(self, previous: bool) -> bool {
        match self {
            Self::Saved => !previous,
            Self::Negative => false,
            Self::Positive => true,
        }
    }

    /// A fixed phase deciding `value` every time.
    #[must_use]
    pub const fn fixed(value: bool) -> Self {
        if value { Self::Positive } else { Self::Negative }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_phase_flips() {
        assert!(Phase::Saved.decide(false));
        assert!(!Phase::Saved.decide(true));
    }

    #[test]
    fn test_fixed_phase_ignores_history() {
        for previous in [false, true] {
            assert!(!Phase::fixed(false).decide(previous));
            assert!(Phase::fixed(true).decide(previous));
        }
    }
}
