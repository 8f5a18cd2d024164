//! Enumeration types for the run options.

use std::fmt;

use clap::ValueEnum;

/// Defines which translation model the pipeline builds.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Unpaired translation with cycle consistency.
    #[value(name = "cyclegan")]
    CycleGan,
    /// Dual style transfer network.
    #[value(name = "DSTN")]
    Dstn,
    /// DLP-GAN.
    #[value(name = "DLP_GAN")]
    DlpGan,
    /// Single-direction test model.
    #[value(name = "test")]
    Test,
}

impl ModelKind {
    /// Returns the name used on the command line and in checkpoint paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CycleGan => "cyclegan",
            Self::Dstn => "DSTN",
            Self::DlpGan => "DLP_GAN",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pipeline stage the options are resolved for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Training run.
    Train,
    /// Test / translation run.
    Test,
}

impl Phase {
    /// Value injected as `isTrain`.
    #[must_use]
    pub const fn is_train(self) -> bool {
        matches!(self, Self::Train)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_match_cli_values() {
        for kind in ModelKind::value_variants() {
            let value = kind.to_possible_value().expect("no skipped variants");
            assert_eq!(value.get_name(), kind.as_str());
        }
    }

    #[test]
    fn model_names_are_case_sensitive() {
        assert_eq!(ModelKind::from_str("DSTN", false), Ok(ModelKind::Dstn));
        assert!(ModelKind::from_str("dstn", false).is_err());
    }

    #[test]
    fn phase_sets_is_train() {
        assert!(Phase::Train.is_train());
        assert!(!Phase::Test.is_train());
    }
}
