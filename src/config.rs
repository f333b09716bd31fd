use std::path::Path;

use serde::Deserialize;

use crate::error::AlignmentError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// Bound of the forward search window, in tokens, in both sequences.
    pub lookahead: usize,
    /// Shortest run of matching tokens accepted as a chunk.
    pub min_run_length: usize,
    /// Transcript words ignored when classifying gaps.
    pub fillers: Vec<String>,
}

impl AlignerConfig {
    pub const DEFAULT_LOOKAHEAD: usize = 48;
    pub const DEFAULT_MIN_RUN_LENGTH: usize = 1;
    pub const DEFAULT_FILLERS: [&'static str; 7] = ["uh", "huh", "mm", "yeah", "mhm", "hmm", "hm"];

    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read aligner config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| AlignmentError::json("parse aligner config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AlignmentError> {
        if self.lookahead == 0 {
            return Err(AlignmentError::invalid_config("lookahead must be >= 1"));
        }
        if self.min_run_length == 0 {
            return Err(AlignmentError::invalid_config("min_run_length must be >= 1"));
        }
        if self.min_run_length > self.lookahead {
            return Err(AlignmentError::invalid_config(format!(
                "min_run_length ({}) cannot exceed lookahead ({})",
                self.min_run_length, self.lookahead
            )));
        }
        Ok(())
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            lookahead: Self::DEFAULT_LOOKAHEAD,
            min_run_length: Self::DEFAULT_MIN_RUN_LENGTH,
            fillers: Self::DEFAULT_FILLERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
