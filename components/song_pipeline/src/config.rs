// components/song_pipeline/src/config.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_FILE_FORMAT: &str = "{artist} - {track_name}";
pub const DEFAULT_SEARCH_FORMAT: &str = "{artist} - {track_name} lyrics";
pub const DEFAULT_INPUT_EXT: &str = ".m4a";
pub const DEFAULT_OUTPUT_EXT: &str = ".mp3";

/// What to do when a song already exists in the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Ask the operator
    #[default]
    Prompt,
    Force,
    Skip,
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverwritePolicy::Prompt => "prompt",
            OverwritePolicy::Force => "force",
            OverwritePolicy::Skip => "skip",
        };
        f.write_str(name)
    }
}

impl FromStr for OverwritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prompt" => Ok(OverwritePolicy::Prompt),
            "force" => Ok(OverwritePolicy::Force),
            "skip" => Ok(OverwritePolicy::Skip),
            other => Err(format!(
                "unknown overwrite policy '{other}' (expected prompt, force or skip)"
            )),
        }
    }
}

/// How the batch driver retries transient failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause after each requeue
    pub delay: Duration,
    /// Total attempts per reference in one run; `None` retries until the
    /// traversal ends
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            max_attempts: None,
        }
    }
}

/// Settings for one pipeline run, passed explicitly to every component
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Destination directory for artifacts and the metadata log
    pub folder: PathBuf,
    pub overwrite: OverwritePolicy,
    /// Naming template; may contain `/` to create subdirectories
    pub file_format: String,
    /// Template for the video-platform search query
    pub search_format: String,
    pub input_ext: String,
    pub output_ext: String,
    pub download_only_metadata: bool,
    pub dry_run: bool,
    pub no_metadata: bool,
    pub no_file_storage: bool,
    pub no_spaces: bool,
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("."),
            overwrite: OverwritePolicy::default(),
            file_format: DEFAULT_FILE_FORMAT.to_string(),
            search_format: DEFAULT_SEARCH_FORMAT.to_string(),
            input_ext: DEFAULT_INPUT_EXT.to_string(),
            output_ext: DEFAULT_OUTPUT_EXT.to_string(),
            download_only_metadata: false,
            dry_run: false,
            no_metadata: false,
            no_file_storage: false,
            no_spaces: false,
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            ..Self::default()
        }
    }

    /// Give both extensions a leading dot and lowercase them
    pub fn normalized(mut self) -> Self {
        self.input_ext = normalize_ext(&self.input_ext);
        self.output_ext = normalize_ext(&self.output_ext);
        self
    }
}

fn normalize_ext(ext: &str) -> String {
    let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
    format!(".{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("mp3", ".mp3")]
    #[case(".mp3", ".mp3")]
    #[case(" .FLAC ", ".flac")]
    fn extensions_get_a_leading_dot(#[case] raw: &str, #[case] expected: &str) {
        let config = PipelineConfig {
            input_ext: raw.into(),
            output_ext: raw.into(),
            ..PipelineConfig::default()
        }
        .normalized();

        assert_eq!(config.input_ext, expected);
        assert_eq!(config.output_ext, expected);
    }

    #[rstest]
    #[case("prompt", OverwritePolicy::Prompt)]
    #[case("Force", OverwritePolicy::Force)]
    #[case(" skip ", OverwritePolicy::Skip)]
    fn overwrite_policy_parses(#[case] raw: &str, #[case] expected: OverwritePolicy) {
        assert_eq!(raw.parse::<OverwritePolicy>(), Ok(expected));
        assert_eq!(expected.to_string().parse::<OverwritePolicy>(), Ok(expected));
    }

    #[test]
    fn unknown_overwrite_policy_is_rejected() {
        assert!("sometimes".parse::<OverwritePolicy>().is_err());
    }

    #[test]
    fn retry_defaults_to_unbounded() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.delay, Duration::from_millis(500));
        assert_eq!(retry.max_attempts, None);
    }
}
