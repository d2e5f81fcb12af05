// bases/download_cli/src/settings.rs
use crate::args::Args;
use catalog_client::Credentials;
use serde::Deserialize;
use song_pipeline::{OverwritePolicy, PipelineConfig, RetryPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Defaults read from a TOML config file
///
/// Every key is optional; command-line arguments take precedence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub folder: Option<PathBuf>,
    pub overwrite: Option<OverwritePolicy>,
    pub file_format: Option<String>,
    pub search_format: Option<String>,
    pub input_ext: Option<String>,
    pub output_ext: Option<String>,
    pub download_only_metadata: Option<bool>,
    pub no_metadata: Option<bool>,
    pub no_file_storage: Option<bool>,
    pub no_spaces: Option<bool>,
    pub retry_delay_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub analysis_command: Option<String>,
    pub with_lyrics: Option<bool>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl FileSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Hook settings for batch runs
#[derive(Debug, Clone, PartialEq)]
pub struct HookSettings {
    pub command: String,
    pub stdin: Option<String>,
}

/// Everything the app needs, merged from arguments, config file and defaults
#[derive(Debug, Clone)]
pub struct Settings {
    pub pipeline: PipelineConfig,
    pub credentials: Option<Credentials>,
    pub hook: Option<HookSettings>,
    pub with_lyrics: bool,
}

impl Settings {
    /// Read the config file named by `--config`, if any, and merge
    pub fn load(args: &Args) -> Result<Self, SettingsError> {
        let file = match &args.config {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::default(),
        };
        Ok(Self::resolve(args, file))
    }

    pub fn resolve(args: &Args, file: FileSettings) -> Self {
        let defaults = PipelineConfig::default();
        // A flag given on the command line always wins; otherwise the file decides
        let flag = |cli: bool, file: Option<bool>| cli || file.unwrap_or(false);

        let retry = RetryPolicy {
            delay: args
                .retry_delay_ms
                .or(file.retry_delay_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.delay),
            max_attempts: args.max_attempts.or(file.max_attempts),
        };

        let pipeline = PipelineConfig {
            folder: args.folder.clone().or(file.folder).unwrap_or(defaults.folder),
            overwrite: args.overwrite.or(file.overwrite).unwrap_or(defaults.overwrite),
            file_format: args
                .file_format
                .clone()
                .or(file.file_format)
                .unwrap_or(defaults.file_format),
            search_format: args
                .search_format
                .clone()
                .or(file.search_format)
                .unwrap_or(defaults.search_format),
            input_ext: args.input_ext.clone().or(file.input_ext).unwrap_or(defaults.input_ext),
            output_ext: args
                .output_ext
                .clone()
                .or(file.output_ext)
                .unwrap_or(defaults.output_ext),
            download_only_metadata: flag(args.download_only_metadata, file.download_only_metadata),
            dry_run: args.dry_run,
            no_metadata: flag(args.no_metadata, file.no_metadata),
            no_file_storage: flag(args.no_file_storage, file.no_file_storage),
            no_spaces: flag(args.no_spaces, file.no_spaces),
            retry,
        }
        .normalized();

        let credentials = match (
            args.client_id.clone().or(file.client_id),
            args.client_secret.clone().or(file.client_secret),
        ) {
            (Some(client_id), Some(client_secret)) => Some(Credentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        let hook = args
            .analysis_command
            .clone()
            .or(file.analysis_command)
            .filter(|command| !command.trim().is_empty())
            .map(|command| HookSettings {
                command,
                stdin: args.analysis_stdin.clone(),
            });

        Self {
            pipeline,
            credentials,
            hook,
            with_lyrics: flag(args.with_lyrics, file.with_lyrics),
        }
    }
}
