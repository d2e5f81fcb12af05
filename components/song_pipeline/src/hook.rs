// components/song_pipeline/src/hook.rs
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Analysis command is empty")]
    EmptyCommand,

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },
}

/// Post-processing step run on every downloaded artifact
#[async_trait]
pub trait AnalysisHook: Send + Sync {
    async fn analyse(&self, artifact: &Path) -> Result<(), HookError>;
}

/// Appended to an artifact's file name to name its analysis output
pub const ANALYSIS_SUFFIX: &str = ".analysis.json";

/// Where an analysis of `artifact` is written
pub fn analysis_output(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_owned();
    name.push(ANALYSIS_SUFFIX);
    PathBuf::from(name)
}

/// Runs an external program on each artifact
///
/// `{input}` and `{output}` in the arguments are replaced with the artifact
/// path and its [`analysis_output`] path. Arguments are split on whitespace;
/// quoting is not supported.
#[derive(Debug, Clone)]
pub struct CommandHook {
    program: String,
    args: Vec<String>,
    stdin: Option<String>,
}

impl CommandHook {
    pub fn parse(command_line: &str) -> Result<Self, HookError> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words.next().ok_or(HookError::EmptyCommand)?;
        Ok(Self {
            program,
            args: words.collect(),
            stdin: None,
        })
    }

    /// Text written to the command's stdin, such as an API key
    pub fn with_stdin(mut self, stdin: Option<String>) -> Self {
        self.stdin = stdin;
        self
    }

    fn args_for(&self, artifact: &Path) -> Vec<String> {
        let input = artifact.to_string_lossy();
        let output = analysis_output(artifact);
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }
}

#[async_trait]
impl AnalysisHook for CommandHook {
    async fn analyse(&self, artifact: &Path) -> Result<(), HookError> {
        let args = self.args_for(artifact);
        debug!(program = %self.program, ?args, "running analysis command");

        let spawn_error = |source: std::io::Error| HookError::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(if self.stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        if let (Some(text), Some(mut stdin)) = (&self.stdin, child.stdin.take()) {
            stdin.write_all(text.as_bytes()).await.map_err(spawn_error)?;
            stdin.write_all(b"\n").await.map_err(spawn_error)?;
        }

        let status = child.wait().await.map_err(spawn_error)?;
        if !status.success() {
            return Err(HookError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}
