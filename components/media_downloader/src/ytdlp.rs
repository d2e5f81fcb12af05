// components/media_downloader/src/ytdlp.rs
use crate::selection::select_candidate;
use crate::types::{DownloadError, VideoPlatform};
use async_trait::async_trait;
use serde::Deserialize;
use song_primitives::{MatchHints, MatchedMedia};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};
use url::Url;

const TOOL: &str = "yt-dlp";
const SEARCH_DEPTH: usize = 10;
/// Suffix of a download still in progress
pub const TEMP_SUFFIX: &str = ".temp";

/// Messages yt-dlp prints for items that exist as URLs but cannot be served
const UNAVAILABLE_MARKERS: [&str; 4] = [
    "Video unavailable",
    "Private video",
    "This video is not available",
    "has been removed",
];

/// Video platform backed by the `yt-dlp` executable
pub struct YtDlp {
    program: PathBuf,
    preferred_ext: String,
}

impl YtDlp {
    /// Locate `yt-dlp` on the `PATH`
    pub fn locate() -> Result<Self, DownloadError> {
        let program = which::which(TOOL).map_err(|_| DownloadError::DependencyNotFound(TOOL))?;
        Ok(Self {
            program,
            preferred_ext: "m4a".to_string(),
        })
    }

    /// Prefer audio streams in this container (e.g. `m4a`, `webm`)
    pub fn with_preferred_ext(mut self, ext: &str) -> Self {
        self.preferred_ext = ext.trim_start_matches('.').to_string();
        self
    }

    fn format_selector(&self) -> String {
        format!("bestaudio[ext={}]/bestaudio", self.preferred_ext)
    }

    async fn run(&self, args: &[&str]) -> Result<Output, DownloadError> {
        debug!(program = %self.program.display(), ?args, "running yt-dlp");
        Command::new(&self.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => DownloadError::DependencyNotFound(TOOL),
                _ => DownloadError::IoError(e),
            })
    }
}

#[async_trait]
impl VideoPlatform for YtDlp {
    async fn search(
        &self,
        query: &str,
        hints: &MatchHints,
    ) -> Result<Option<MatchedMedia>, DownloadError> {
        let target = format!("ytsearch{SEARCH_DEPTH}:{query}");
        let output = self
            .run(&["--flat-playlist", "--dump-json", "--no-warnings", &target])
            .await?;

        if !output.status.success() {
            return Err(DownloadError::ToolFailed {
                tool: TOOL,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let candidates = parse_entries(&output.stdout)?;
        debug!(query, count = candidates.len(), "search results");
        Ok(select_candidate(candidates, hints))
    }

    async fn fetch(&self, url: &str) -> Result<Option<MatchedMedia>, DownloadError> {
        let url = Url::parse(url).map_err(|e| DownloadError::InvalidUrl(e.to_string()))?;

        let output = self
            .run(&["--dump-json", "--no-download", "--no-playlist", "--no-warnings", url.as_str()])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if UNAVAILABLE_MARKERS.iter().any(|marker| stderr.contains(marker)) {
                warn!(%url, "video is not available");
                return Ok(None);
            }
            return Err(DownloadError::ToolFailed { tool: TOOL, stderr });
        }

        Ok(parse_entries(&output.stdout)?.into_iter().next())
    }

    async fn download(
        &self,
        media: &MatchedMedia,
        destination: &Path,
    ) -> Result<bool, DownloadError> {
        let partial = temp_path(destination);
        // yt-dlp treats `%` in output paths as template syntax
        let template = partial.to_string_lossy().replace('%', "%%");
        let format = self.format_selector();

        let output = self
            .run(&[
                "--format",
                &format,
                "--no-part",
                "--no-playlist",
                "--quiet",
                "--no-warnings",
                "--output",
                &template,
                &media.url,
            ])
            .await?;

        if !output.status.success() {
            warn!(
                video = %media.id,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "yt-dlp download failed"
            );
            return Ok(false);
        }

        tokio::fs::rename(&partial, destination).await?;
        Ok(true)
    }
}

fn temp_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

#[derive(Debug, Deserialize)]
struct YtDlpEntry {
    id: String,
    title: Option<String>,
    duration: Option<f64>,
    webpage_url: Option<String>,
    url: Option<String>,
}

impl From<YtDlpEntry> for MatchedMedia {
    fn from(entry: YtDlpEntry) -> Self {
        let url = entry
            .webpage_url
            .or(entry.url)
            .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", entry.id));
        MatchedMedia {
            title: entry.title.unwrap_or_else(|| entry.id.clone()),
            duration: entry
                .duration
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64)
                .unwrap_or_default(),
            id: entry.id,
            url,
        }
    }
}

/// Parse `--dump-json` output: one JSON object per line
fn parse_entries(stdout: &[u8]) -> Result<Vec<MatchedMedia>, DownloadError> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str::<YtDlpEntry>(line)
                .map(MatchedMedia::from)
                .map_err(|e| DownloadError::Parse {
                    tool: TOOL,
                    reason: e.to_string(),
                })
        })
        .collect()
}
