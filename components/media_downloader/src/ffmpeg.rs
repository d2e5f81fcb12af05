// components/media_downloader/src/ffmpeg.rs
use crate::types::{TranscodeError, Transcoder};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

const TOOL: &str = "ffmpeg";

/// Transcoder backed by the `ffmpeg` executable
///
/// The binary is looked up on every call so a missing installation shows
/// up as `TranscodeError::BinaryNotFound` rather than failing construction.
#[derive(Debug, Default, Clone)]
pub struct Ffmpeg;

#[async_trait]
impl Transcoder for Ffmpeg {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        working_dir: &Path,
    ) -> Result<(), TranscodeError> {
        if extension(input) == extension(output) {
            debug!(input = %input.display(), "same container, nothing to transcode");
            return Ok(());
        }

        let program = which::which(TOOL).map_err(|_| TranscodeError::BinaryNotFound(TOOL))?;
        let args = ffmpeg_args(input, output);
        debug!(?args, "running ffmpeg");

        let result = Command::new(program)
            .args(&args)
            .current_dir(working_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => TranscodeError::BinaryNotFound(TOOL),
                _ => TranscodeError::IoError(e),
            })?;

        if !result.status.success() {
            return Err(TranscodeError::Failed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn codec_args(input_ext: &str, output_ext: &str) -> &'static [&'static str] {
    match output_ext {
        "mp3" => &["-codec:a", "libmp3lame", "-b:a", "192k"],
        "flac" => &["-codec:a", "flac"],
        "opus" => &["-codec:a", "libopus", "-b:a", "160k"],
        "ogg" => &["-codec:a", "libvorbis", "-q:a", "5"],
        "wav" => &["-codec:a", "pcm_s16le"],
        "m4a" if input_ext == "m4a" => &["-codec:a", "copy"],
        "m4a" => &["-codec:a", "aac", "-b:a", "192k"],
        _ => &[],
    }
}

fn ffmpeg_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-nostdin", "-hide_banner", "-loglevel", "error", "-i"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(input.as_os_str().to_owned());
    args.push("-vn".into());
    args.extend(
        codec_args(&extension(input), &extension(output))
            .iter()
            .map(OsString::from),
    );
    args.push(output.as_os_str().to_owned());
    args
}
