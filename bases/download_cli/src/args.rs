// bases/download_cli/src/args.rs
use clap::{ArgGroup, Parser};
use song_pipeline::OverwritePolicy;
use song_primitives::{Collection, CollectionKind};
use std::path::PathBuf;

/// Download songs from catalog links, video links or search queries
///
/// Exactly one of --song, --list, --playlist, --album or --username is
/// required. Collections are written to a list file that --list can then
/// download and resume.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "songsync", author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["song", "list", "playlist", "album", "username"])
))]
pub struct Args {
    /// Download a single song (catalog URL, video URL or search text)
    #[arg(short, long)]
    pub song: Option<String>,

    /// Download every song in a list file, one reference per line
    #[arg(short, long)]
    pub list: Option<PathBuf>,

    /// Write the tracks of a playlist to a list file
    #[arg(short, long)]
    pub playlist: Option<String>,

    /// Write the tracks of an album to a list file
    #[arg(short, long)]
    pub album: Option<String>,

    /// Write the tracks of all public playlists of a user to a list file
    #[arg(short, long)]
    pub username: Option<String>,

    /// List file for --playlist, --album and --username
    #[arg(long)]
    pub write_to: Option<PathBuf>,

    /// Destination folder
    #[arg(short, long)]
    pub folder: Option<PathBuf>,

    /// What to do with songs that already exist: prompt, force or skip
    #[arg(long)]
    pub overwrite: Option<OverwritePolicy>,

    /// File name template, e.g. "{artist}/{album}/{track_name}"
    #[arg(long)]
    pub file_format: Option<String>,

    /// Video search query template
    #[arg(long)]
    pub search_format: Option<String>,

    /// Extension of the downloaded audio
    #[arg(short, long)]
    pub input_ext: Option<String>,

    /// Extension to convert to
    #[arg(short, long)]
    pub output_ext: Option<String>,

    /// Only download songs the catalog has metadata for
    #[arg(short = 'm', long)]
    pub download_only_metadata: bool,

    /// Show what would be downloaded without touching the disk
    #[arg(short, long)]
    pub dry_run: bool,

    /// Don't write tags into downloaded files
    #[arg(short, long)]
    pub no_metadata: bool,

    /// Don't append to metadata.jsonl
    #[arg(long)]
    pub no_file_storage: bool,

    /// Replace spaces in file names with underscores
    #[arg(long)]
    pub no_spaces: bool,

    /// Pause after requeueing a failed song, in milliseconds
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,

    /// Give up on a song after this many failed attempts in one run
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Command run on every downloaded file; {input} and {output} are
    /// replaced by the file and its analysis output path
    #[arg(long)]
    pub analysis_command: Option<String>,

    /// Text piped to the analysis command's stdin
    #[arg(long, env = "SONGSYNC_ANALYSIS_STDIN", hide_env_values = true)]
    pub analysis_stdin: Option<String>,

    /// Look up lyrics for tagging
    #[arg(long)]
    pub with_lyrics: bool,

    /// TOML file with defaults for any of these options
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info",
          value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,

    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Show the cause chain of errors
    #[arg(short, long)]
    pub verbose: bool,
}

/// What the user asked to process
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Song(String),
    List(PathBuf),
    Collection(Collection),
}

impl Args {
    /// The selected input mode
    ///
    /// Fails when a collection argument can't be parsed.
    pub fn input(&self) -> Result<Input, String> {
        if let Some(song) = &self.song {
            return Ok(Input::Song(song.clone()));
        }
        if let Some(list) = &self.list {
            return Ok(Input::List(list.clone()));
        }

        let (kind, raw) = match (&self.playlist, &self.album, &self.username) {
            (Some(playlist), _, _) => (CollectionKind::Playlist, playlist),
            (_, Some(album), _) => (CollectionKind::Album, album),
            (_, _, Some(username)) => (CollectionKind::User, username),
            _ => return Err("no input given".to_string()),
        };
        Collection::parse(kind, raw)
            .map(Input::Collection)
            .ok_or_else(|| format!("'{raw}' is not a valid {kind}"))
    }

    /// Default tracing directives for `--log-level`
    pub fn log_filter(&self) -> String {
        let level = &self.log_level;
        [
            "songsync",
            "song_pipeline",
            "catalog_client",
            "media_downloader",
            "track_tags",
        ]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
    }
}
