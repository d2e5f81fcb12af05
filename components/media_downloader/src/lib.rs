// components/media_downloader/src/lib.rs
//! Video-platform search/download and audio transcoding.
//!
//! Both collaborators are traits so the download pipeline can be driven by
//! fakes in tests; `YtDlp` and `Ffmpeg` shell out to the real tools.
mod ffmpeg;
mod selection;
mod types;
mod ytdlp;

pub use ffmpeg::Ffmpeg;
pub use selection::{select_candidate, DURATION_TOLERANCE, MAX_DURATION_TOLERANCE};
pub use types::{DownloadError, TranscodeError, Transcoder, VideoPlatform};
pub use ytdlp::{YtDlp, TEMP_SUFFIX};
