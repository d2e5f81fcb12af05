// components/song_primitives/src/media.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The video-platform item selected as the audio source for a song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedMedia {
    /// Stable platform identifier (video id)
    pub id: String,
    pub title: String,
    pub duration: Duration,
    /// Watchable URL for the item
    pub url: String,
}

impl MatchedMedia {
    /// Title shown to the operator, numbered when part of a list
    pub fn display_title(&self, number: Option<usize>) -> String {
        match number {
            Some(number) => format!("{}. {}", number, self.title),
            None => self.title.clone(),
        }
    }
}

/// Ranking hints passed to a video-platform search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchHints {
    /// Expected track length, from the catalog record
    pub duration: Option<Duration>,
}

/// Format a duration as `HH:MM:SS`
pub fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}
