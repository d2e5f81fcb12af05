// components/media_downloader/src/selection.rs
use song_primitives::{MatchHints, MatchedMedia};
use std::time::Duration;

/// Initial allowed difference between candidate and expected duration
pub const DURATION_TOLERANCE: Duration = Duration::from_secs(10);
/// The tolerance is widened one second at a time up to this bound
pub const MAX_DURATION_TOLERANCE: Duration = Duration::from_secs(20);

/// Pick one candidate from search results in platform order
///
/// Without a duration hint the first result wins. With one, the first
/// result within the narrowest tolerance that admits anything wins.
pub fn select_candidate(candidates: Vec<MatchedMedia>, hints: &MatchHints) -> Option<MatchedMedia> {
    let Some(expected) = hints.duration else {
        return candidates.into_iter().next();
    };

    let mut tolerance = DURATION_TOLERANCE;
    while tolerance <= MAX_DURATION_TOLERANCE {
        if let Some(index) = candidates
            .iter()
            .position(|media| distance(media.duration, expected) <= tolerance)
        {
            return candidates.into_iter().nth(index);
        }
        tolerance += Duration::from_secs(1);
    }
    None
}

fn distance(a: Duration, b: Duration) -> Duration {
    if a > b {
        a - b
    } else {
        b - a
    }
}
