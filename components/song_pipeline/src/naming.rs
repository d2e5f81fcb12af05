// components/song_pipeline/src/naming.rs
//! File names and search queries rendered from catalog metadata.
//!
//! Templates use `{field}` placeholders; the recognised fields are listed
//! in [`FIELDS`]. An unknown or empty field renders as an empty string, and
//! braces that don't form a placeholder are copied through unchanged.
use sanitize_filename::sanitize;
use song_primitives::ResolvedMetadata;
use std::path::{Component, Path};

pub const FIELDS: [&str; 12] = [
    "track_name",
    "artist",
    "album",
    "album_artist",
    "genre",
    "disc_number",
    "duration",
    "year",
    "original_date",
    "track_number",
    "total_tracks",
    "isrc",
];

fn field_value(metadata: &ResolvedMetadata, field: &str) -> Option<String> {
    let primary_artist = || metadata.primary_artist().map(|artist| artist.name.clone());
    match field {
        "track_name" => Some(metadata.name.clone()),
        "artist" | "album_artist" => primary_artist(),
        "album" => Some(metadata.album.name.clone()),
        "genre" => metadata.genre.clone(),
        "disc_number" => Some(metadata.disc_number.to_string()),
        "duration" => Some(metadata.duration.as_secs().to_string()),
        "year" => metadata.year.clone(),
        "original_date" => metadata.release_date.clone(),
        "track_number" => Some(metadata.track_number.to_string()),
        "total_tracks" => metadata.total_tracks.map(|total| total.to_string()),
        "isrc" => metadata.isrc.clone(),
        _ => None,
    }
}

fn render_with(template: &str, value_of: impl Fn(&str) -> String) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_placeholder(&after[..close]) => {
                rendered.push_str(&value_of(&after[..close]));
                rest = &after[close + 1..];
            }
            _ => {
                rendered.push('{');
                rest = after;
            }
        }
    }
    rendered.push_str(rest);
    rendered
}

fn is_placeholder(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

/// Render a naming template into a file name (without extension)
///
/// Field values are sanitized so that only the template itself can
/// introduce path separators. Directory levels that render empty are
/// dropped, so `{genre}/{track_name}` without a genre stays relative.
pub fn render_filename(template: &str, metadata: &ResolvedMetadata) -> String {
    let rendered = render_with(template, |field| {
        field_value(metadata, field)
            .map(sanitize)
            .unwrap_or_default()
    });
    rendered
        .split('/')
        .filter(|segment| !segment.trim().is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether `candidate` names a file strictly inside the destination folder
///
/// Rejects empty names, absolute paths and any `.`/`..` component.
pub fn stays_inside(candidate: &str) -> bool {
    !candidate.trim().is_empty()
        && Path::new(candidate)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

/// Render the video-platform search query for a catalog track
pub fn render_query(template: &str, metadata: &ResolvedMetadata) -> String {
    render_with(template, |field| field_value(metadata, field).unwrap_or_default())
        .trim()
        .to_string()
}

/// A rendered name with nothing to identify the song, such as `" - "`
pub fn is_degenerate(name: &str) -> bool {
    name.trim().is_empty() || !name.chars().any(char::is_alphanumeric)
}

/// Strip characters that are illegal in file names
pub fn sanitize_title(title: &str) -> String {
    sanitize(title).trim().to_string()
}

/// Turn a video title into a catalog search query
///
/// Lowercases and replaces punctuation with spaces so decorations such as
/// `[Official Video]` don't dominate the search.
pub fn title_to_query(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The name an artifact will be stored under, relative to the destination
/// folder and without extension
pub fn candidate_filename(
    template: &str,
    metadata: Option<&ResolvedMetadata>,
    raw_title: &str,
    no_spaces: bool,
) -> String {
    let rendered = metadata
        .map(|metadata| render_filename(template, metadata))
        .filter(|name| !is_degenerate(name));

    let name = rendered.unwrap_or_else(|| sanitize_title(raw_title));
    if no_spaces {
        name.replace(' ', "_")
    } else {
        name
    }
}
