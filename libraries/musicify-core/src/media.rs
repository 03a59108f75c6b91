//! Small helpers around uploaded media and external track references

/// Format a duration as `minutes:seconds`, seconds unpadded (125 -> "2:5").
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{}", total / 60, total % 60)
}

/// Pull the track id out of an `open.spotify.com/track/<id>` URL.
///
/// Album, playlist and artist links yield `None`.
pub fn extract_spotify_track_id(url: &str) -> Option<String> {
    let url = url.trim();
    let (_, rest) = url.split_once("spotify.com/")?;
    let mut segments = rest.split('/').filter(|s| !s.is_empty());
    let mut kind = segments.next()?;
    // Localized links look like /intl-de/track/<id>
    if kind.starts_with("intl-") {
        kind = segments.next()?;
    }
    if kind != "track" {
        return None;
    }
    let id = segments.next()?;
    let id = id.split(['?', '#']).next().unwrap_or_default();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(id.to_string())
}
