//! Synced lyrics (LRC).

use reqwest::Client;
use tracing::{debug, warn};

/// One timed lyric line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    pub time_ms: u64,
    pub text: String,
}

/// Parse LRC text into lines sorted by time.
///
/// A line may carry several `[mm:ss.xx]` stamps and yields one entry per
/// stamp. Tag lines such as `[ar:Artist]` and anything without a valid stamp
/// are skipped.
pub fn parse_lrc(input: &str) -> Vec<LyricLine> {
    let mut lines = Vec::new();

    for raw in input.lines() {
        let mut rest = raw.trim();
        let mut stamps = Vec::new();

        while let Some(after_open) = rest.strip_prefix('[') {
            let Some(close) = after_open.find(']') else {
                break;
            };
            match parse_timestamp(&after_open[..close]) {
                Some(ms) => stamps.push(ms),
                None => break,
            }
            rest = &after_open[close + 1..];
        }

        let text = rest.trim();
        lines.extend(stamps.into_iter().map(|time_ms| LyricLine {
            time_ms,
            text: text.to_string(),
        }));
    }

    // Stable, so lines sharing a stamp keep file order
    lines.sort_by_key(|line| line.time_ms);
    lines
}

/// `mm:ss`, `mm:ss.xx` or `mm:ss.xxx` to milliseconds
fn parse_timestamp(stamp: &str) -> Option<u64> {
    let (minutes, seconds) = stamp.split_once(':')?;
    let minutes: u64 = minutes.trim().parse().ok()?;

    let (whole, fraction) = match seconds.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (seconds, ""),
    };
    let whole: u64 = whole.trim().parse().ok()?;
    if whole >= 60 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    // Scale to milliseconds: ".5" and ".50" are both 500
    let millis = fraction
        .chars()
        .chain(std::iter::repeat('0'))
        .take(3)
        .collect::<String>()
        .parse::<u64>()
        .ok()?;

    Some(minutes * 60_000 + whole * 1000 + millis)
}

/// Index of the line being sung at `position_ms`, if any has started.
pub fn active_line(lines: &[LyricLine], position_ms: u64) -> Option<usize> {
    lines
        .partition_point(|line| line.time_ms <= position_ms)
        .checked_sub(1)
}

/// Download and parse an LRC file; any failure yields no lines.
pub async fn fetch_lyrics(http: &Client, url: &str) -> Vec<LyricLine> {
    if url.trim().is_empty() {
        return Vec::new();
    }

    let response = match http.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(url, error = %e, "Failed to fetch lyrics");
            return Vec::new();
        }
    };

    if !response.status().is_success() {
        warn!(url, status = response.status().as_u16(), "Lyrics not available");
        return Vec::new();
    }

    match response.text().await {
        Ok(body) => {
            let lines = parse_lrc(&body);
            debug!(url, lines = lines.len(), "Fetched lyrics");
            lines
        }
        Err(e) => {
            warn!(url, error = %e, "Failed to read lyrics");
            Vec::new()
        }
    }
}
