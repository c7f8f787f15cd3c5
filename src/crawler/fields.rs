//! Text rules for the catalog entry's descriptive lines
//!
//! All offsets are counted in characters, not bytes; labels and units on the
//! listing are CJK text.

use crate::record::Credits;
use crate::ExtractError;

/// Separates the director segment from the cast segment on the credits line
pub const CREDITS_SEPARATOR: &str = "\u{a0}\u{a0}\u{a0}";

/// Width of the label in front of each credits segment, e.g. `导演: `
pub const CREDIT_LABEL_CHARS: usize = 4;

/// Separates year, country and genre on the release line
pub const RELEASE_SEPARATOR: &str = "\u{a0}/\u{a0}";

/// Joins several release years into one field
pub const YEAR_JOINER: &str = "/";

/// Width of the unit label after the rating count, e.g. `人评价`
pub const RATING_COUNT_SUFFIX_CHARS: usize = 3;

/// Year, country and genre parsed from the release line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub year: String,
    pub country: String,
    pub genre: String,
}

/// Drops the fixed-width label in front of a credits segment
///
/// A segment no longer than the label yields an empty string.
pub fn strip_credit_label(segment: &str) -> String {
    if segment.chars().count() <= CREDIT_LABEL_CHARS {
        return String::new();
    }
    segment.chars().skip(CREDIT_LABEL_CHARS).collect()
}

/// Parses the credits line into director and cast
///
/// The line splits into at most two segments. Entries without a listed cast
/// have only the director segment and get an empty cast.
pub fn parse_credits(line: &str) -> Credits {
    let mut segments = line.trim().splitn(2, CREDITS_SEPARATOR);

    let director = segments.next().map(strip_credit_label).unwrap_or_default();
    let cast = segments.next().map(strip_credit_label).unwrap_or_default();

    Credits { director, cast }
}

/// Parses the release line into year, country and genre
///
/// The last two segments are always country and genre. Everything before them
/// is the year field, rejoined with `/` so that re-released films keep every
/// year, e.g. `1961 / 1964 / 1978 / 中国大陆 / 动画` gives year `1961/1964/1978`.
pub fn parse_release_line(line: &str) -> Result<ReleaseInfo, ExtractError> {
    let segments: Vec<&str> = line.trim().split(RELEASE_SEPARATOR).collect();

    if segments.len() < 2 {
        return Err(ExtractError::MalformedLine {
            field: "year/country/genre",
            line: line.to_string(),
        });
    }

    let (years, rest) = segments.split_at(segments.len() - 2);

    Ok(ReleaseInfo {
        year: years.join(YEAR_JOINER),
        country: rest[0].to_string(),
        genre: rest[1].to_string(),
    })
}

/// Drops the unit label from the end of the rating count text
///
/// Text no longer than the label yields an empty string.
pub fn strip_rating_count_suffix(text: &str) -> String {
    let text = text.trim();
    let len = text.chars().count();
    if len <= RATING_COUNT_SUFFIX_CHARS {
        return String::new();
    }
    text.chars().take(len - RATING_COUNT_SUFFIX_CHARS).collect()
}

/// Reads the first line of an attribute block, trimmed
pub fn first_line(text: &str) -> String {
    text.trim().lines().next().unwrap_or_default().trim().to_string()
}
