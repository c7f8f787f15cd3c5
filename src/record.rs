//! The persisted unit of a crawl
//!
//! A [`MovieRecord`] always carries all ten fields; an empty string is a valid
//! value, absence is not. The column order defined here is the contract shared
//! by the header row and every data row.

use crate::config::HeaderStyle;

/// Number of columns in every row
pub const FIELD_COUNT: usize = 10;

/// Column names in persisted order
pub const ENGLISH_HEADER: [&str; FIELD_COUNT] = [
    "title",
    "link",
    "director",
    "cast",
    "year",
    "country",
    "genre",
    "rating",
    "rating_count",
    "quote",
];

/// The same columns under the listing's own names
pub const CHINESE_HEADER: [&str; FIELD_COUNT] = [
    "电影名称",
    "电影链接",
    "导演",
    "主演",
    "上映时间",
    "国家",
    "类型",
    "评分",
    "评价人数",
    "短评",
];

/// Returns the header row for the given style
pub fn header(style: HeaderStyle) -> [&'static str; FIELD_COUNT] {
    match style {
        HeaderStyle::English => ENGLISH_HEADER,
        HeaderStyle::Chinese => CHINESE_HEADER,
    }
}

/// Director and cast, from either the catalog line or the detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credits {
    pub director: String,

    /// Empty when the entry lists no cast
    pub cast: String,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRecord {
    pub title: String,

    /// Detail page URL as it appears in the listing
    pub link: String,

    pub director: String,
    pub cast: String,

    /// Release year; re-released films carry several years joined with `/`
    pub year: String,

    pub country: String,
    pub genre: String,

    /// Decimal text exactly as displayed, not parsed
    pub rating: String,

    pub rating_count: String,
    pub quote: String,
}

impl MovieRecord {
    /// Replaces the catalog-derived credits, keeping every other field
    pub fn with_credits(self, credits: Credits) -> Self {
        Self {
            director: credits.director,
            cast: credits.cast,
            ..self
        }
    }

    /// Fields in persisted column order
    pub fn as_row(&self) -> [&str; FIELD_COUNT] {
        [
            &self.title,
            &self.link,
            &self.director,
            &self.cast,
            &self.year,
            &self.country,
            &self.genre,
            &self.rating,
            &self.rating_count,
            &self.quote,
        ]
    }
}
