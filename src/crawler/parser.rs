//! HTML extraction of catalog entries
//!
//! A catalog page holds up to 25 `.item` entries. Each entry yields one
//! [`MovieRecord`] or an [`ExtractError`] confined to that entry; the rest of
//! the page keeps going.

use crate::crawler::fields::{parse_credits, parse_release_line, strip_rating_count_suffix};
use crate::record::MovieRecord;
use crate::ExtractError;
use scraper::html::Select;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// A fetched catalog page, alive for one fetch + extract cycle
pub struct CatalogPage {
    /// URL the markup was fetched from
    pub url: Url,

    document: Html,
}

impl CatalogPage {
    /// Parses fetched markup into a page
    pub fn parse(url: Url, markup: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(markup),
        }
    }

    pub fn document(&self) -> &Html {
        &self.document
    }
}

/// Compiled selectors for the catalog entry layout
pub struct ItemExtractor {
    item: Selector,
    title: Selector,
    link: Selector,
    info: Selector,
    rating: Selector,
    star_spans: Selector,
    quote: Selector,
}

/// Index of the rating count among the `.star` spans
const RATING_COUNT_SPAN: usize = 3;

impl ItemExtractor {
    /// Compiles the entry selectors
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            item: selector(".item")?,
            title: selector(".title")?,
            link: selector(".hd a")?,
            info: selector(".bd p")?,
            rating: selector(".rating_num")?,
            star_spans: selector(".star span")?,
            quote: selector(".quote span")?,
        })
    }

    /// Lazily extracts every entry on a page, in listing order
    ///
    /// The sequence is single-pass; extracting again means calling this again
    /// on the same document.
    ///
    /// # Example
    ///
    /// ```
    /// use douban_top250::crawler::ItemExtractor;
    /// use scraper::Html;
    ///
    /// let extractor = ItemExtractor::new().unwrap();
    /// let document = Html::parse_document("<html><body></body></html>");
    /// assert_eq!(extractor.extract(&document).count(), 0);
    /// ```
    pub fn extract<'a>(&'a self, document: &'a Html) -> Items<'a> {
        Items {
            extractor: self,
            entries: document.select(&self.item),
        }
    }

    /// Extracts one entry
    ///
    /// # Fields
    ///
    /// | Field | Source | When missing |
    /// |-------|--------|--------------|
    /// | title | first `.title` | error |
    /// | link | `href` of the heading anchor | error |
    /// | director, cast | first line of `.bd p` | error |
    /// | year, country, genre | second line of `.bd p` | error |
    /// | rating | `.rating_num`, may be blank | error |
    /// | rating count | fourth `.star span`, unit label dropped | error |
    /// | quote | `.quote span` | empty string |
    pub fn extract_item(&self, item: ElementRef<'_>) -> Result<MovieRecord, ExtractError> {
        let title = first_text(item, &self.title).ok_or(ExtractError::MissingField {
            field: "title",
        })?;

        let link = item
            .select(&self.link)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or(ExtractError::MissingField { field: "link" })?
            .to_string();

        let info = item
            .select(&self.info)
            .next()
            .ok_or(ExtractError::MissingField { field: "info" })?;
        let mut lines = block_lines(info).into_iter();
        let credits_line = lines
            .next()
            .ok_or(ExtractError::MissingField { field: "credits" })?;
        let release_line = lines.next().ok_or(ExtractError::MissingField {
            field: "year/country/genre",
        })?;

        let credits = parse_credits(&credits_line);
        let release = parse_release_line(&release_line)?;

        // A blank rating is kept as an empty field
        let rating = item
            .select(&self.rating)
            .next()
            .map(element_text)
            .ok_or(ExtractError::MissingField { field: "rating" })?;

        let rating_count = item
            .select(&self.star_spans)
            .nth(RATING_COUNT_SPAN)
            .map(|span| strip_rating_count_suffix(&element_text(span)))
            .ok_or(ExtractError::MissingField {
                field: "rating_count",
            })?;

        let quote = first_text(item, &self.quote).unwrap_or_default();

        Ok(MovieRecord {
            title,
            link,
            director: credits.director,
            cast: credits.cast,
            year: release.year,
            country: release.country,
            genre: release.genre,
            rating,
            rating_count,
            quote,
        })
    }
}

/// Lazy sequence of extracted entries for one page
pub struct Items<'a> {
    extractor: &'a ItemExtractor,
    entries: Select<'a, 'a>,
}

impl<'a> Iterator for Items<'a> {
    type Item = Result<MovieRecord, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries
            .next()
            .map(|entry| self.extractor.extract_item(entry))
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{}: {:?}", css, e)))
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first match, if any and not blank
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Splits a block into its non-blank lines, treating `<br>` as a line break
fn block_lines(block: ElementRef<'_>) -> Vec<String> {
    let mut text = String::new();
    for node in block.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => text.push('\n'),
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
