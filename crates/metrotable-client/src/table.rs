//! Heuristic extraction of city/country/population rows from a rendered
//! wiki table.
//!
//! Columns are classified from the header row by keyword, with fixed
//! fallback positions when no header matches. Only the first `<table>` in
//! the fragment is read.

use std::sync::LazyLock;

use metrotable_core::locator::PageIdentity;
use metrotable_core::models::{Population, TableRecord};
use metrotable_core::traits::TableParser;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const NAME_KEYWORDS: &[&str] = &["area", "city", "name"];
const COUNTRY_KEYWORDS: &[&str] = &["country"];
const POPULATION_KEYWORDS: &[&str] = &["population", "metropopulation"];

const DEFAULT_NAME_COLUMN: usize = 1;
const DEFAULT_COUNTRY_COLUMN: usize = 3;
const DEFAULT_POPULATION_COLUMN: usize = 4;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Failed to parse table selector - this is a bug"));

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("Failed to parse link selector - this is a bug"));

/// Meaning of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnRole {
    Name,
    Country,
    Population,
    Unclassified,
}

/// Column position of each role, built once per table from its header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub country: usize,
    pub population: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME_COLUMN,
            country: DEFAULT_COUNTRY_COLUMN,
            population: DEFAULT_POPULATION_COLUMN,
        }
    }
}

impl ColumnMap {
    /// Classify header texts by case-insensitive keyword containment.
    ///
    /// When several headers match the same role the last one wins. A role
    /// nobody matches keeps its default position.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut map = Self::default();
        let (mut name, mut country, mut population) = (None, None, None);

        for (position, header) in headers.iter().enumerate() {
            let header = header.as_ref().to_lowercase();
            if contains_any(&header, NAME_KEYWORDS) {
                name = Some(position);
            }
            if contains_any(&header, COUNTRY_KEYWORDS) {
                country = Some(position);
            }
            if contains_any(&header, POPULATION_KEYWORDS) {
                population = Some(position);
            }
        }

        map.name = name.unwrap_or(map.name);
        map.country = country.unwrap_or(map.country);
        map.population = population.unwrap_or(map.population);
        map
    }

    /// Role of a column. A position claimed by several roles resolves
    /// Name first, then Country, then Population.
    pub(crate) fn role_of(&self, position: usize) -> ColumnRole {
        if position == self.name {
            ColumnRole::Name
        } else if position == self.country {
            ColumnRole::Country
        } else if position == self.population {
            ColumnRole::Population
        } else {
            ColumnRole::Unclassified
        }
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// [`TableParser`] over rendered MediaWiki HTML, backed by `scraper`.
#[derive(Debug, Clone, Default)]
pub struct HtmlTableParser;

impl HtmlTableParser {
    pub fn new() -> Self {
        Self
    }
}

impl TableParser for HtmlTableParser {
    fn parse(&self, html: &str, page: &PageIdentity) -> Vec<TableRecord> {
        parse_table(html, page)
    }
}

/// Extract one record per data row of the first table in `html`.
///
/// Row 0 is the header. Later rows without any `<td>` are not data rows.
pub fn parse_table(html: &str, page: &PageIdentity) -> Vec<TableRecord> {
    let fragment = Html::parse_fragment(html);
    let Some(table) = fragment.select(&TABLE_SELECTOR).next() else {
        tracing::debug!("No table in section fragment");
        return Vec::new();
    };

    let mut rows = own_rows(table).into_iter();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };

    let headers: Vec<String> = child_elements(header_row, "th")
        .map(|cell| cell_text(cell).trim().to_string())
        .collect();
    let columns = ColumnMap::from_headers(&headers);
    tracing::debug!(?headers, ?columns, "Classified table columns");

    let wiki_base = page.wiki_base();
    let fallback_url = page.fallback_url();

    rows.filter_map(|row| {
        let cells: Vec<ElementRef> = child_elements(row, "td").collect();
        if cells.is_empty() {
            return None;
        }
        Some(extract_record(&cells, &columns, &wiki_base, &fallback_url))
    })
    .collect()
}

/// Direct child elements of `parent` with the given tag name.
fn child_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}

/// Rows belonging to `table` itself, in document order. Rows of tables
/// nested inside its cells are excluded.
fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(child_elements(child, "tr")),
            _ => {}
        }
    }
    rows
}

fn extract_record(
    cells: &[ElementRef],
    columns: &ColumnMap,
    wiki_base: &str,
    fallback_url: &str,
) -> TableRecord {
    let mut name = None;
    let mut country = None;
    let mut population = None;
    let mut url = None;

    for (position, cell) in cells.iter().enumerate() {
        match columns.role_of(position) {
            ColumnRole::Name => {
                name = first_line(*cell);
                url = cell
                    .select(&LINK_SELECTOR)
                    .find(|link| !in_nested_table(*link, *cell))
                    .and_then(|link| link.value().attr("href"))
                    .and_then(|href| resolve_href(wiki_base, href));
            }
            ColumnRole::Country => country = first_line(*cell),
            ColumnRole::Population => population = first_line(*cell).map(|text| parse_population(&text)),
            ColumnRole::Unclassified => {}
        }
    }

    TableRecord {
        name,
        country,
        population,
        url: url.unwrap_or_else(|| fallback_url.to_string()),
    }
}

/// Text of a cell, skipping any table nested inside it.
fn cell_text(cell: ElementRef) -> String {
    let mut text = String::new();
    push_text(cell, &mut text);
    text
}

fn push_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if child.value().name() != "table" {
                push_text(child, out);
            }
        }
    }
}

fn in_nested_table(element: ElementRef, cell: ElementRef) -> bool {
    element
        .ancestors()
        .take_while(|node| node.id() != cell.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "table")
}

/// Cell text up to the first line break, trimmed; `None` when empty.
fn first_line(cell: ElementRef) -> Option<String> {
    let text = cell_text(cell);
    let line = text.split('\n').next().unwrap_or_default().trim();
    (!line.is_empty()).then(|| line.to_string())
}

/// Absolute URL for a link in the name cell.
fn resolve_href(wiki_base: &str, href: &str) -> Option<String> {
    let href = href.split('\n').next().unwrap_or_default().trim();
    if href.is_empty() {
        return None;
    }

    match Url::parse(wiki_base).and_then(|base| base.join(href)) {
        Ok(url) => Some(url.to_string()),
        Err(_) => Some(format!("{wiki_base}{href}")),
    }
}

/// Number with `,` separators stripped, or the text unchanged when it does
/// not start with a number. Trailing footnote markers are ignored.
pub fn parse_population(text: &str) -> Population {
    let stripped = text.replace(',', "");
    match leading_number(stripped.trim()) {
        Some(value) => Population::from_number(value),
        None => Population::Text(text.to_string()),
    }
}

/// Longest numeric prefix (`[+-]digits[.digits][e[+-]digits]`) of `text`.
fn leading_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    text[..end].parse().ok().filter(|value: &f64| value.is_finite())
}
