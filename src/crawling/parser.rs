//! HTML extraction rules for baochinhphu.vn pages.
//!
//! Every function takes the page source and returns owned data, so no parsed
//! document is ever held across an `.await`.

use crate::domain::model::{ArticleContent, ArticleListing, Category, PageMetadata};
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

const THUMBNAIL_SELECTORS: [&str; 4] = [
    "div.box-category-item img",
    "div.box-stream img",
    "div.timeline_list img",
    "div[class*=\"box\"] img",
];

const SAPO_SELECTORS: [&str; 4] = [
    "div.box-category-item p",
    "div.box-stream p",
    "div.timeline_list p",
    "p.sapo",
];

const TIME_SELECTORS: [&str; 3] = ["span.time", "span.date", "div.time"];

const ARTICLE_CONTAINERS: &str =
    "div[class*=\"box-category\"], div[class*=\"box-stream\"], div.timeline_list > div";

/// Content inside these elements is never part of the article text.
const STRIPPED_TAGS: [&str; 5] = ["figure", "figcaption", "script", "style", "iframe"];

const AUTHOR_EXCLUDED_KEYWORDS: [&str; 3] = ["nguồn", "ảnh", "theo"];
const CAPTION_PREFIXES: [&str; 3] = ["ảnh:", "nguồn:", "hình:"];
const MIN_PARAGRAPH_CHARS: usize = 20;
const MAX_AUTHOR_CHARS: usize = 50;

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::ScrapeError {
        url: String::new(),
        message: format!("invalid selector '{}': {}", css, e),
    })
}

fn date_regex() -> &'static Regex {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    DATE_RE.get_or_init(|| Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").expect("static date pattern"))
}

fn leading_dots_regex() -> &'static Regex {
    static DOTS_RE: OnceLock<Regex> = OnceLock::new();
    DOTS_RE.get_or_init(|| Regex::new(r"^\.+/").expect("static path pattern"))
}

/// Collapses all whitespace runs to single spaces and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn is_stripped<'a>(mut ancestors: impl Iterator<Item = ElementRef<'a>>) -> bool {
    ancestors.any(|a| STRIPPED_TAGS.contains(&a.value().name()))
}

/// Text of `element` without anything nested in a stripped tag.
fn visible_text(element: ElementRef<'_>) -> String {
    let parts: Vec<&str> = element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            if is_stripped(node.ancestors().filter_map(ElementRef::wrap)) {
                None
            } else {
                Some(&**text)
            }
        })
        .collect();
    collapse_whitespace(&parts.join(" "))
}

/// Makes `link` absolute against `base_url`.
///
/// Absolute http(s) links are returned as is, leading `./` or `../` segments
/// are dropped, everything else is appended to the base URL.
pub fn normalize_url(link: Option<&str>, base_url: &str) -> Option<String> {
    let link = link?.trim();
    if link.is_empty() {
        return None;
    }
    if link.starts_with("http://") || link.starts_with("https://") {
        return Some(link.to_string());
    }
    if let Some(rest) = link.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }

    let base = base_url.trim_end_matches('/');
    let link = leading_dots_regex().replace(link, "");
    if link.starts_with('/') {
        Some(format!("{}{}", base, link))
    } else {
        Some(format!("{}/{}", base, link))
    }
}

/// First `d/m/yyyy` style date in `text`.
pub fn extract_date_from_text(text: &str) -> Option<String> {
    date_regex().find(text).map(|m| m.as_str().to_string())
}

/// Main menu categories from the home page.
pub fn parse_main_categories(
    html: &str,
    base_url: &str,
    excluded: &[String],
) -> Result<Vec<Category>> {
    let document = Html::parse_document(html);
    let menu_sel = selector("div.header__menu")?;
    let ul_sel = selector("ul")?;
    let nav_link_sel = selector("a.nav-link")?;
    let anchor_sel = selector("a")?;

    let Some(menu) = document.select(&menu_sel).next() else {
        return Ok(Vec::new());
    };
    let Some(list) = menu.select(&ul_sel).next() else {
        return Ok(Vec::new());
    };

    let mut categories = Vec::new();
    for li in list
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "li")
    {
        let anchor = li
            .select(&nav_link_sel)
            .next()
            .or_else(|| li.select(&anchor_sel).next());
        let Some(anchor) = anchor else { continue };

        let title = element_text(anchor);
        let href = anchor.value().attr("href").unwrap_or_default();
        if title.is_empty() || href.is_empty() {
            continue;
        }
        let lowered = title.to_lowercase();
        if excluded.iter().any(|e| e.to_lowercase() == lowered) {
            continue;
        }
        if let Some(link) = normalize_url(Some(href), base_url) {
            categories.push(Category { title, link });
        }
    }

    Ok(categories)
}

/// Sub-categories from the breadcrumb of a category page, deduplicated by link.
pub fn parse_subcategories(html: &str, category_url: &str, base_url: &str) -> Result<Vec<Category>> {
    let document = Html::parse_document(html);
    let breadcrumb_sel = selector("div.list__breadcrumb")?;
    let li_sel = selector("li")?;
    let anchor_sel = selector("a")?;

    let Some(breadcrumb) = document.select(&breadcrumb_sel).next() else {
        return Ok(Vec::new());
    };

    let mut seen = HashSet::new();
    let mut subcategories = Vec::new();
    for li in breadcrumb.select(&li_sel) {
        let Some(anchor) = li.select(&anchor_sel).next() else {
            continue;
        };
        let title = element_text(anchor);
        let href = anchor.value().attr("href").unwrap_or_default();
        if title.is_empty() || href.is_empty() || href == "/" || href == category_url {
            continue;
        }
        let Some(link) = normalize_url(Some(href), base_url) else {
            continue;
        };
        if link == category_url {
            continue;
        }
        if seen.insert(link.clone()) {
            subcategories.push(Category { title, link });
        }
    }

    Ok(subcategories)
}

fn first_image_src(
    scope: ElementRef<'_>,
    selectors: &[Selector],
    base_url: &str,
) -> Option<String> {
    for sel in selectors {
        if let Some(img) = scope.select(sel).next() {
            let src = img
                .value()
                .attr("src")
                .filter(|s| !s.is_empty())
                .or_else(|| img.value().attr("data-src"));
            if let Some(url) = normalize_url(src, base_url) {
                return Some(url);
            }
        }
    }
    None
}

// The first matching selector decides, even when its text is empty.
fn first_text(scope: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    for sel in selectors {
        if let Some(found) = scope.select(sel).next() {
            let text = element_text(found);
            return if text.is_empty() { None } else { Some(text) };
        }
    }
    None
}

/// Article entries of a listing page. Only the first `2 * max` containers
/// are examined and at most `max` entries are returned.
pub fn parse_article_listings(
    html: &str,
    base_url: &str,
    max_articles: Option<usize>,
) -> Result<Vec<ArticleListing>> {
    let document = Html::parse_document(html);
    let container_sel = selector(ARTICLE_CONTAINERS)?;
    let anchor_sel = selector("a[href]")?;
    let heading_sel = selector("h2, h3")?;
    let thumbnail_sels = THUMBNAIL_SELECTORS
        .iter()
        .map(|css| selector(css))
        .collect::<Result<Vec<_>>>()?;
    let sapo_sels = SAPO_SELECTORS
        .iter()
        .map(|css| selector(css))
        .collect::<Result<Vec<_>>>()?;
    let time_sels = TIME_SELECTORS
        .iter()
        .map(|css| selector(css))
        .collect::<Result<Vec<_>>>()?;

    let scan_limit = max_articles.map_or(usize::MAX, |m| m.saturating_mul(2));
    let mut seen = HashSet::new();
    let mut articles = Vec::new();

    for container in document.select(&container_sel).take(scan_limit) {
        let Some(anchor) = container.select(&anchor_sel).find(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| href.ends_with(".htm"))
        }) else {
            continue;
        };

        let title_el = container.select(&heading_sel).next().unwrap_or(anchor);
        let title = element_text(title_el);
        let Some(link) = normalize_url(anchor.value().attr("href"), base_url) else {
            continue;
        };
        if title.is_empty() || !seen.insert(link.clone()) {
            continue;
        }

        articles.push(ArticleListing {
            title,
            link,
            thumbnail: first_image_src(container, &thumbnail_sels, base_url),
            sapo: first_text(container, &sapo_sels),
            published_time: first_text(container, &time_sels),
        });

        if max_articles.is_some_and(|max| articles.len() >= max) {
            break;
        }
    }

    Ok(articles)
}

/// Body text and page metadata of an article. `None` when the page has no
/// `div.detail-content` or no text blocks in it.
pub fn parse_article_content(
    html: &str,
    base_url: &str,
    source_name: &str,
) -> Result<Option<ArticleContent>> {
    let document = Html::parse_document(html);
    let content_sel = selector("div.detail-content")?;
    let block_sel = selector("p, h2, h3")?;
    let bold_sel = selector("b")?;
    let detail_time_sel = selector("div.detail-time")?;
    let span_time_sel = selector("span.time")?;
    let image_sel = selector("div.detail-content img, div.detail-image img")?;

    let Some(content_div) = document.select(&content_sel).next() else {
        return Ok(None);
    };

    let mut blocks: Vec<ElementRef<'_>> = content_div
        .select(&block_sel)
        .filter(|b| !is_stripped(b.ancestors().filter_map(ElementRef::wrap)))
        .collect();
    if blocks.is_empty() {
        return Ok(None);
    }

    let mut author = None;
    if let Some(last) = blocks.last() {
        if let Some(bold) = last.select(&bold_sel).next() {
            let text = element_text(bold);
            let lowered = text.to_lowercase();
            if text.chars().count() < MAX_AUTHOR_CHARS
                && !AUTHOR_EXCLUDED_KEYWORDS.iter().any(|kw| lowered.contains(kw))
            {
                author = Some(text);
                blocks.pop();
            }
        }
    }

    let paragraphs: Vec<String> = blocks
        .into_iter()
        .map(visible_text)
        .filter(|text| {
            if text.chars().count() <= MIN_PARAGRAPH_CHARS {
                return false;
            }
            let head: String = text.to_lowercase().chars().take(50).collect();
            !CAPTION_PREFIXES.iter().any(|kw| head.contains(kw))
        })
        .collect();

    let time_el = document
        .select(&detail_time_sel)
        .next()
        .or_else(|| document.select(&span_time_sel).next());
    let (date, published_time) = match time_el {
        Some(el) => {
            let text = element_text(el);
            (extract_date_from_text(&text), Some(text))
        }
        None => (None, None),
    };

    let featured_image = document
        .select(&image_sel)
        .find(|img| !is_stripped(img.ancestors().filter_map(ElementRef::wrap)))
        .and_then(|img| {
            let src = img
                .value()
                .attr("src")
                .filter(|s| !s.is_empty())
                .or_else(|| img.value().attr("data-src"));
            normalize_url(src, base_url)
        });

    Ok(Some(ArticleContent {
        text: paragraphs.join("\n"),
        metadata: PageMetadata {
            author,
            source: source_name.to_string(),
            date,
            published_time,
            featured_image,
        },
    }))
}
