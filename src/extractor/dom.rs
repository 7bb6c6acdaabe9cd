//! The extraction function that runs against a live page's document.
//!
//! Everything here is synchronous and pure over a parsed [`Html`] tree so a
//! page host can run it wherever it holds the document.

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Upper bound on page images returned by the local path.
pub const MAX_LOCAL_IMAGES: usize = 5;

// First match wins.
const ROOT_CANDIDATES: &[&str] = &["main", "article", "[role=\"main\"]", "body"];

const BOILERPLATE: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    "nav",
    "header",
    "footer",
    "aside",
    "[role=\"navigation\"]",
    "[role=\"banner\"]",
    "[role=\"contentinfo\"]",
    "[role=\"complementary\"]",
    ".advertisement",
    ".ad",
    ".ads",
    ".sidebar",
    ".comment",
    ".comments",
    ".social-share",
    ".share-buttons",
];

const LAZY_SOURCE_ATTRS: &[&str] = &["data-src", "data-lazy-src"];

static ROOT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| parse_all(ROOT_CANDIDATES));
static BOILERPLATE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| parse_all(BOILERPLATE));
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static ICON_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[rel*=\"icon\"]").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

fn parse_all(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
}

/// Scripts a page host knows how to run inside a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageScript {
    ExtractContent,
}

impl PageScript {
    pub fn run(&self, document: &Html, page_url: &Url) -> PageScrape {
        match self {
            Self::ExtractContent => scrape_document(document, page_url),
        }
    }
}

/// What the in-page script hands back to the extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageScrape {
    pub title: String,
    pub raw_content: String,
    pub images: Vec<String>,
    pub favicon: Option<String>,
}

pub fn scrape_document(document: &Html, page_url: &Url) -> PageScrape {
    let raw_content = main_content_root(document)
        .map(|root| collapse_whitespace(&visible_text(root)))
        .unwrap_or_default();

    PageScrape {
        title: document_title(document),
        raw_content,
        images: collect_images(document, page_url),
        favicon: resolve_favicon(document, page_url),
    }
}

fn main_content_root(document: &Html) -> Option<ElementRef<'_>> {
    ROOT_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
}

fn is_boilerplate(element: &ElementRef<'_>) -> bool {
    BOILERPLATE_SELECTORS.iter().any(|s| s.matches(element))
}

/// Text of `root`'s subtree with boilerplate descendants left out.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut text = String::new();
    let mut stack: Vec<_> = root.children().rev().collect();
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(node)
                    && is_boilerplate(&element)
                {
                    continue;
                }
                stack.extend(node.children().rev());
            }
            _ => {}
        }
    }
    text
}

pub fn collapse_whitespace(text: &str) -> String {
    let spaced = WHITESPACE_RUN.replace_all(text, " ");
    BLANK_LINES.replace_all(&spaced, "\n\n").trim().to_string()
}

fn document_title(document: &Html) -> String {
    document
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn collect_images(document: &Html, page_url: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();
    for img in document.select(&IMG) {
        let Some(src) = image_source(&img, page_url) else {
            continue;
        };
        // data: and blob: sources fall out here too
        if !src.starts_with("http") {
            continue;
        }
        if seen.insert(src.clone()) {
            images.push(src);
            if images.len() == MAX_LOCAL_IMAGES {
                break;
            }
        }
    }
    images
}

/// The first non-empty source of an `<img>`. Only `src` is resolved against
/// the page; lazy-loading attributes are taken as written.
fn image_source(img: &ElementRef<'_>, page_url: &Url) -> Option<String> {
    let element = img.value();
    if let Some(src) = element.attr("src").map(str::trim).filter(|s| !s.is_empty()) {
        return Some(
            page_url
                .join(src)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| src.to_string()),
        );
    }
    LAZY_SOURCE_ATTRS
        .iter()
        .filter_map(|attr| element.attr(attr))
        .map(str::trim)
        .find(|raw| !raw.is_empty())
        .map(str::to_string)
}

fn resolve_favicon(document: &Html, page_url: &Url) -> Option<String> {
    let href = document
        .select(&ICON_LINK)
        .filter_map(|link| link.value().attr("href"))
        .find(|href| !href.is_empty());

    match href {
        Some(href) => Some(
            page_url
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string()),
        ),
        None => page_url.join("/favicon.ico").ok().map(|u| u.to_string()),
    }
}
