//! Document queries over fetched response bodies
//!
//! This module wraps `scraper` behind a small query surface so extractors only
//! deal with selectors, text and attributes:
//! - `Document::select` / `select_first` for CSS queries
//! - `Node::text` (trimmed), `Node::own_text` (direct text children only)
//! - `Node::attr` for attribute lookup
//!
//! Invalid selectors never panic; they simply match nothing.

use scraper::{ElementRef, Html, Selector};
use serde::de::DeserializeOwned;

/// A parsed HTML document
pub struct Document {
    html: Html,
}

/// An element within a parsed document
#[derive(Clone, Copy)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

/// Parses a CSS selector, logging and discarding invalid ones
fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!("Invalid selector '{}': {}", css, e);
            None
        }
    }
}

impl Document {
    /// Parses raw HTML text into a document
    ///
    /// # Example
    ///
    /// ```
    /// use algo_harvest::fetch::Document;
    ///
    /// let doc = Document::parse(r#"<div class="rating-number">1500</div>"#);
    /// let rating = doc.select_first("div.rating-number").map(|n| n.text());
    /// assert_eq!(rating.as_deref(), Some("1500"));
    /// ```
    pub fn parse(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// Returns every element matching the selector, in document order
    pub fn select(&self, css: &str) -> Vec<Node<'_>> {
        match selector(css) {
            Some(sel) => self
                .html
                .select(&sel)
                .map(|element| Node { element })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns the first element matching the selector
    pub fn select_first(&self, css: &str) -> Option<Node<'_>> {
        let sel = selector(css)?;
        self.html.select(&sel).next().map(|element| Node { element })
    }

    /// Returns all text in the document, concatenated
    pub fn text(&self) -> String {
        self.html.root_element().text().collect()
    }
}

impl<'a> Node<'a> {
    /// Returns the element's full text content, trimmed
    pub fn text(&self) -> String {
        self.raw_text().trim().to_string()
    }

    /// Returns the element's full text content, untrimmed
    pub fn raw_text(&self) -> String {
        self.element.text().collect()
    }

    /// Returns only the text nodes that are direct children of this element, trimmed
    pub fn own_text(&self) -> String {
        self.element
            .children()
            .filter_map(|child| child.value().as_text().map(|t| &**t))
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Returns an attribute value, if present
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Returns descendants matching the selector
    pub fn select(&self, css: &str) -> Vec<Node<'a>> {
        match selector(css) {
            Some(sel) => self
                .element
                .select(&sel)
                .map(|element| Node { element })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns the first descendant matching the selector
    pub fn select_first(&self, css: &str) -> Option<Node<'a>> {
        let sel = selector(css)?;
        self.element.select(&sel).next().map(|element| Node { element })
    }
}

/// Decodes a JSON response body into a typed payload
pub fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(text)
}
