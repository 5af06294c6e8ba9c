//! Article layout strategies and content-region cleaning.
//!
//! The archive has been through at least three template generations, each
//! marking the article body differently. [`LAYOUTS`] lists one
//! [`LayoutStrategy`] per generation, newest first; the first strategy that
//! matches a page wins. A new generation is supported by appending a strategy.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};

/// One way of locating the article body in a page.
#[derive(Debug)]
pub struct LayoutStrategy {
    /// Short name used in logs.
    pub name: &'static str,
    selector: Selector,
}

impl LayoutStrategy {
    fn new(name: &'static str, css: &str) -> Self {
        Self {
            name,
            selector: Selector::parse(css).expect("layout selector is valid CSS"),
        }
    }

    /// Return the first element this strategy recognizes as the content region.
    pub fn locate<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.selector).next()
    }
}

/// Known layouts, in priority order.
pub static LAYOUTS: Lazy<Vec<LayoutStrategy>> = Lazy::new(|| {
    vec![
        LayoutStrategy::new("schema-article-body", r#"div[itemprop="articleBody"]"#),
        LayoutStrategy::new("b-article-content", "div.b-article__content"),
        LayoutStrategy::new("post-content", "div.post-content"),
    ]
});

/// Find the content region using the first matching strategy.
pub fn locate_content(document: &Html) -> Option<(&'static str, ElementRef<'_>)> {
    LAYOUTS
        .iter()
        .find_map(|layout| layout.locate(document).map(|el| (layout.name, el)))
}

/// Elements whose whole subtree is dropped before text extraction.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "img", "picture", "video", "audio", "iframe", "figure",
    "aside",
];

const NOISE_CLASSES: &[&str] = &["gallery"];

/// Elements that start and end a line of text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "footer", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hr", "li", "main", "ol", "p", "pre", "section", "table",
    "td", "th", "tr", "ul",
];

fn is_noise(element: &scraper::node::Element) -> bool {
    NOISE_TAGS.contains(&element.name())
        || element.classes().any(|c| NOISE_CLASSES.contains(&c))
}

/// Extract readable text from a content region.
///
/// Media, scripts, galleries and asides are skipped. Block-level elements and
/// `<br>` break lines; each line is trimmed and blank lines are dropped.
pub fn clean_text(region: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(region, &mut raw);

    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_collapsed(out, text),
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let el = child_el.value();
                if is_noise(el) {
                    continue;
                }
                if el.name() == "br" {
                    out.push('\n');
                    continue;
                }

                let block = BLOCK_TAGS.contains(&el.name());
                if block {
                    out.push('\n');
                }
                collect_text(child_el, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

// Source-formatting whitespace inside a text node collapses to one space.
fn push_collapsed(out: &mut String, text: &str) {
    for c in text.chars() {
        if c.is_whitespace() {
            if !(out.is_empty() || out.ends_with(' ') || out.ends_with('\n')) {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
}

/// Whitespace-normalized text of an element, on a single line.
pub fn inline_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(html: &str) -> String {
        let document = Html::parse_document(html);
        let (_, el) = locate_content(&document).unwrap();
        clean_text(el)
    }

    #[test]
    fn test_each_layout_is_found() {
        let pages = [
            (r#"<div itemprop="articleBody">x</div>"#, "schema-article-body"),
            (r#"<div class="b-article__content">x</div>"#, "b-article-content"),
            (r#"<div class="post-content">x</div>"#, "post-content"),
        ];
        for (html, expected) in pages {
            let document = Html::parse_document(html);
            let (name, _) = locate_content(&document).unwrap();
            assert_eq!(name, expected);
        }
    }

    #[test]
    fn test_first_layout_wins() {
        let html = r#"
            <div class="post-content">old</div>
            <div itemprop="articleBody">new</div>
        "#;
        assert_eq!(region(html), "new");
    }

    #[test]
    fn test_no_layout() {
        let document = Html::parse_document("<div class='content'>x</div>");
        assert!(locate_content(&document).is_none());
    }

    #[test]
    fn test_clean_text_drops_noise() {
        let html = r#"<div itemprop="articleBody">
            <p>First paragraph.</p>
            <script>var ad = 1;</script>
            <style>.x { color: red }</style>
            <figure><img src="a.png"><figcaption>Caption</figcaption></figure>
            <div class="gallery"><p>Photo 1</p></div>
            <aside>Read also</aside>
            <iframe src="https://video"></iframe>
            <p>Second <b>bold</b> paragraph.</p>
        </div>"#;
        assert_eq!(region(html), "First paragraph.\nSecond bold paragraph.");
    }

    #[test]
    fn test_clean_text_line_breaks() {
        let html = r#"<div class="post-content">Intro<br>after break
            <ul><li>one</li><li>two</li></ul>
            <p>
                wrapped
                source text
            </p></div>"#;
        assert_eq!(region(html), "Intro\nafter break\none\ntwo\nwrapped source text");
    }

    #[test]
    fn test_inline_text() {
        let document = Html::parse_document("<h1>  Big\n  <span>news</span> </h1>");
        let h1 = document.select(&Selector::parse("h1").unwrap()).next().unwrap();
        assert_eq!(inline_text(h1), "Big news");
    }
}
