// Explorer filter criteria - text search, amenity tags and viewport bounds

use crate::models::{AmenitySet, BoundingBox, PublicPreserve};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    text: String,
    pub amenities: AmenitySet,
    pub viewport: Option<BoundingBox>,
    pub viewport_filtering: bool,
}

impl FilterCriteria {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Stored lowercased and trimmed so matching is case-insensitive
    pub fn set_text(&mut self, text: &str) {
        self.text = text.trim().to_lowercase();
    }

    /// Drop the text and amenity filters. Viewport state follows the map, not the filter panel.
    pub fn clear(&mut self) {
        self.text.clear();
        self.amenities.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.amenities.is_empty()
            && !(self.viewport_filtering && self.viewport.is_some())
    }

    pub fn matches(&self, preserve: &PublicPreserve) -> bool {
        self.matches_text(preserve) && self.matches_amenities(preserve) && self.matches_viewport(preserve)
    }

    fn matches_text(&self, preserve: &PublicPreserve) -> bool {
        if self.text.is_empty() {
            return true;
        }
        if preserve.title.to_lowercase().contains(&self.text) {
            return true;
        }
        preserve
            .description
            .as_deref()
            .map(|d| strip_markup(d).to_lowercase().contains(&self.text))
            .unwrap_or(false)
    }

    fn matches_amenities(&self, preserve: &PublicPreserve) -> bool {
        self.amenities.is_subset(&preserve.amenities)
    }

    fn matches_viewport(&self, preserve: &PublicPreserve) -> bool {
        match (self.viewport_filtering, &self.viewport) {
            (true, Some(bbox)) => preserve
                .location
                .as_ref()
                .map(|loc| bbox.contains(loc))
                .unwrap_or(false),
            _ => true,
        }
    }
}

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "pre",
    "section", "table", "td", "th", "tr", "ul",
];

fn is_block_tag(tag: &str) -> bool {
    let name: String = tag
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCK_TAGS.contains(&name.as_str())
}

/// Text content of a rich-text description: tags dropped, common entities decoded.
/// Block-level tags separate words; inline tags do not. A `<` that does not open a
/// tag is kept as text.
pub fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();
    while let Some(ch) = chars.next() {
        let opens_tag = ch == '<'
            && chars
                .peek()
                .is_some_and(|c| c.is_ascii_alphabetic() || *c == '/' || *c == '!');
        if !opens_tag {
            text.push(ch);
            continue;
        }

        let mut tag = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == '>' {
                closed = true;
                break;
            }
            tag.push(c);
        }
        if !closed {
            text.push('<');
            text.push_str(&tag);
            break;
        }
        if is_block_tag(&tag) {
            text.push(' ');
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
