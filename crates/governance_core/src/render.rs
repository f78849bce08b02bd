/// Tags an allow-list sanitizer may keep in a proposal body: the usual
/// safe inline and block subset plus `img`.
pub const SAFE_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "code", "dd", "div", "dl", "dt", "em",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "li", "nl", "ol", "p", "pre", "s",
    "span", "strike", "strong", "sub", "sup", "table", "tbody", "td", "th", "thead", "tr", "u",
    "ul",
];

/// Turns untrusted description markup into markup that is safe to embed.
///
/// Implementations must drop scripts, event-handler attributes, inline
/// styles and any tag outside `SAFE_TAGS`.
pub trait HtmlSanitizer {
    fn sanitize(&self, candidate: &str) -> String;
}

/// Keeps `SAFE_TAGS` and drops everything else, including scripts with
/// their content, `on*` handlers and `style` attributes.
pub struct AllowListSanitizer {
    cleaner: ammonia::Builder<'static>,
}

impl AllowListSanitizer {
    pub fn new() -> Self {
        let mut cleaner = ammonia::Builder::default();
        cleaner.tags(SAFE_TAGS.iter().copied().collect());
        Self { cleaner }
    }
}

impl Default for AllowListSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlSanitizer for AllowListSanitizer {
    fn sanitize(&self, candidate: &str) -> String {
        self.cleaner.clean(candidate).to_string()
    }
}

/// Escapes every markup character, so no tag survives at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapingSanitizer;

impl HtmlSanitizer for EscapingSanitizer {
    fn sanitize(&self, candidate: &str) -> String {
        html_escape(candidate)
    }
}

/// A title and body that have been through an `HtmlSanitizer`.
/// The fields are private so the only way in is `new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedDescription {
    title: String,
    body: String,
}

impl SanitizedDescription {
    pub fn new(title: &str, body_html_candidate: &str, sanitizer: &dyn HtmlSanitizer) -> Self {
        Self {
            title: html_escape(title),
            body: sanitizer.sanitize(body_html_candidate),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Presents a sanitized description. Renderers never see raw markup.
pub trait RichTextRenderer {
    type Output;

    fn render(&self, description: &SanitizedDescription) -> Self::Output;
}

pub fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
