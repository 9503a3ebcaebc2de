//! HTML fragment builder.
//!
//! Tag and attribute names are `&'static str`, so only literal markup can be
//! opened. Dynamic content goes through [`Markup::text`] or an attribute value
//! and is escaped. [`Markup::raw`] is the one place that writes unescaped HTML.

use serde::Deserialize;

/// How interpolated text content is written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    /// Escape `&`, `<` and `>` in text content.
    #[default]
    Escaped,
    /// Write text content verbatim, for hosts whose fields already hold HTML.
    /// Attribute values are still escaped.
    Trusted,
}

#[derive(Debug)]
pub struct Markup {
    buf: String,
    text_mode: TextMode,
}

impl Markup {
    pub fn new(text_mode: TextMode) -> Self {
        Self {
            buf: String::new(),
            text_mode,
        }
    }

    pub fn with_capacity(text_mode: TextMode, capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            text_mode,
        }
    }

    pub fn open(&mut self, tag: &'static str) -> &mut Self {
        self.buf.push('<');
        self.buf.push_str(tag);
        self.buf.push('>');
        self
    }

    /// Open `tag` with a single attribute; the value is attribute-escaped.
    pub fn open_with(&mut self, tag: &'static str, name: &'static str, value: &str) -> &mut Self {
        self.buf.push('<');
        self.buf.push_str(tag);
        self.buf.push(' ');
        self.buf.push_str(name);
        self.buf.push_str("=\"");
        self.buf
            .push_str(&html_escape::encode_double_quoted_attribute(value));
        self.buf.push_str("\">");
        self
    }

    pub fn close(&mut self, tag: &'static str) -> &mut Self {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
        self
    }

    /// Text content, escaped unless the builder is in [`TextMode::Trusted`].
    pub fn text(&mut self, text: &str) -> &mut Self {
        match self.text_mode {
            TextMode::Escaped => {
                self.buf.push_str(&html_escape::encode_text(text));
            }
            TextMode::Trusted => {
                self.raw(text);
            }
        }
        self
    }

    /// `<tag>text</tag>`
    pub fn element(&mut self, tag: &'static str, text: &str) -> &mut Self {
        self.open(tag).text(text).close(tag)
    }

    /// Unescaped HTML. Every caller is either a literal or trusted host text.
    pub fn raw(&mut self, html: &str) -> &mut Self {
        self.buf.push_str(html);
        self
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}
