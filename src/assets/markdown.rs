//! Markdown to sanitized HTML.
//!
//! Rendered HTML goes through an allow-list sanitizer: safe inline markup
//! such as `<b>`, `<em>`, tables and links survives, scripts, event handlers
//! and unsafe URL schemes do not.

use pulldown_cmark::{html, Options, Parser};

/// Render markdown bytes (lossily decoded as UTF-8) to HTML.
pub fn to_html(source: &[u8]) -> String {
    let text = String::from_utf8_lossy(source);
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES;

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(&text, options));

    ammonia::Builder::default().clean(&out).to_string()
}
