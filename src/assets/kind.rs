//! The five built-in asset kinds.

use super::markdown;

/// A fixed asset rendering configuration.
///
/// Each kind owns a template helper name, an optional file extension, an HTML
/// fragment format with a URL slot and a content slot, and an optional
/// content post-processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Raw file contents, preceded by a comment naming the source.
    Paste,
    /// Contents wrapped in a `text/template` script block.
    Template,
    /// Markdown rendered to sanitized HTML.
    Markdown,
    /// Linked or bundled stylesheet.
    Stylesheet,
    /// Linked or bundled script.
    Script,
}

/// How a kind is emitted into a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Embedding {
    /// Contents are read and written into the page.
    Inline,
    /// The page references the file (or a bundle of files) by URL.
    Reference,
}

impl AssetKind {
    pub const ALL: [AssetKind; 5] = [
        AssetKind::Paste,
        AssetKind::Template,
        AssetKind::Markdown,
        AssetKind::Stylesheet,
        AssetKind::Script,
    ];

    /// Template helper name.
    pub fn name(self) -> &'static str {
        match self {
            AssetKind::Paste => "paste",
            AssetKind::Template => "tpl",
            AssetKind::Markdown => "md",
            AssetKind::Stylesheet => "css",
            AssetKind::Script => "js",
        }
    }

    /// Native file extension, used for bundle names.
    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Paste | AssetKind::Template => "",
            AssetKind::Markdown => ".md",
            AssetKind::Stylesheet => ".css",
            AssetKind::Script => ".js",
        }
    }

    pub fn embedding(self) -> Embedding {
        match self {
            AssetKind::Paste | AssetKind::Template | AssetKind::Markdown => Embedding::Inline,
            AssetKind::Stylesheet | AssetKind::Script => Embedding::Reference,
        }
    }

    /// Mime type served for content of this kind.
    pub fn mime(self) -> &'static str {
        mime_for_extension(self.extension())
    }

    /// Fill the kind's HTML format with a URL and (possibly empty) content.
    pub fn fragment(self, url: &str, content: &str) -> String {
        match self {
            AssetKind::Paste => format!("<!-- {} -->\n{}", url, content),
            AssetKind::Template => {
                format!("<script type=\"text/template\" id=\"{}\">{}</script>", url, content)
            }
            AssetKind::Markdown => format!("<div class=\"md\" id=\"{}\">{}</div>", url, content),
            AssetKind::Stylesheet => format!("<link rel=\"stylesheet\" href=\"{}\">{}", url, content),
            AssetKind::Script => format!("<script src=\"{}\">{}</script>", url, content),
        }
    }

    /// Apply the kind's post-processor, if it has one.
    pub fn process(self, bytes: Vec<u8>) -> Vec<u8> {
        match self {
            AssetKind::Markdown => markdown::to_html(&bytes).into_bytes(),
            _ => bytes,
        }
    }
}

/// Guess a content type from an extension such as `".css"`.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.trim_start_matches('.') {
        "html" | "htm" | "tmpl" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "md" => "text/markdown; charset=utf-8",
        "svg" => "image/svg+xml",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
