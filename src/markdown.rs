//! Markdown rendering seam for free-text descriptions and notes.

use std::fmt;
use std::sync::Arc;

/// Converts Markdown text into the markup shown by the documentation UI.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, text: &str) -> String;
}

/// Optional renderer shared by every document built from one configuration.
#[derive(Clone, Default)]
pub struct Markdown {
    renderer: Option<Arc<dyn MarkdownRenderer>>,
}

impl Markdown {
    pub fn new(renderer: Arc<dyn MarkdownRenderer>) -> Self {
        Self {
            renderer: Some(renderer),
        }
    }

    /// Renders `text` when a renderer is configured; otherwise returns it untouched.
    /// Common indentation is stripped before rendering.
    pub fn as_markdown(&self, text: Option<String>) -> Option<String> {
        match (&self.renderer, text) {
            (Some(renderer), Some(text)) => Some(renderer.render(&strip_heredoc(&text))),
            (_, text) => text,
        }
    }
}

impl fmt::Debug for Markdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Markdown")
            .field("enabled", &self.renderer.is_some())
            .finish()
    }
}

/// Removes the smallest common leading indentation from every line.
pub fn strip_heredoc(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    text.split_inclusive('\n')
        .map(|line| {
            let leading = line.len() - line.trim_start_matches([' ', '\t']).len();
            &line[leading.min(indent)..]
        })
        .collect()
}
