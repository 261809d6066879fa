//! HTML templates and the fragments spliced into them.

use std::path::PathBuf;

use crate::storage::{StoredFile, format_file_size};

pub const LOGIN_PAGE: &str = "index.html";
pub const HOME_PAGE: &str = "home.html";
pub const FILE_LIST_PAGE: &str = "file-list.html";
pub const UPLOAD_SUCCESS_PAGE: &str = "upload-success.html";
pub const ERROR_PAGE: &str = "error.html";

const FALLBACK_PAGE: &str = "<html><body><h1>Error loading page</h1></body></html>";

/// Reads templates from the web root and fills `${name}` placeholders.
///
/// Templates are read from disk on every render so they can be edited
/// while the server runs.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn render(&self, name: &str, vars: &[(&str, &str)]) -> String {
        let path = self.root.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(template) => substitute(&template, vars),
            Err(e) => {
                tracing::warn!(template = %path.display(), error = %e, "Failed to read template");
                FALLBACK_PAGE.to_string()
            }
        }
    }
}

/// Replaces every `${key}` in `template`. Unknown placeholders are kept.
///
/// ```
/// # use filedrop::templates::substitute;
/// let page = substitute("<p>${greeting}, ${name}</p>", &[("name", "bob"), ("greeting", "hi")]);
/// assert_eq!(page, "<p>hi, bob</p>");
/// ```
pub fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |page, (key, value)| {
        page.replace(&format!("${{{key}}}"), value)
    })
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// One `<li>` per stored file, linking to its download URL.
pub fn file_list_items(files: &[StoredFile]) -> String {
    files
        .iter()
        .map(|f| {
            format!(
                "<li><a class=\"file-link\" href=\"/files/{}\">{}</a><span class=\"file-size\"> ({})</span></li>",
                urlencoding::encode(&f.name),
                escape_html(&f.name),
                format_file_size(f.size)
            )
        })
        .collect()
}

pub fn error_fragment(message: &str) -> String {
    format!("<p class=\"error\">{}</p>", escape_html(message))
}
