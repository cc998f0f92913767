use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::folio::types::RenderedPage;

/// File for `url` under `output_root` with the given extension.
/// `/posts/til/x` → `<root>/posts/til/x.<ext>`; `/` → `<root>/index.<ext>`.
pub fn output_path(output_root: &Path, url: &str, ext: &str) -> PathBuf {
    let key = url.trim_matches('/');
    let key = if key.is_empty() { "index" } else { key };
    let rel = Path::new(key);

    let mut path = output_root.to_path_buf();
    if let Some(parent) = rel.parent() {
        path = path.join(parent);
    }
    let filename = rel
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| key.to_string());
    path.join(format!("{filename}.{ext}"))
}

pub fn ensure_output_root(output_root: &Path) -> io::Result<()> {
    fs::create_dir_all(output_root)
}

pub fn write_output(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Write the page's HTML and a JSON sidecar carrying its frontmatter.
/// Returns the HTML path.
pub fn write_page(output_root: &Path, page: &RenderedPage) -> io::Result<PathBuf> {
    let html_path = output_path(output_root, &page.url, "html");
    write_output(&html_path, &page.html)?;

    let json = serde_json::to_string_pretty(page).map_err(io::Error::other)?;
    write_output(&output_path(output_root, &page.url, "json"), &json)?;
    Ok(html_path)
}
