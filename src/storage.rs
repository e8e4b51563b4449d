use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid regex"));

/// Reduce an uploaded filename to a flat ASCII name safe to join onto the upload
/// directory. Returns an empty string when nothing usable remains.
pub fn sanitize_filename(name: &str) -> String {
    let flattened: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Longest stored name; matches the `documents.filename` column.
pub const MAX_STORED_NAME: usize = 200;

/// Longest extension kept when a name has to be shortened.
const MAX_EXTENSION: usize = 16;

/// Stored name: timestamp prefix plus the sanitized original, so repeated uploads of
/// the same file do not collide. Long names lose the end of their stem, never the
/// extension.
pub fn stored_filename(original: &str, now: DateTime<Local>) -> String {
    let safe = sanitize_filename(original);
    let safe = if safe.is_empty() { "upload".to_string() } else { safe };
    let prefix = now.format("%Y%m%d_%H%M%S_").to_string();
    let budget = MAX_STORED_NAME.saturating_sub(prefix.len());
    format!("{prefix}{}", shorten(&safe, budget))
}

/// Cut a sanitized (ASCII) name down to `budget` bytes, keeping a short extension.
fn shorten(name: &str, budget: usize) -> String {
    if name.len() <= budget {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() < MAX_EXTENSION => {
            (stem, Some(ext))
        }
        _ => (name, None),
    };
    match ext {
        Some(ext) => {
            let keep = budget.saturating_sub(ext.len() + 1);
            format!("{}.{ext}", &stem[..keep.min(stem.len())])
        }
        None => stem[..budget.min(stem.len())].to_string(),
    }
}

pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of a stored file. Names with path separators or parent references are refused.
    pub fn path_for(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains(['/', '\\'])
            || filename == "."
            || filename == ".."
        {
            return None;
        }
        Some(self.root.join(filename))
    }

    pub async fn save(&self, original: &str, bytes: &[u8]) -> std::io::Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;
        let filename = stored_filename(original, Local::now());
        let path = self
            .path_for(&filename)
            .ok_or_else(|| std::io::Error::other("invalid stored filename"))?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "stored upload");
        Ok(filename)
    }

    pub async fn read(&self, filename: &str) -> std::io::Result<Vec<u8>> {
        let path = self
            .path_for(filename)
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))?;
        tokio::fs::read(path).await
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, filename: &str) -> std::io::Result<()> {
        let Some(path) = self.path_for(filename) else {
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Whether a stored file may be shown inline. Script-capable and unknown types are sent
/// as attachments.
pub fn is_inline_safe(filename: &str) -> bool {
    matches!(
        content_type(filename),
        "application/pdf" | "image/png" | "image/jpeg" | "image/gif" | "text/plain; charset=utf-8"
    )
}

/// Content type from the file extension, for inline viewing.
pub fn content_type(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "txt" | "md" => "text/plain; charset=utf-8",
        "csv" => "text/csv",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}
