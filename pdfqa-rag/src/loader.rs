//! Document loaders that turn files into [`Document`]s.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::document::Document;
use crate::error::{RagError, Result};

/// Files larger than this are rejected before parsing.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Metadata key holding the MIME type of the source file.
pub const CONTENT_TYPE_KEY: &str = "content_type";

/// Loads a file into one or more [`Document`]s.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load the file at `path`.
    async fn load(&self, path: &Path) -> Result<Vec<Document>>;

    /// Lower-case extensions this loader accepts, without the dot.
    fn supported_extensions(&self) -> &[&str];
}

/// Check the file exists and is within the size limit.
async fn check_file(path: &Path, max_size: u64) -> Result<PathBuf> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        RagError::ConfigError(format!("document '{}' is not readable: {e}", path.display()))
    })?;
    if !metadata.is_file() {
        return Err(RagError::ConfigError(format!("'{}' is not a file", path.display())));
    }
    if metadata.len() > max_size {
        return Err(RagError::DocumentError {
            source_path: path.display().to_string(),
            message: format!("file is {} bytes, limit is {max_size}", metadata.len()),
        });
    }
    Ok(path.to_path_buf())
}

fn document_stem(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("document").to_string()
}

/// Loads plain text and Markdown files as a single document.
#[derive(Debug, Clone)]
pub struct TextLoader {
    /// Maximum accepted file size in bytes.
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self { max_file_size: DEFAULT_MAX_FILE_SIZE }
    }
}

#[async_trait]
impl DocumentLoader for TextLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let path = check_file(path, self.max_file_size).await?;
        let source = path.display().to_string();

        let text = tokio::fs::read_to_string(&path).await.map_err(|e| RagError::DocumentError {
            source_path: source.clone(),
            message: e.to_string(),
        })?;

        let content_type = match path.extension().and_then(|e| e.to_str()) {
            Some("md" | "markdown") => "text/markdown",
            _ => "text/plain",
        };

        debug!(source = %source, bytes = text.len(), "loaded text document");
        Ok(vec![Document {
            id: document_stem(&path),
            text,
            source,
            page: None,
            metadata: HashMap::from([(CONTENT_TYPE_KEY.to_string(), content_type.to_string())]),
        }])
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md", "markdown"]
    }
}

/// Loads a PDF as one document per page.
///
/// Text extraction runs on a blocking thread.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone)]
pub struct PdfLoader {
    /// Maximum accepted file size in bytes.
    pub max_file_size: u64,
}

#[cfg(feature = "pdf")]
impl Default for PdfLoader {
    fn default() -> Self {
        Self { max_file_size: DEFAULT_MAX_FILE_SIZE }
    }
}

#[cfg(feature = "pdf")]
#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let path = check_file(path, self.max_file_size).await?;
        let source = path.display().to_string();
        let stem = document_stem(&path);

        let pdf_path = path.clone();
        let extracted =
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&pdf_path))
                .await
                .map_err(|e| RagError::DocumentError {
                    source_path: source.clone(),
                    message: format!("extraction task failed: {e}"),
                })?;
        let pages = extracted.map_err(|e| RagError::DocumentError {
            source_path: source.clone(),
            message: e.to_string(),
        })?;

        debug!(source = %source, pages = pages.len(), "extracted pdf text");
        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let page = i as u32 + 1;
                Document {
                    id: format!("{stem}-p{page}"),
                    text,
                    source: source.clone(),
                    page: Some(page),
                    metadata: HashMap::from([(
                        CONTENT_TYPE_KEY.to_string(),
                        "application/pdf".to_string(),
                    )]),
                }
            })
            .collect())
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

/// Pick a loader by file extension.
///
/// `.pdf` needs the `pdf` feature; `.txt`, `.md` and `.markdown` are always
/// available. Anything else is a configuration error.
pub fn loader_for_path(path: &Path) -> Result<Box<dyn DocumentLoader>> {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);

    let mut loaders: Vec<Box<dyn DocumentLoader>> = Vec::new();
    #[cfg(feature = "pdf")]
    loaders.push(Box::new(PdfLoader::default()));
    loaders.push(Box::new(TextLoader::default()));

    let Some(extension) = extension else {
        return Err(RagError::ConfigError(format!(
            "cannot pick a loader for '{}': no file extension",
            path.display()
        )));
    };

    loaders
        .into_iter()
        .find(|loader| loader.supported_extensions().contains(&extension.as_str()))
        .ok_or_else(|| {
            RagError::ConfigError(format!(
                "unsupported document type '.{extension}' for '{}'",
                path.display()
            ))
        })
}
