//! Mapping an uploaded media reference onto a readable local file.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

/// The media control's value: public URL plus the host's attachment id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileRef {
    #[serde(deserialize_with = "crate::settings::null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "crate::settings::attachment_id")]
    pub id: Option<u64>,
}

impl FileRef {
    pub fn new(url: impl Into<String>, id: Option<u64>) -> Self {
        Self {
            url: url.into(),
            id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
    }
}

/// Finds the local file behind an uploaded attachment.
pub trait AttachmentResolver {
    fn attached_file(&self, file: &FileRef) -> Option<PathBuf>;
}

impl<F> AttachmentResolver for F
where
    F: Fn(&FileRef) -> Option<PathBuf>,
{
    fn attached_file(&self, file: &FileRef) -> Option<PathBuf> {
        self(file)
    }
}

/// Resolves attachment URLs against a local uploads directory.
///
/// `https://example.com/wp-content/uploads/2024/05/prices.xlsx` with root
/// `/srv/uploads` resolves to `/srv/uploads/2024/05/prices.xlsx`.
#[derive(Debug, Clone)]
pub struct UploadsDirResolver {
    root: PathBuf,
}

impl UploadsDirResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The part of `url` below the uploads directory, as a relative path.
    ///
    /// Returns `None` for URLs with no path or with `.`/`..` segments.
    pub fn relative_path(url: &str) -> Option<PathBuf> {
        let url = url.split(['?', '#']).next().unwrap_or_default();
        let path = match url.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map_or("", |(_, path)| path),
            None => url,
        };
        let path = path
            .rsplit_once("/uploads/")
            .map_or(path, |(_, below)| below)
            .trim_start_matches("uploads/");

        let mut relative = PathBuf::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None) => relative.push(part),
                _ => return None,
            }
        }

        if relative.as_os_str().is_empty() {
            None
        } else {
            Some(relative)
        }
    }
}

impl AttachmentResolver for UploadsDirResolver {
    fn attached_file(&self, file: &FileRef) -> Option<PathBuf> {
        let relative = Self::relative_path(&file.url)?;
        Some(self.root.join(relative))
    }
}

/// Attachment id → file path table, for hosts that track uploads by id.
#[derive(Debug, Clone, Default)]
pub struct AttachmentMap {
    files: HashMap<u64, PathBuf>,
}

impl AttachmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u64, path: impl Into<PathBuf>) -> Option<PathBuf> {
        self.files.insert(id, path.into())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AttachmentResolver for AttachmentMap {
    fn attached_file(&self, file: &FileRef) -> Option<PathBuf> {
        file.id.and_then(|id| self.files.get(&id).cloned())
    }
}
