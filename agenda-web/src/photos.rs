//! Contact photo storage
//!
//! Photos are written to the uploads directory under a random name and
//! referenced from the contact row by their public path (`/uploads/<file>`).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{WebError, WebResult};

/// URL prefix under which the uploads directory is served
pub const PUBLIC_PREFIX: &str = "/uploads/";

#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store image bytes and return the public path
    ///
    /// The format is sniffed from the content, not the client's file name.
    pub async fn save(&self, bytes: &[u8]) -> WebResult<String> {
        let ext = image_extension(bytes).ok_or(WebError::UnsupportedPhoto)?;
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        info!("Stored photo {} ({} bytes)", file_name, bytes.len());
        Ok(format!("{}{}", PUBLIC_PREFIX, file_name))
    }

    /// Delete a stored photo by its public path
    ///
    /// Already-missing files and paths outside the uploads directory are
    /// ignored.
    pub async fn remove(&self, public_path: &str) -> WebResult<()> {
        let Some(file_name) = stored_file_name(public_path) else {
            warn!("Ignoring photo path outside uploads: {}", public_path);
            return Ok(());
        };

        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => {
                info!("Removed photo {}", file_name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Photo already gone: {}", file_name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// [`remove`](Self::remove), logging instead of failing
    pub async fn remove_quietly(&self, public_path: &str) {
        if let Err(e) = self.remove(public_path).await {
            warn!("Failed to remove photo {}: {}", public_path, e);
        }
    }
}

/// File extension for accepted image types
pub fn image_extension(bytes: &[u8]) -> Option<&'static str> {
    match infer::get(bytes)?.mime_type() {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Bare file name from a public path, rejecting anything that could escape
/// the uploads directory
fn stored_file_name(public_path: &str) -> Option<&str> {
    let name = public_path.strip_prefix(PUBLIC_PREFIX)?;
    let safe = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..");
    safe.then_some(name)
}
