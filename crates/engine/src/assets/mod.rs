mod audio;
mod bitmap;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use audio::{AudioOutput, SoundKey};
pub use bitmap::{load_bitmap, Bitmap};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found at {path}")]
    Missing { path: PathBuf },
    #[error("failed to decode asset {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssetError {
    pub fn path(&self) -> &Path {
        match self {
            AssetError::Missing { path }
            | AssetError::Decode { path, .. }
            | AssetError::Io { path, .. } => path,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AssetError::Missing { .. })
    }

    pub(crate) fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            AssetError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            AssetError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}
