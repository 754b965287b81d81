//! Deterministic artifact paths.
//!
//! Every request writes into two subdirectories of its destination:
//!
//! ```text
//! <work_dir>/<destDir>/full/<file name>.<ext>
//! <work_dir>/<destDir>/thumbnail/<file name>.<ext>
//! ```
//!
//! The extension is appended to the source's full file name, never swapped
//! for an existing one:
//! - `upload-1` → `upload-1.jpg`
//! - `a.jpeg` → `a.jpeg.jpg`
//! - `party.gif` → `party.gif.gif`

use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

/// Which of the two output subdirectories an artifact goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Full,
    Thumbnail,
}

impl Slot {
    pub fn dir_name(self) -> &'static str {
        match self {
            Slot::Full => "full",
            Slot::Thumbnail => "thumbnail",
        }
    }
}

/// Encoding of a written artifact, which fixes its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Jpeg,
    Png,
    Gif,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Jpeg => "jpg",
            ArtifactKind::Png => "png",
            ArtifactKind::Gif => "gif",
        }
    }
}

/// Append `kind`'s extension to `file_name`.
pub fn artifact_name(file_name: &OsStr, kind: ArtifactKind) -> OsString {
    let mut name = file_name.to_os_string();
    name.push(".");
    name.push(kind.extension());
    name
}

/// Check that a `destDir` stays inside the work directory.
///
/// Absolute paths and `..` components are rejected; the message says which.
pub fn validate_dest_dir(dest_dir: &str) -> Result<(), String> {
    let path = Path::new(dest_dir);
    if path.is_absolute() || dest_dir.starts_with('/') {
        return Err(format!("destDir must be relative: {dest_dir:?}"));
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(format!("destDir must not contain '..': {dest_dir:?}"));
    }
    Ok(())
}

/// Output locations for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    root: PathBuf,
    file_name: OsString,
}

impl OutputLayout {
    /// Layout for `source` under `work_dir/dest_dir`.
    ///
    /// Returns `None` when `source` has no file name component.
    pub fn new(work_dir: &Path, dest_dir: &str, source: &Path) -> Option<Self> {
        let file_name = source.file_name()?.to_os_string();
        Some(Self {
            root: work_dir.join(dest_dir),
            file_name,
        })
    }

    pub fn dir(&self, slot: Slot) -> PathBuf {
        self.root.join(slot.dir_name())
    }

    pub fn path(&self, slot: Slot, kind: ArtifactKind) -> PathBuf {
        self.dir(slot).join(artifact_name(&self.file_name, kind))
    }

    /// Create `full/` and `thumbnail/` if missing. Idempotent.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.dir(Slot::Full))?;
        std::fs::create_dir_all(self.dir(Slot::Thumbnail))
    }
}
