//! Source file identity and discovery.
//!
//! A [`SourceFile`] is an input path plus the names derived from it. It is
//! created once by the caller (or by [`discover_gifs`]) and never mutated.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GifSplitError;

/// One input animation, identified by its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    base_name: String,
    display_name: String,
}

impl SourceFile {
    /// Wrap `path` and derive its names.
    ///
    /// The base name is the file name with its last extension removed
    /// (`clip.final.gif` -> `clip.final`); the display name is the full file
    /// name.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let base_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| display_name.clone());

        Self {
            path,
            base_name,
            display_name,
        }
    }

    /// Path of the file as given by the caller.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without its extension; used to name artifacts.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// File name with extension; used in status and error messages.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Directory containing the file, or `.` for bare file names.
    pub fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// List the `.gif` files (case-insensitive extension) directly inside `dir`,
/// sorted by path.
///
/// # Errors
///
/// Returns [`GifSplitError::Io`] if the directory cannot be read.
pub fn discover_gifs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, GifSplitError> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && has_gif_extension(&path) {
            found.push(path);
        }
    }
    found.sort();
    log::debug!("Discovered {} GIF file(s) in {:?}", found.len(), dir.as_ref());
    Ok(found)
}

fn has_gif_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_strip_only_last_extension() {
        let source = SourceFile::new("/tmp/anim/clip.final.gif");
        assert_eq!(source.base_name(), "clip.final");
        assert_eq!(source.display_name(), "clip.final.gif");
        assert_eq!(source.parent_dir(), PathBuf::from("/tmp/anim"));
    }

    #[test]
    fn bare_file_name_has_current_dir_parent() {
        let source = SourceFile::new("dance.gif");
        assert_eq!(source.parent_dir(), PathBuf::from("."));
        assert_eq!(source.base_name(), "dance");
    }

    #[test]
    fn gif_extension_is_case_insensitive() {
        assert!(has_gif_extension(Path::new("a.GIF")));
        assert!(has_gif_extension(Path::new("a.gif")));
        assert!(!has_gif_extension(Path::new("a.png")));
        assert!(!has_gif_extension(Path::new("gif")));
    }
}
