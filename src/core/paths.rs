//! Layout of the working root.
//!
//! Every path is computed from an explicit root; nothing here consults the
//! process working directory.

use std::path::{Path, PathBuf};

/// Fixed name of the packaged per-variant archive.
pub const ARCHIVE_FILE: &str = "flutter-intellij.zip";

/// Directory name the assembled plugin is staged under before archiving.
pub const PLUGIN_DIR: &str = "flutter-intellij";

/// Variant declaration document.
pub fn product_matrix(root: &Path) -> PathBuf {
    root.join("product-matrix.json")
}

/// Cache root downloaded artifacts live under.
pub fn artifact_cache(root: &Path) -> PathBuf {
    root.join("artifacts")
}

/// Build output root, rebuilt in place for every variant.
pub fn build_root(root: &Path) -> PathBuf {
    root.join("build")
}

/// Compiled classes directory.
pub fn classes(root: &Path) -> PathBuf {
    build_root(root).join("classes")
}

/// Compiled classes for the host-studio integration sources.
pub fn studio_classes(root: &Path) -> PathBuf {
    build_root(root).join("studio")
}

/// Compiled test classes directory.
pub fn test_classes(root: &Path) -> PathBuf {
    build_root(root).join("test")
}

/// Staged plugin directory the packager assembles jars into.
pub fn plugin_dir(root: &Path) -> PathBuf {
    build_root(root).join(PLUGIN_DIR)
}

pub fn plugin_lib(root: &Path) -> PathBuf {
    plugin_dir(root).join("lib")
}

/// Raw descriptor template, excluded from resource copying.
pub fn descriptor_template(root: &Path) -> PathBuf {
    root.join("resources").join("META-INF").join("plugin.xml.template")
}

/// Checked-in descriptor refreshed by `gen`.
pub fn generated_descriptor(root: &Path) -> PathBuf {
    root.join("resources").join("META-INF").join("plugin.xml")
}

/// Per-variant packaged archive path: the root, an optional
/// `release_<id>` segment, the variant version, and the fixed archive name.
pub fn archive_file(root: &Path, release: Option<&str>, version: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    if let Some(id) = release {
        path.push(format!("release_{}", id));
    }
    path.push(version);
    path.push(ARCHIVE_FILE);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_file_includes_release_segment() {
        let path = archive_file(Path::new("/work"), Some("42.0"), "61.1");
        assert_eq!(
            path,
            PathBuf::from("/work/release_42.0/61.1/flutter-intellij.zip")
        );
    }

    #[test]
    fn archive_file_omits_release_segment_without_release() {
        let path = archive_file(Path::new("/work"), None, "61.1");
        assert_eq!(path, PathBuf::from("/work/61.1/flutter-intellij.zip"));
    }
}
