//! Artifact provisioning: download-once, expand-always caching of the remote
//! archives a variant build depends on.

use std::fs;
use std::path::{Path, PathBuf};

use crate::context::{ToolContext, ToolSet};
use crate::error::{Error, Result};
use crate::utils::command;

/// Logical name of the fixed compiler-helper artifact every set carries.
pub const COMPILER_HELPER: &str = "javac2";
/// Logical name of the host IDE distribution artifact.
pub const HOST_PRODUCT: &str = "product";
/// Logical name of the companion Dart plugin artifact.
pub const DART_PLUGIN: &str = "dart-plugin";

/// How an artifact archive expands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Zip carrying its own top-level directory; expanded into the cache root
    /// so that directory becomes the output directory by convention.
    Zip,
    /// Zip with no top-level directory; expanded directly into the named
    /// output directory.
    BareZip,
    /// Gzipped tar; expanded into the output directory with the archive's own
    /// root folder stripped.
    TarGz,
}

#[derive(Debug, Clone)]
pub struct Artifact {
    /// Archive file name under the cache root and the remote base location.
    pub file: String,
    /// Output directory name under the cache root.
    pub output: String,
    pub kind: ArchiveKind,
}

impl Artifact {
    pub fn output_dir(&self, cache_root: &Path) -> PathBuf {
        cache_root.join(&self.output)
    }
}

/// Ordered mapping from logical artifact name to descriptor.
///
/// A fresh set always contains the compiler helper; the owning specification
/// adds the host product and companion plugin during resolution.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    entries: Vec<(String, Artifact)>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        let mut set = Self {
            entries: Vec::new(),
        };
        // The compiler helper is version-independent and shared by every
        // variant; it is part of the set from construction.
        set.entries.push((
            COMPILER_HELPER.to_string(),
            Artifact {
                file: "intellij-javac2.zip".to_string(),
                output: "javac2".to_string(),
                kind: ArchiveKind::BareZip,
            },
        ));
        set
    }

    /// Add an artifact under a logical name.
    ///
    /// Output directories must be unique: two artifacts expanding into the
    /// same directory would silently clobber each other on disk.
    pub fn add(&mut self, name: impl Into<String>, artifact: Artifact) -> Result<()> {
        let name = name.into();
        if self
            .entries
            .iter()
            .any(|(_, existing)| existing.output == artifact.output)
        {
            return Err(Error::validation_invalid_argument(
                "artifact",
                format!(
                    "Artifact '{}' collides with an existing output directory '{}'",
                    name, artifact.output
                ),
            ));
        }
        self.entries.push((name, artifact));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, artifact)| artifact)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Artifact)> {
        self.entries
            .iter()
            .map(|(name, artifact)| (name.as_str(), artifact))
    }
}

impl Default for ArtifactSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Downloads and expands an artifact set into the cache root.
///
/// Provisioning state lives entirely on the filesystem: an archive file that
/// exists under the cache root is never fetched again, while expansion runs
/// unconditionally on every call (the expansion tools overwrite in place).
pub struct Provisioner {
    cache_root: PathBuf,
    base_url: String,
    tools: ToolSet,
}

impl Provisioner {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            cache_root: crate::paths::artifact_cache(&ctx.root),
            base_url: ctx.artifact_base_url.clone(),
            tools: ctx.tools.clone(),
        }
    }

    /// Fetch and expand every artifact in declaration order.
    ///
    /// The first failing transfer or expansion aborts with the tool's status;
    /// a re-run after a partial failure re-attempts only what is still
    /// missing on disk.
    pub fn provision(&self, set: &ArtifactSet) -> Result<()> {
        crate::utils::io::ensure_dir(&self.cache_root, "create artifact cache")?;

        for (name, artifact) in set.iter() {
            let archive = self.cache_root.join(&artifact.file);

            if archive.exists() {
                log_status!("provision", "{} already cached", artifact.file);
            } else {
                self.fetch(artifact, &archive)?;
            }

            self.expand(name, artifact, &archive)?;
        }

        Ok(())
    }

    fn fetch(&self, artifact: &Artifact, archive: &Path) -> Result<()> {
        let url = format!("{}/{}", self.base_url, artifact.file);
        log_status!("provision", "Fetching {}", url);

        let args = vec![
            "--fail".to_string(),
            "--location".to_string(),
            "--silent".to_string(),
            "--show-error".to_string(),
            "--output".to_string(),
            archive.to_string_lossy().to_string(),
            url,
        ];
        let status = command::exec_streamed("provision", &self.tools.transfer, &args, None)?;
        if status != 0 {
            // A partial download must not register as a cache hit next run.
            let _ = fs::remove_file(archive);
            return Err(Error::provision_transfer_failed(&artifact.file, status));
        }
        Ok(())
    }

    fn expand(&self, name: &str, artifact: &Artifact, archive: &Path) -> Result<()> {
        let output = artifact.output_dir(&self.cache_root);
        crate::utils::io::ensure_dir(&output, "create artifact output dir")?;

        log_status!("provision", "Expanding {} ({})", artifact.file, name);

        let archive_arg = archive.to_string_lossy().to_string();
        let (tool, args) = match artifact.kind {
            ArchiveKind::BareZip => (
                &self.tools.unzip,
                vec![
                    "-o".to_string(),
                    "-q".to_string(),
                    archive_arg,
                    "-d".to_string(),
                    output.to_string_lossy().to_string(),
                ],
            ),
            ArchiveKind::Zip => (
                &self.tools.unzip,
                vec![
                    "-o".to_string(),
                    "-q".to_string(),
                    archive_arg,
                    "-d".to_string(),
                    self.cache_root.to_string_lossy().to_string(),
                ],
            ),
            ArchiveKind::TarGz => (
                &self.tools.tar,
                vec![
                    "xzf".to_string(),
                    archive_arg,
                    "-C".to_string(),
                    output.to_string_lossy().to_string(),
                    "--strip-components=1".to_string(),
                ],
            ),
        };

        let status = command::exec_streamed("provision", tool, &args, None)?;
        if status != 0 {
            return Err(Error::provision_expand_failed(&artifact.file, status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::{stub_tool, temp_context};

    fn bare_zip_set(file: &str, output: &str) -> ArtifactSet {
        let mut set = ArtifactSet {
            entries: Vec::new(),
        };
        set.add(
            HOST_PRODUCT,
            Artifact {
                file: file.to_string(),
                output: output.to_string(),
                kind: ArchiveKind::BareZip,
            },
        )
        .unwrap();
        set
    }

    #[test]
    fn new_set_carries_compiler_helper() {
        let set = ArtifactSet::new();
        assert!(set.get(COMPILER_HELPER).is_some());
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn add_rejects_colliding_output_dirs() {
        let mut set = ArtifactSet::new();
        let result = set.add(
            HOST_PRODUCT,
            Artifact {
                file: "other.zip".to_string(),
                output: "javac2".to_string(),
                kind: ArchiveKind::BareZip,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn cached_archive_skips_transfer() {
        let (dir, mut ctx) = temp_context();
        // A transfer tool that always fails proves it is never invoked.
        ctx.tools.transfer = stub_tool(dir.path(), "transfer", "exit 9");
        ctx.tools.unzip = stub_tool(dir.path(), "unzip", "exit 0");

        let cache = crate::paths::artifact_cache(&ctx.root);
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("Dart-171.1.zip"), "cached").unwrap();

        let set = bare_zip_set("Dart-171.1.zip", "Dart-171.1");
        let provisioner = Provisioner::new(&ctx);
        assert!(provisioner.provision(&set).is_ok());
    }

    #[test]
    fn provision_is_idempotent_across_calls() {
        let (dir, mut ctx) = temp_context();
        ctx.tools.transfer = stub_tool(dir.path(), "transfer", "exit 9");
        ctx.tools.unzip = stub_tool(dir.path(), "unzip", "exit 0");

        let cache = crate::paths::artifact_cache(&ctx.root);
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("Dart-171.1.zip"), "cached").unwrap();

        let set = bare_zip_set("Dart-171.1.zip", "Dart-171.1");
        let provisioner = Provisioner::new(&ctx);
        assert!(provisioner.provision(&set).is_ok());
        assert!(provisioner.provision(&set).is_ok());
    }

    #[test]
    fn expansion_runs_on_every_call() {
        let (dir, mut ctx) = temp_context();
        let counter = dir.path().join("expansions");
        ctx.tools.transfer = stub_tool(dir.path(), "transfer", "exit 9");
        ctx.tools.unzip = stub_tool(
            dir.path(),
            "unzip",
            &format!("echo run >> {}", counter.display()),
        );

        let cache = crate::paths::artifact_cache(&ctx.root);
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("Dart-171.1.zip"), "cached").unwrap();

        let set = bare_zip_set("Dart-171.1.zip", "Dart-171.1");
        let provisioner = Provisioner::new(&ctx);
        provisioner.provision(&set).unwrap();
        provisioner.provision(&set).unwrap();

        let runs = std::fs::read_to_string(counter).unwrap();
        assert_eq!(runs.lines().count(), 2);
    }

    #[test]
    fn failed_transfer_aborts_with_tool_status() {
        let (dir, mut ctx) = temp_context();
        ctx.tools.transfer = stub_tool(dir.path(), "transfer", "exit 7");

        let set = bare_zip_set("Dart-171.1.zip", "Dart-171.1");
        let provisioner = Provisioner::new(&ctx);
        let err = provisioner.provision(&set).unwrap_err();
        assert_eq!(err.code.as_str(), "provision.transfer_failed");
        assert_eq!(err.status, 7);
    }

    #[test]
    fn failed_expansion_aborts_with_tool_status() {
        let (dir, mut ctx) = temp_context();
        ctx.tools.transfer = stub_tool(dir.path(), "transfer", "exit 9");
        ctx.tools.unzip = stub_tool(dir.path(), "unzip", "exit 3");

        let cache = crate::paths::artifact_cache(&ctx.root);
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("Dart-171.1.zip"), "cached").unwrap();

        let set = bare_zip_set("Dart-171.1.zip", "Dart-171.1");
        let provisioner = Provisioner::new(&ctx);
        let err = provisioner.provision(&set).unwrap_err();
        assert_eq!(err.code.as_str(), "provision.expand_failed");
        assert_eq!(err.status, 3);
    }
}
