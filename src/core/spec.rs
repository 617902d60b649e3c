//! Variant declarations and their resolved build specifications.

use serde::Deserialize;

use crate::artifact::{ArchiveKind, Artifact, ArtifactSet, DART_PLUGIN, HOST_PRODUCT};
use crate::context::ToolContext;
use crate::error::{Error, Result};
use crate::paths;
use crate::utils::io;

/// Identifier of the plugin every variant ships.
pub const PLUGIN_ID: &str = "io.flutter";

/// One record of the declaration document. Key names are fixed for
/// compatibility with existing `product-matrix.json` files.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    pub name: String,
    pub version: String,
    pub idea_product: String,
    pub idea_version: String,
    pub dart_plugin_version: String,
    pub since_build: String,
    pub until_build: String,
}

impl VariantRecord {
    /// The resolver applies no defaults: a field that deserialized to an
    /// empty string is as fatal as a missing one.
    fn validate(&self) -> Result<()> {
        let fields = [
            ("name", &self.name),
            ("version", &self.version),
            ("ideaProduct", &self.idea_product),
            ("ideaVersion", &self.idea_version),
            ("dartPluginVersion", &self.dart_plugin_version),
            ("sinceBuild", &self.since_build),
            ("untilBuild", &self.until_build),
        ];
        for (key, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::config_invalid_value(
                    key,
                    Some(value.clone()),
                    format!("record '{}' declares an empty value", self.name),
                ));
            }
        }
        Ok(())
    }
}

/// Which product families a pipeline run covers. Both are included unless the
/// command line narrows the selection.
#[derive(Debug, Clone, Copy)]
pub struct ProductFilter {
    pub ij: bool,
    pub studio: bool,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            ij: true,
            studio: true,
        }
    }
}

/// The resolved, structured form of a variant declaration. Immutable after
/// construction; one fresh value per record per top-level command.
#[derive(Debug, Clone)]
pub struct BuildSpec {
    pub name: String,
    pub version: String,
    pub idea_product: String,
    pub idea_version: String,
    pub dart_plugin_version: String,
    pub since_build: String,
    pub until_build: String,
    pub plugin_id: String,
    /// Release identifier attached identically to every spec of a run;
    /// `None` means non-release mode.
    pub release: Option<String>,
    pub artifacts: ArtifactSet,
}

impl BuildSpec {
    pub(crate) fn from_record(record: VariantRecord, release: Option<String>) -> Result<Self> {
        record.validate()?;

        let mut artifacts = ArtifactSet::new();
        artifacts.add(HOST_PRODUCT, product_artifact(&record))?;
        artifacts.add(
            DART_PLUGIN,
            Artifact {
                file: format!("Dart-{}.zip", record.dart_plugin_version),
                output: format!("Dart-{}", record.dart_plugin_version),
                kind: ArchiveKind::BareZip,
            },
        )?;

        Ok(Self {
            name: record.name,
            version: record.version,
            idea_product: record.idea_product,
            idea_version: record.idea_version,
            dart_plugin_version: record.dart_plugin_version,
            since_build: record.since_build,
            until_build: record.until_build,
            plugin_id: PLUGIN_ID.to_string(),
            release,
            artifacts,
        })
    }

    pub fn is_android_studio(&self) -> bool {
        self.idea_product.starts_with("android-studio")
    }

    /// Variant properties handed to the compiler and the ant build.
    pub fn build_properties(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("idea.product", self.idea_product.as_str()),
            ("idea.version", self.idea_version.as_str()),
            ("dart.plugin.version", self.dart_plugin_version.as_str()),
            ("since.build", self.since_build.as_str()),
            ("until.build", self.until_build.as_str()),
        ]
    }
}

fn product_artifact(record: &VariantRecord) -> Artifact {
    let output = format!("{}-{}", record.idea_product, record.idea_version);
    if record.idea_product.starts_with("android-studio") {
        Artifact {
            file: format!("{}.tar.gz", output),
            output,
            kind: ArchiveKind::TarGz,
        }
    } else {
        // IDEA distributions carry a matching top-level directory, so the
        // plain zip expands in the cache root and lands in `output`.
        Artifact {
            file: format!("{}.zip", output),
            output,
            kind: ArchiveKind::Zip,
        }
    }
}

/// Resolve the declaration document into build specifications, one per
/// record, preserving document order.
pub fn resolve(ctx: &ToolContext, filter: &ProductFilter) -> Result<Vec<BuildSpec>> {
    let path = paths::product_matrix(&ctx.root);
    let raw = io::read_file(&path, "read product matrix")?;

    let records: Vec<VariantRecord> = serde_json::from_str(&raw)
        .map_err(|e| Error::config_invalid_json(path.to_string_lossy(), e))?;

    let mut specs = Vec::with_capacity(records.len());
    for record in records {
        let spec = BuildSpec::from_record(record, ctx.release.clone())?;
        let selected = if spec.is_android_studio() {
            filter.studio
        } else {
            filter.ij
        };
        if selected {
            specs.push(spec);
        }
    }

    Ok(specs)
}
