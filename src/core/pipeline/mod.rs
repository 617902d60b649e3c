//! Command pipelines: a small closed set of variants behind one interface,
//! with resolution and release gating composed around them rather than
//! inherited.

use std::path::{Path, PathBuf};

use crate::context::ToolContext;
use crate::error::{Error, Result};
use crate::gate;
use crate::spec::{self, BuildSpec, ProductFilter};

mod ant;
mod build;
mod deploy;
mod test;

pub use ant::AntBuildPipeline;
pub use build::BuildPipeline;
pub use deploy::DeployPipeline;
pub use test::TestPipeline;

pub trait Pipeline {
    fn name(&self) -> &'static str;

    /// Process the resolved specifications in order. The first failing step
    /// aborts the whole run with that step's status.
    fn execute(&self, ctx: &ToolContext, specs: &[BuildSpec]) -> Result<()>;
}

#[derive(Debug)]
pub struct PipelineReport {
    pub pipeline: &'static str,
    pub variants: usize,
}

/// Shared pipeline entry point: resolve the declaration document, consult the
/// release gate, then hand the ordered specifications to the variant.
pub fn run(
    pipeline: &dyn Pipeline,
    ctx: &ToolContext,
    filter: &ProductFilter,
) -> Result<PipelineReport> {
    let specs = spec::resolve(ctx, filter)?;
    gate::check_release_ready(ctx)?;
    pipeline.execute(ctx, &specs)?;

    Ok(PipelineReport {
        pipeline: pipeline.name(),
        variants: specs.len(),
    })
}

/// Jars a variant compiles against: the provisioned product and companion
/// plugin library directories plus the compiler helper.
pub(crate) fn dependency_jars(ctx: &ToolContext, spec: &BuildSpec) -> Result<Vec<PathBuf>> {
    let cache = crate::paths::artifact_cache(&ctx.root);

    let product = spec
        .artifacts
        .get(crate::artifact::HOST_PRODUCT)
        .ok_or_else(|| Error::internal_unexpected("specification has no product artifact"))?;
    let dart = spec
        .artifacts
        .get(crate::artifact::DART_PLUGIN)
        .ok_or_else(|| Error::internal_unexpected("specification has no Dart plugin artifact"))?;
    let helper = spec
        .artifacts
        .get(crate::artifact::COMPILER_HELPER)
        .ok_or_else(|| Error::internal_unexpected("specification has no compiler helper"))?;

    let mut jars = Vec::new();
    for dir in [
        product.output_dir(&cache).join("lib"),
        dart.output_dir(&cache).join("Dart").join("lib"),
        helper.output_dir(&cache),
    ] {
        jars.extend(glob_jars(&dir)?);
    }
    Ok(jars)
}

fn glob_jars(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.jar", dir.display());
    let entries = glob::glob(&pattern).map_err(|e| {
        Error::internal_unexpected(format!("Invalid jar pattern '{}': {}", pattern, e))
    })?;
    let mut jars: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    jars.sort();
    Ok(jars)
}

/// Discover Java sources under the given roots, relative to the working root.
pub(crate) fn discover_sources(root: &Path, source_roots: &[&str]) -> Result<Vec<String>> {
    let mut sources = Vec::new();
    for source_root in source_roots {
        let pattern = format!("{}/{}/**/*.java", root.display(), source_root);
        let entries = glob::glob(&pattern).map_err(|e| {
            Error::internal_unexpected(format!("Invalid source pattern '{}': {}", pattern, e))
        })?;
        sources.extend(
            entries
                .filter_map(|entry| entry.ok())
                .filter(|p| p.is_file())
                .map(|p| p.to_string_lossy().to_string()),
        );
    }
    sources.sort();
    Ok(sources)
}

pub(crate) fn join_classpath(jars: &[PathBuf]) -> String {
    jars.iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::{
        git_repo_with_commit, stub_tool, temp_context, write_matrix, MATRIX_ONE,
    };
    use crate::context::ToolContext;

    // Build pipeline, first step failing with status 2: the status is
    // surfaced unchanged and compilation is never attempted.
    #[test]
    fn failing_provision_aborts_build_with_its_status() {
        let (dir, mut ctx) = temp_context();
        write_matrix(&ctx.root, MATRIX_ONE);

        let marker = dir.path().join("compiled");
        ctx.tools.transfer = stub_tool(dir.path(), "transfer", "exit 2");
        ctx.tools.compiler = stub_tool(
            dir.path(),
            "compiler",
            &format!("touch {}", marker.display()),
        );

        let err = run(&BuildPipeline, &ctx, &ProductFilter::default()).unwrap_err();
        assert_eq!(err.status, 2);
        assert!(!marker.exists(), "compiler ran after provisioning failed");
    }

    #[test]
    fn deploy_without_release_fails_immediately() {
        let (_dir, ctx) = temp_context();
        write_matrix(&ctx.root, MATRIX_ONE);

        let err = run(&DeployPipeline, &ctx, &ProductFilter::default()).unwrap_err();
        assert_eq!(err.status, 1);
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn release_gate_blocks_pipelines_before_any_step() {
        let dir = tempfile::TempDir::new().unwrap();
        git_repo_with_commit(dir.path(), "main");
        let mut ctx =
            ToolContext::new(dir.path().to_path_buf(), Some("61.0".to_string()), false);
        write_matrix(&ctx.root, MATRIX_ONE);
        // Declaration file counts as an uncommitted change on top of the
        // wrong branch; either sub-check must stop the run.
        ctx.tools.transfer = stub_tool(dir.path(), "transfer", "exit 0");

        let err = run(&BuildPipeline, &ctx, &ProductFilter::default()).unwrap_err();
        assert_eq!(err.code.as_str(), "release.gate_failed");
    }

    #[test]
    fn deploy_fails_when_archive_is_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        git_repo_with_commit(dir.path(), "release_61.0");
        let ctx = ToolContext::new(dir.path().to_path_buf(), Some("61.0".to_string()), true);
        write_matrix(&ctx.root, MATRIX_ONE);

        let err = run(&DeployPipeline, &ctx, &ProductFilter::default()).unwrap_err();
        assert_eq!(err.status, 1);
        assert!(err.message.contains("flutter-intellij.zip"));
    }
}
