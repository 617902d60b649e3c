//! The build pipeline. Each declared variant is provisioned, compiled,
//! assembled, and packaged into its per-variant archive.

use std::path::Path;

use crate::artifact::Provisioner;
use crate::context::ToolContext;
use crate::error::{Error, Result};
use crate::paths;
use crate::spec::BuildSpec;
use crate::template;
use crate::utils::{command, io};

use super::Pipeline;

/// Source roots compiled and assembled into every variant.
pub(crate) const SOURCE_ROOTS: &[&str] = &["src", "resources", "gen"];
/// Additional sources compiled only for host-studio variants.
pub(crate) const STUDIO_SOURCE_ROOT: &str = "flutter-studio/src";

pub struct BuildPipeline;

impl Pipeline for BuildPipeline {
    fn name(&self) -> &'static str {
        "build"
    }

    fn execute(&self, ctx: &ToolContext, specs: &[BuildSpec]) -> Result<()> {
        for spec in specs {
            build_variant(ctx, spec)?;
        }
        Ok(())
    }
}

fn build_variant(ctx: &ToolContext, spec: &BuildSpec) -> Result<()> {
    log_status!(
        "build",
        "Building {} against {} {}",
        spec.name,
        spec.idea_product,
        spec.idea_version
    );

    Provisioner::new(ctx).provision(&spec.artifacts)?;

    // The output root is shared between variants and rebuilt in place.
    io::clear_dir(&paths::build_root(&ctx.root), "clear build output")?;

    compile(ctx, spec)?;
    copy_resources(ctx)?;

    let descriptor = paths::classes(&ctx.root).join("META-INF").join("plugin.xml");
    template::generate_descriptor(&paths::descriptor_template(&ctx.root), &descriptor, spec)?;

    package(ctx, spec)?;
    archive(ctx, spec)
}

fn compile(ctx: &ToolContext, spec: &BuildSpec) -> Result<()> {
    let classes = paths::classes(&ctx.root);
    io::ensure_dir(&classes, "create classes dir")?;

    let jars = super::dependency_jars(ctx, spec)?;
    let classpath = super::join_classpath(&jars);

    let sources = super::discover_sources(&ctx.root, SOURCE_ROOTS)?;
    if sources.is_empty() {
        return Err(Error::validation_invalid_argument(
            "sources",
            format!("No Java sources found under {:?}", SOURCE_ROOTS),
        ));
    }

    let status = run_compiler(ctx, spec, &classes, &classpath, sources)?;
    if status != 0 {
        return Err(Error::pipeline_step_failed("build", "compile", status));
    }

    if spec.is_android_studio() {
        let studio_sources = super::discover_sources(&ctx.root, &[STUDIO_SOURCE_ROOT])?;
        if !studio_sources.is_empty() {
            let studio_classes = paths::studio_classes(&ctx.root);
            io::ensure_dir(&studio_classes, "create studio classes dir")?;
            let studio_classpath = format!("{}:{}", classpath, classes.display());
            let status =
                run_compiler(ctx, spec, &studio_classes, &studio_classpath, studio_sources)?;
            if status != 0 {
                return Err(Error::pipeline_step_failed("build", "compile-studio", status));
            }
        }
    }

    Ok(())
}

fn run_compiler(
    ctx: &ToolContext,
    spec: &BuildSpec,
    out_dir: &Path,
    classpath: &str,
    sources: Vec<String>,
) -> Result<i32> {
    let mut args = vec![
        "-encoding".to_string(),
        "UTF-8".to_string(),
        "-d".to_string(),
        out_dir.to_string_lossy().to_string(),
        "-cp".to_string(),
        classpath.to_string(),
    ];
    for (name, value) in spec.build_properties() {
        args.push(format!("-A{}={}", name, value));
    }
    args.extend(sources);

    command::exec_streamed("build", &ctx.tools.compiler, &args, Some(&ctx.root))
}

/// Copy non-source files from each source root into the classes directory,
/// preserving relative layout. Source code, UI forms, and the raw descriptor
/// template never ship.
fn copy_resources(ctx: &ToolContext) -> Result<()> {
    let classes = paths::classes(&ctx.root);

    for source_root in SOURCE_ROOTS {
        let base = ctx.root.join(source_root);
        if !base.is_dir() {
            continue;
        }

        let pattern = format!("{}/**/*", base.display());
        let entries = glob::glob(&pattern).map_err(|e| {
            Error::internal_unexpected(format!("Invalid resource pattern '{}': {}", pattern, e))
        })?;

        for entry in entries.filter_map(|entry| entry.ok()) {
            if !entry.is_file() || is_excluded(&entry) {
                continue;
            }
            let rel = entry.strip_prefix(&base).map_err(|_| {
                Error::internal_unexpected(format!(
                    "Resource {} escaped source root {}",
                    entry.display(),
                    base.display()
                ))
            })?;
            io::copy_file(&entry, &classes.join(rel), "copy resources")?;
        }
    }

    Ok(())
}

fn is_excluded(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("java") | Some("form") => true,
        _ => path.file_name().and_then(|name| name.to_str()) == Some("plugin.xml.template"),
    }
}

fn package(ctx: &ToolContext, spec: &BuildSpec) -> Result<()> {
    let lib = paths::plugin_lib(&ctx.root);
    io::ensure_dir(&lib, "create plugin lib dir")?;

    jar(ctx, &lib.join("flutter-intellij.jar"), &paths::classes(&ctx.root))?;

    let studio_classes = paths::studio_classes(&ctx.root);
    if spec.is_android_studio() && studio_classes.is_dir() {
        jar(ctx, &lib.join("flutter-studio.jar"), &studio_classes)?;
    }

    Ok(())
}

fn jar(ctx: &ToolContext, jar_path: &Path, content_dir: &Path) -> Result<()> {
    let args = vec![
        "cf".to_string(),
        jar_path.to_string_lossy().to_string(),
        "-C".to_string(),
        content_dir.to_string_lossy().to_string(),
        ".".to_string(),
    ];
    let status = command::exec_streamed("build", &ctx.tools.packager, &args, None)?;
    if status != 0 {
        return Err(Error::pipeline_step_failed("build", "package", status));
    }
    Ok(())
}

fn archive(ctx: &ToolContext, spec: &BuildSpec) -> Result<()> {
    let path = paths::archive_file(&ctx.root, spec.release.as_deref(), &spec.version);
    if let Some(parent) = path.parent() {
        io::ensure_dir(parent, "create archive dir")?;
    }
    // The archiver appends to an existing archive; start fresh.
    let _ = std::fs::remove_file(&path);

    let args = vec![
        "-r".to_string(),
        "-q".to_string(),
        path.to_string_lossy().to_string(),
        paths::PLUGIN_DIR.to_string(),
    ];
    let status = command::exec_streamed(
        "build",
        &ctx.tools.archiver,
        &args,
        Some(&paths::build_root(&ctx.root)),
    )?;
    if status != 0 {
        return Err(Error::pipeline_step_failed("build", "archive", status));
    }

    log_status!("build", "Packaged {}", path.display());
    Ok(())
}
