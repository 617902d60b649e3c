//! The test pipeline compiles every variant's tests against the provisioned
//! dependency archives. Running the compiled tests is a separate concern and
//! deliberately not part of this pipeline.

use crate::artifact::Provisioner;
use crate::context::ToolContext;
use crate::error::{Error, Result};
use crate::paths;
use crate::spec::BuildSpec;
use crate::utils::{command, io};

use super::Pipeline;

/// Fixed set of test source roots.
pub(crate) const TEST_SOURCE_ROOTS: &[&str] = &["testSrc", "flutter-studio/testSrc"];

pub struct TestPipeline;

impl Pipeline for TestPipeline {
    fn name(&self) -> &'static str {
        "test"
    }

    fn execute(&self, ctx: &ToolContext, specs: &[BuildSpec]) -> Result<()> {
        for spec in specs {
            compile_tests(ctx, spec)?;
        }
        Ok(())
    }
}

fn compile_tests(ctx: &ToolContext, spec: &BuildSpec) -> Result<()> {
    log_status!(
        "test",
        "Compiling tests for {} against {} {}",
        spec.name,
        spec.idea_product,
        spec.idea_version
    );

    Provisioner::new(ctx).provision(&spec.artifacts)?;

    let jars = super::dependency_jars(ctx, spec)?;
    let sources = super::discover_sources(&ctx.root, TEST_SOURCE_ROOTS)?;
    if sources.is_empty() {
        return Err(Error::validation_invalid_argument(
            "test_sources",
            format!("No test sources found under {:?}", TEST_SOURCE_ROOTS),
        ));
    }

    let out_dir = paths::test_classes(&ctx.root);
    io::ensure_dir(&out_dir, "create test classes dir")?;

    let source_path = TEST_SOURCE_ROOTS
        .iter()
        .map(|root| ctx.root.join(root).to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(":");

    let mut args = vec![
        "-encoding".to_string(),
        "UTF-8".to_string(),
        "-d".to_string(),
        out_dir.to_string_lossy().to_string(),
        "-sourcepath".to_string(),
        source_path,
        "-cp".to_string(),
        super::join_classpath(&jars),
    ];
    args.extend(sources);

    let status = command::exec_streamed("test", &ctx.tools.compiler, &args, Some(&ctx.root))?;
    if status != 0 {
        return Err(Error::pipeline_step_failed("test", "compile-tests", status));
    }

    Ok(())
}
