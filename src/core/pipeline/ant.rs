//! Legacy build path: compilation and packaging are delegated entirely to the
//! external build-description file, with the variant properties passed as
//! process arguments.

use crate::artifact::Provisioner;
use crate::context::ToolContext;
use crate::error::{Error, Result};
use crate::spec::BuildSpec;
use crate::utils::command;

use super::Pipeline;

pub struct AntBuildPipeline;

impl Pipeline for AntBuildPipeline {
    fn name(&self) -> &'static str {
        "abuild"
    }

    fn execute(&self, ctx: &ToolContext, specs: &[BuildSpec]) -> Result<()> {
        for spec in specs {
            log_status!(
                "abuild",
                "Building {} via build.xml against {} {}",
                spec.name,
                spec.idea_product,
                spec.idea_version
            );

            Provisioner::new(ctx).provision(&spec.artifacts)?;

            let mut args = vec!["-f".to_string(), "build.xml".to_string()];
            for (name, value) in spec.build_properties() {
                args.push(format!("-D{}={}", name, value));
            }

            let status =
                command::exec_streamed("abuild", &ctx.tools.builder, &args, Some(&ctx.root))?;
            if status != 0 {
                return Err(Error::pipeline_step_failed("abuild", "ant", status));
            }
        }
        Ok(())
    }
}
