use clap::Args;

use pluginsmith::pipeline::{self, DeployPipeline, PipelineReport};

use crate::commands::{CmdResult, GlobalArgs, ProductFlags};

#[derive(Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub products: ProductFlags,
}

pub fn run(args: DeployArgs, global: &GlobalArgs) -> CmdResult<PipelineReport> {
    let ctx = global.context()?;
    let report = pipeline::run(&DeployPipeline, &ctx, &args.products.filter())?;
    Ok((report, 0))
}
