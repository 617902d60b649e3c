use clap::Args;

use pluginsmith::pipeline::{self, BuildPipeline, PipelineReport};

use crate::commands::{CmdResult, GlobalArgs, ProductFlags};

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub products: ProductFlags,
}

pub fn run(args: BuildArgs, global: &GlobalArgs) -> CmdResult<PipelineReport> {
    let ctx = global.context()?;
    let report = pipeline::run(&BuildPipeline, &ctx, &args.products.filter())?;
    Ok((report, 0))
}
