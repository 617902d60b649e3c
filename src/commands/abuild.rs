use clap::Args;

use pluginsmith::pipeline::{self, AntBuildPipeline, PipelineReport};

use crate::commands::{CmdResult, GlobalArgs, ProductFlags};

#[derive(Args)]
pub struct AbuildArgs {
    #[command(flatten)]
    pub products: ProductFlags,
}

pub fn run(args: AbuildArgs, global: &GlobalArgs) -> CmdResult<PipelineReport> {
    let ctx = global.context()?;
    let report = pipeline::run(&AntBuildPipeline, &ctx, &args.products.filter())?;
    Ok((report, 0))
}
