use clap::Args;

use pluginsmith::spec::{self, ProductFilter};
use pluginsmith::{paths, template, Error};

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct LintArgs {}

#[derive(Debug)]
pub struct LintOutput {
    pub variants: usize,
    pub template_lines: usize,
}

/// Offline validation of the declaration document and descriptor template:
/// every record must resolve and every placeholder must name a recognized
/// variable. No network, no external processes.
pub fn run(_args: LintArgs, global: &GlobalArgs) -> CmdResult<LintOutput> {
    let ctx = global.context()?;

    let specs = spec::resolve(&ctx, &ProductFilter::default())?;
    let master = specs.first().ok_or_else(|| {
        Error::validation_invalid_argument("product-matrix", "No variants are declared")
    })?;

    let template_lines =
        template::verify_template(&paths::descriptor_template(&ctx.root), master)?;

    Ok((
        LintOutput {
            variants: specs.len(),
            template_lines,
        },
        0,
    ))
}
