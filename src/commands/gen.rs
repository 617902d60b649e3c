use clap::Args;

use pluginsmith::spec::{self, ProductFilter};
use pluginsmith::{paths, template, Error};

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct GenArgs {}

#[derive(Debug)]
pub struct GenOutput {
    pub descriptor: String,
    pub variant: String,
}

/// Refresh the checked-in descriptor from its template using the master
/// (first-declared) variant.
pub fn run(_args: GenArgs, global: &GlobalArgs) -> CmdResult<GenOutput> {
    let ctx = global.context()?;

    let specs = spec::resolve(&ctx, &ProductFilter::default())?;
    let master = specs.first().ok_or_else(|| {
        Error::validation_invalid_argument("product-matrix", "No variants are declared")
    })?;

    let descriptor = paths::generated_descriptor(&ctx.root);
    template::generate_descriptor(&paths::descriptor_template(&ctx.root), &descriptor, master)?;

    Ok((
        GenOutput {
            descriptor: descriptor.to_string_lossy().to_string(),
            variant: master.name.clone(),
        },
        0,
    ))
}
