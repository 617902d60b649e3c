use clap::{ArgAction, Args};
use std::path::PathBuf;

use pluginsmith::context::ToolContext;
use pluginsmith::spec::ProductFilter;
use pluginsmith::{Error, Result};

pub mod abuild;
pub mod build;
pub mod deploy;
pub mod gen;
pub mod lint;

pub type CmdResult<T> = Result<(T, i32)>;

pub struct GlobalArgs {
    /// Release identifier; enables release mode.
    pub release: Option<String>,
    /// Root override relative to the invocation directory; presence signals
    /// test mode.
    pub cwd: Option<String>,
}

impl GlobalArgs {
    pub fn context(&self) -> Result<ToolContext> {
        let invocation_dir = std::env::current_dir().map_err(|e| {
            Error::internal_io(
                format!("Failed to resolve working directory: {}", e),
                Some("context".to_string()),
            )
        })?;

        let (root, test_mode) = match &self.cwd {
            Some(path) => {
                let expanded = shellexpand::tilde(path).to_string();
                (invocation_dir.join(PathBuf::from(expanded)), true)
            }
            None => (invocation_dir, false),
        };

        Ok(ToolContext::new(root, self.release.clone(), test_mode))
    }
}

/// Product-family selection shared by the pipeline commands. Both families
/// are built unless narrowed with `--ij=false` / `--as=false`.
#[derive(Args, Debug, Clone, Copy)]
pub struct ProductFlags {
    /// Include IntelliJ IDEA variants
    #[arg(
        long,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1,
        action = ArgAction::Set,
        value_name = "BOOL"
    )]
    pub ij: bool,

    /// Include Android Studio variants
    #[arg(
        long = "as",
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1,
        action = ArgAction::Set,
        value_name = "BOOL"
    )]
    pub studio: bool,
}

impl ProductFlags {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            ij: self.ij,
            studio: self.studio,
        }
    }
}
