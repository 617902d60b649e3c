//! The deploy pipeline uploads packaged release archives to the plugin
//! registry. Release mode only.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::context::ToolContext;
use crate::error::{Error, Result};
use crate::paths;
use crate::spec::BuildSpec;
use crate::tty;
use crate::utils::command;

use super::Pipeline;

const UPLOAD_URL: &str = "https://plugins.jetbrains.com/plugin/uploadPlugin";

pub struct DeployPipeline;

impl Pipeline for DeployPipeline {
    fn name(&self) -> &'static str {
        "deploy"
    }

    fn execute(&self, ctx: &ToolContext, specs: &[BuildSpec]) -> Result<()> {
        if ctx.release.is_none() {
            return Err(Error::validation_invalid_argument(
                "release",
                "Deploy requires a release identifier (--release)",
            ));
        }

        // Every archive and registry entry is checked before anything is
        // prompted for or uploaded; a half-deployed release helps nobody.
        let mut uploads: Vec<(&BuildSpec, PathBuf, String)> = Vec::with_capacity(specs.len());
        for spec in specs {
            let archive = paths::archive_file(&ctx.root, spec.release.as_deref(), &spec.version);
            if !archive.exists() {
                return Err(Error::validation_invalid_argument(
                    "archive",
                    format!("Packaged archive not found: {}", archive.display()),
                )
                .with_hint("Run the build pipeline for this release first"));
            }

            let registry_id = ctx.registry.get(&spec.plugin_id).cloned().ok_or_else(|| {
                Error::config_missing_key(format!("registry.{}", spec.plugin_id), None)
            })?;

            uploads.push((spec, archive, registry_id));
        }

        let account = tty::prompt("JetBrains account: ")?;
        let password = tty::prompt_password("Password: ")?;

        // NamedTempFile is created mode 0600 and unlinked on drop, so the
        // credential disappears on every exit path, including a failed
        // upload.
        let mut credentials = NamedTempFile::new().map_err(|e| {
            Error::internal_io(
                format!("Failed to create credential file: {}", e),
                Some("deploy".to_string()),
            )
        })?;
        write_credentials(&mut credentials, &account, &password)?;

        for (spec, archive, registry_id) in &uploads {
            log_status!(
                "deploy",
                "Uploading {} ({}) as plugin {}",
                archive.display(),
                spec.name,
                registry_id
            );
            upload(ctx, credentials.path(), archive, registry_id)?;
        }

        Ok(())
    }
}

/// Credentials travel to the uploader as a curl config file rather than
/// command-line arguments, keeping them out of the process list.
fn write_credentials(file: &mut NamedTempFile, account: &str, password: &str) -> Result<()> {
    let io_err = |e: std::io::Error| {
        Error::internal_io(
            format!("Failed to write credential file: {}", e),
            Some("deploy".to_string()),
        )
    };
    writeln!(file, "form = \"userName={}\"", account).map_err(io_err)?;
    writeln!(file, "form = \"password={}\"", password).map_err(io_err)?;
    file.flush().map_err(io_err)
}

fn upload(ctx: &ToolContext, credentials: &Path, archive: &Path, registry_id: &str) -> Result<()> {
    let args = vec![
        "--fail".to_string(),
        "--silent".to_string(),
        "--show-error".to_string(),
        "-K".to_string(),
        credentials.to_string_lossy().to_string(),
        "-F".to_string(),
        format!("pluginId={}", registry_id),
        "-F".to_string(),
        format!("file=@{}", archive.display()),
        UPLOAD_URL.to_string(),
    ];

    let status = command::exec_streamed("deploy", &ctx.tools.uploader, &args, None)?;
    if status != 0 {
        return Err(Error::pipeline_step_failed("deploy", "upload", status));
    }
    Ok(())
}
