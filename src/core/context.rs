use std::collections::HashMap;
use std::path::PathBuf;

use crate::spec::PLUGIN_ID;

/// Remote base location artifacts are fetched from, keyed by file name.
pub const ARTIFACT_BASE_URL: &str =
    "https://storage.googleapis.com/flutter_infra_release/flutter/intellij";

/// External tools the pipelines shell out to.
///
/// Plain fields rather than constants so tests can substitute stub
/// executables; only exit status and streamed text are consumed from any of
/// them.
#[derive(Debug, Clone)]
pub struct ToolSet {
    pub transfer: String,
    pub unzip: String,
    pub tar: String,
    pub compiler: String,
    pub packager: String,
    pub archiver: String,
    pub builder: String,
    pub uploader: String,
}

impl Default for ToolSet {
    fn default() -> Self {
        Self {
            transfer: "curl".to_string(),
            unzip: "unzip".to_string(),
            tar: "tar".to_string(),
            compiler: "javac".to_string(),
            packager: "jar".to_string(),
            archiver: "zip".to_string(),
            builder: "ant".to_string(),
            uploader: "curl".to_string(),
        }
    }
}

/// Explicit per-invocation configuration, threaded through every constructor.
///
/// Nothing in the crate reads ambient process-wide state; the root path,
/// release identifier, and registry map all travel through this value.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Working root all relative layout paths hang off.
    pub root: PathBuf,
    /// Release identifier; `None` means non-release mode.
    pub release: Option<String>,
    /// Set when the root was overridden on the command line (`--cwd`).
    pub test_mode: bool,
    /// Plugin identifier to plugin-registry number.
    pub registry: HashMap<String, String>,
    pub artifact_base_url: String,
    pub tools: ToolSet,
}

impl ToolContext {
    pub fn new(root: PathBuf, release: Option<String>, test_mode: bool) -> Self {
        let mut registry = HashMap::new();
        registry.insert(PLUGIN_ID.to_string(), "9212".to_string());

        Self {
            root,
            release,
            test_mode,
            registry,
            artifact_base_url: ARTIFACT_BASE_URL.to_string(),
            tools: ToolSet::default(),
        }
    }
}
