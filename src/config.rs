use std::path::{Path, PathBuf};

use crate::error::Error;

/// Name of the optional project configuration file.
pub const PROJECT_CONFIG_FILE: &str = ".oas-combine.toml";

/// How local references are treated during resolution.
/// Remote references are always materialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveConfig {
    /// Replace local reference nodes with the content they point at.
    pub inline_local: bool,
    /// After inlining, keep the original target instead of clearing it.
    /// Has no effect unless `inline_local` is set.
    pub keep_local: bool,
}

impl ResolveConfig {
    /// Whether an inlined local target is cleared afterwards.
    pub const fn clears_local_targets(&self) -> bool {
        return self.inline_local && !self.keep_local;
    }

    /// Configuration every referenced file is resolved with, so it is a
    /// self-contained value before its parent copies from it.
    pub const fn nested() -> Self {
        return Self { inline_local: true, keep_local: false };
    }
}

/// Project defaults loaded from `.oas-combine.toml`.
/// Command-line flags can only switch options on; they never turn a
/// project default off.
#[derive(Debug, Default)]
pub struct ProjectConfig {
    /// Default for `--inline-local`.
    pub inline_local: bool,
    /// Default for `--keep-local`.
    pub keep_local: bool,
    /// Default reference directory for documents read from standard input,
    /// already joined onto the directory the config was loaded from.
    pub ref_dir: Option<PathBuf>,
}

/// Raw TOML structure for `.oas-combine.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct OasCombineTomlConfig {
    /// Default for `--inline-local`.
    #[serde(default)]
    inline_local: bool,
    /// Default for `--keep-local`.
    #[serde(default)]
    keep_local: bool,
    /// Reference directory relative to the config file.
    #[serde(default)]
    ref_dir: Option<PathBuf>,
}

impl ProjectConfig {
    /// Load config from `.oas-combine.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; never silently
    /// falls back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputRead` if reading fails (other than not-found),
    /// or `Error::ConfigInvalid` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(PROJECT_CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::InputRead { path, source: e }),
        };

        let raw: OasCombineTomlConfig =
            toml::from_str(&content).map_err(|e| return Error::ConfigInvalid { path: path.clone(), source: e })?;
        tracing::debug!(path = %path.display(), "loaded project config");
        return Ok(Self {
            inline_local: raw.inline_local,
            keep_local: raw.keep_local,
            ref_dir: raw.ref_dir.map(|dir| return root.join(dir)),
        });
    }

    /// Merge command-line switches over the project defaults.
    pub const fn resolve_config(&self, inline_local: bool, keep_local: bool) -> ResolveConfig {
        return ResolveConfig {
            inline_local: inline_local || self.inline_local,
            keep_local: keep_local || self.keep_local,
        };
    }
}
