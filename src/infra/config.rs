use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

/// Engine settings, loadable from `retread.toml` and `RETREAD_*`
/// environment variables. Every option has a conservative default so a
/// missing config file means exact-only, copy-nothing behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Similarity (1-100) at which two paragraphs count as the same;
    /// 100 = exact matching only
    pub fuzzy_threshold: u8,

    /// Include inline codes when comparing content exactly
    pub code_sensitive: bool,

    /// Only mark diff matches; never copy translations forward
    pub diff_only: bool,

    /// Overwrite the target's primary content with the leveraged text
    pub copy_to_target: bool,

    /// Drop every non-1-1 pair from sentence-alignment output
    pub output_one_to_one_only: bool,

    /// Skip the DP aligner and pair segments positionally
    pub force_simple_alignment: bool,

    /// Collapse whitespace runs before aligning
    pub collapse_whitespace: bool,

    /// Match file paths case-insensitively during file alignment
    pub case_insensitive_paths: bool,

    /// Extra ignore globs for the tree walker (in addition to .gitignore)
    pub ignore_patterns: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 100,
            code_sensitive: true,
            diff_only: false,
            copy_to_target: false,
            output_one_to_one_only: false,
            force_simple_alignment: false,
            collapse_whitespace: false,
            case_insensitive_paths: false,
            ignore_patterns: vec!["*.bak".to_string(), "*.tmp".to_string()],
        }
    }
}

impl Settings {
    /// Load settings from the first config file found, layered under
    /// `RETREAD_`-prefixed environment variables.
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();

        let config_paths = ["retread.toml", ".retread.toml"];
        for path in &config_paths {
            if Path::new(path).exists() {
                builder = builder.add_source(config::File::with_name(path));
                break;
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("RETREAD"));

        let cfg = builder.build().context("Failed to load configuration")?;
        let parsed: Settings = cfg
            .try_deserialize()
            .context("Failed to parse configuration")?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject out-of-range options before any engine work starts.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.fuzzy_threshold) {
            anyhow::bail!(
                "fuzzy_threshold must be between 1 and 100, got {}",
                self.fuzzy_threshold
            );
        }
        Ok(())
    }
}

pub fn init(args: InitArgs, ctx: &AppContext) -> Result<()> {
    let config_path = args.path.join("retread.toml");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let settings = Settings::default();
    let toml_string =
        toml::to_string_pretty(&settings).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
