use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT_ROOT: &str = ".";
const MODEL_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Source model document (YAML or JSON)
    pub model: PathBuf,
    /// Directory the `.` output sub-folder resolves to
    pub output_root: PathBuf,
    /// Render and report without touching the filesystem
    pub dry_run: bool,
    /// Keep a `.bak` copy of files that get overwritten
    pub backups: bool,
    /// Where to save the generation receipt, if anywhere
    pub receipt: Option<PathBuf>,
    /// Fail the run when any model fails
    pub strict: bool,
}

impl GeneratorConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            model: cli_model,
            output_root: cli_output_root,
            dry_run: cli_dry_run,
            backups: cli_backups,
            receipt: cli_receipt,
            strict: cli_strict,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            model: file_model,
            output_root: file_output_root,
            dry_run: file_dry_run,
            backups: file_backups,
            receipt: file_receipt,
            strict: file_strict,
        } = file_config;

        let model = cli_model
            .or(file_model)
            .context("no source model given, pass --model or set `model` in the config file")?;

        let output_root = cli_output_root
            .or(file_output_root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT));

        // Flags can only switch a file setting on, never off
        let dry_run = cli_dry_run || file_dry_run.unwrap_or(false);
        let backups = cli_backups || file_backups.unwrap_or(false);
        let strict = cli_strict || file_strict.unwrap_or(false);

        let receipt = cli_receipt.or(file_receipt).map(|path| {
            if path.is_absolute() {
                path
            } else {
                output_root.join(path)
            }
        });

        Ok(Self {
            model,
            output_root,
            dry_run,
            backups,
            receipt,
            strict,
        })
    }

    /// Check the configured paths before any generation work starts
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.model.exists(),
            "source model {:?} does not exist",
            self.model
        );
        anyhow::ensure!(
            self.model.is_file(),
            "source model {:?} is not a file",
            self.model
        );
        let allowed = self
            .model
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .map(|ext| MODEL_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        anyhow::ensure!(
            allowed,
            "source model {:?} does not match allowed extensions {:?}",
            self.model,
            MODEL_EXTENSIONS
        );

        if self.output_root.exists() {
            anyhow::ensure!(
                self.output_root.is_dir(),
                "output root {:?} is not a directory",
                self.output_root
            );
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "dm-config-gen",
    about = "Generate diagnostic manager JSON configuration from a system model",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        short = 'm',
        env = "DM_CONFIG_MODEL",
        value_name = "FILE",
        help = "Source model document (YAML or JSON)"
    )]
    pub model: Option<PathBuf>,

    #[arg(
        long,
        short = 'o',
        env = "DM_CONFIG_OUTPUT_ROOT",
        value_name = "DIR",
        help = "Directory generated files are written to"
    )]
    pub output_root: Option<PathBuf>,

    #[arg(long, help = "Render and validate without writing files")]
    pub dry_run: bool,

    #[arg(long, help = "Keep a .bak copy of overwritten files")]
    pub backups: bool,

    #[arg(
        long,
        value_name = "FILE",
        help = "Save a generation receipt (relative paths resolve against the output root)"
    )]
    pub receipt: Option<PathBuf>,

    #[arg(long, help = "Exit with an error when any model fails")]
    pub strict: bool,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    model: Option<PathBuf>,
    output_root: Option<PathBuf>,
    dry_run: Option<bool>,
    backups: Option<bool>,
    receipt: Option<PathBuf>,
    strict: Option<bool>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
