//! Top-level CLI definition and dispatch.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Once;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use serde::Serialize;

use crate::core::config::Config;
use crate::core::errors::{CypError, Result};
use crate::logger::{ActivityEvent, ActivityLog};
use crate::prediction::report::{
    ErrorPayload, PredictionPayload, ReferencePayload, StatusPayload, format_notice,
    format_prediction, format_reference, format_status,
};
use crate::prediction::{InputDraft, predict};
use crate::predictor::{LoadNotice, PredictorLoader, ResolvedPredictor};
use crate::reference::ReferenceData;

/// Crop yield predictor: estimates yield and production from field conditions.
#[derive(Parser, Debug)]
#[command(name = "cyp", version, about)]
pub struct Cli {
    /// Config file (defaults to $CYP_CONFIG, then built-in defaults).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Model artifact, overriding config and $CYP_MODEL_PATH.
    #[arg(long, global = true, value_name = "FILE")]
    pub model: Option<PathBuf>,
    /// Output machine-readable JSON.
    #[arg(long, global = true)]
    pub json: bool,
    /// Disable coloured output.
    #[arg(long, global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Predict yield and production for one set of field conditions.
    Predict(PredictArgs),
    /// Show which predictor is active and why.
    Status,
    /// List states, seasons, and crops, or the districts of one state.
    Reference {
        /// State whose districts to list.
        state: Option<String>,
    },
    /// Show the effective configuration.
    Config,
    /// Generate a shell completion script.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Form fields. Unset flags keep the value from `--input` or the form default.
#[derive(Args, Debug, Default)]
pub struct PredictArgs {
    /// JSON file holding some or all of the form fields.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// State name (see `cyp reference`; defaults to the first state).
    #[arg(long)]
    pub state: Option<String>,
    /// District within the state (defaults to the state's first district).
    #[arg(long)]
    pub district: Option<String>,
    /// Crop name (defaults to the first listed crop).
    #[arg(long)]
    pub crop: Option<String>,
    /// Growing season, e.g. Kharif or Rabi (defaults to the first season).
    #[arg(long)]
    pub season: Option<String>,
    /// Crop year (1990-2050).
    #[arg(long = "year")]
    pub crop_year: Option<i32>,
    /// Temperature in °C (10-50).
    #[arg(long)]
    pub temperature: Option<f64>,
    /// Relative humidity in % (10-100).
    #[arg(long)]
    pub humidity: Option<f64>,
    /// Soil moisture in % (0-100).
    #[arg(long)]
    pub soil_moisture: Option<f64>,
    /// Cultivation area in units (0.1-100000).
    #[arg(long)]
    pub area: Option<f64>,
}

impl PredictArgs {
    /// Start from `--input` (or defaults) and overlay explicit flags.
    pub fn to_draft(&self) -> Result<InputDraft> {
        let mut draft = match &self.input {
            Some(path) => read_draft(path)?,
            None => InputDraft::default(),
        };
        if let Some(state) = &self.state {
            draft.state = Some(state.clone());
        }
        if let Some(district) = &self.district {
            draft.district = Some(district.clone());
        }
        if let Some(crop) = &self.crop {
            draft.crop = Some(crop.clone());
        }
        if let Some(season) = &self.season {
            draft.season = Some(season.clone());
        }
        draft.crop_year = self.crop_year.unwrap_or(draft.crop_year);
        draft.temperature = self.temperature.unwrap_or(draft.temperature);
        draft.humidity = self.humidity.unwrap_or(draft.humidity);
        draft.soil_moisture = self.soil_moisture.unwrap_or(draft.soil_moisture);
        draft.area = self.area.unwrap_or(draft.area);
        Ok(draft)
    }
}

fn read_draft(path: &Path) -> Result<InputDraft> {
    let raw = std::fs::read_to_string(path).map_err(|source| CypError::io(path, source))?;
    Ok(serde_json::from_str(&raw)?)
}

impl Command {
    const fn name(&self) -> &'static str {
        match self {
            Self::Predict(_) => "predict",
            Self::Status => "status",
            Self::Reference { .. } => "reference",
            Self::Config => "config",
            Self::Completions { .. } => "completions",
        }
    }
}

/// Per-process state shared by the subcommands.
struct Session {
    config: Config,
    reference: ReferenceData,
    loader: PredictorLoader,
    log: ActivityLog,
    json: bool,
    announced: Once,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref())?;
        if let Some(model) = &cli.model {
            config.model.path.clone_from(model);
        }
        let reference = config.reference_data()?;
        let loader = PredictorLoader::new(config.model.path.clone());
        let log = ActivityLog::from_config(&config.logging);
        Ok(Self {
            config,
            reference,
            loader,
            log,
            json: cli.json,
            announced: Once::new(),
        })
    }

    /// Resolve the predictor and surface its startup notice once.
    fn predictor(&self) -> &ResolvedPredictor {
        let resolved = self.loader.load();
        self.announced.call_once(|| {
            self.log.record(&ActivityEvent::PredictorResolved {
                variant: resolved.variant(),
                notice: resolved.notice(),
                artifact_path: resolved.artifact_path(),
            });
            if !self.json {
                print_notice(resolved.notice(), resolved.artifact_path());
            }
        });
        resolved
    }

    fn predict(&self, args: &PredictArgs) -> Result<()> {
        let resolved = self.predictor();
        let outcome = args
            .to_draft()
            .and_then(|draft| draft.validate(&self.reference))
            .and_then(|record| {
                let result = predict(&record, resolved.capability())?;
                Ok((record, result))
            });
        let (record, result) = match outcome {
            Ok(done) => done,
            Err(err) => {
                self.log.record(&ActivityEvent::from_error(&err));
                return Err(err);
            }
        };
        self.log
            .record(&ActivityEvent::served(result.variant, &record));

        if self.json {
            emit_json(&PredictionPayload {
                command: "predict",
                notice: resolved.notice(),
                input: &record,
                result: &result,
            })
        } else {
            print!("{}", format_prediction(&record, &result));
            Ok(())
        }
    }

    fn status(&self) -> Result<()> {
        let resolved = self.predictor();
        if self.json {
            emit_json(&StatusPayload::new(resolved))
        } else {
            print!("{}", format_status(resolved));
            Ok(())
        }
    }

    fn reference(&self, state: Option<&str>) -> Result<()> {
        if self.json {
            emit_json(&ReferencePayload::new(&self.reference, state)?)
        } else {
            print!("{}", format_reference(&self.reference, state)?);
            Ok(())
        }
    }

    fn show_config(&self) -> Result<()> {
        if self.json {
            emit_json(&self.config)
        } else {
            print!("{}", self.config.to_toml()?);
            Ok(())
        }
    }
}

fn print_notice(notice: &LoadNotice, artifact_path: &Path) {
    let Some(text) = format_notice(notice, artifact_path) else {
        return;
    };
    match notice {
        LoadNotice::ModelLoadFailed { .. } => eprintln!("{}", text.red().bold()),
        _ => eprintln!("{}", text.yellow()),
    }
}

fn emit_json<T: Serialize>(payload: &T) -> Result<()> {
    let line = serde_json::to_string(payload)?;
    println!("{line}");
    Ok(())
}

/// Dispatch CLI commands.
///
/// # Errors
/// Returns the first error of the selected subcommand.
pub fn run(cli: &Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Command::Completions { shell } = &cli.command {
        let mut stdout = std::io::stdout();
        clap_complete::generate(*shell, &mut Cli::command(), "cyp", &mut stdout);
        return stdout
            .flush()
            .map_err(|source| CypError::io("<stdout>", source));
    }

    let session = Session::open(cli)?;
    match &cli.command {
        Command::Predict(args) => session.predict(args),
        Command::Status => session.status(),
        Command::Reference { state } => session.reference(state.as_deref()),
        Command::Config => session.show_config(),
        Command::Completions { .. } => Ok(()),
    }
}

/// Print a failed command's error in the selected output mode.
pub fn report_error(cli: &Cli, err: &CypError) {
    if cli.json {
        let payload = ErrorPayload {
            command: cli.command.name(),
            code: err.code(),
            error: err.to_string(),
        };
        if let Ok(line) = serde_json::to_string(&payload) {
            println!("{line}");
            return;
        }
    }
    eprintln!("{} {err}", "error:".red().bold());
}
