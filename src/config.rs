use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::ScreenSize;
use crate::pattern::Pattern;
use crate::pattern::PatternError;
use crate::render::CELL_WIDTH;
use crate::render::STATUS_LINES;
use crate::rule_set::RuleError;
use crate::rule_set::RuleSet;
use crate::simulation::DEFAULT_TICK_INTERVAL;

pub const USAGE: &str = "\
Usage: gridlife [OPTIONS]

Options:
  --rows <N>              Grid height in cells [default: fit the terminal]
  --cols <N>              Grid width in cells [default: fit the terminal]
  --tick-ms <MS>          Milliseconds between generations while playing [default: 100]
  --rule <RULE>           Rulestring such as B3/S23 [default: the pattern's rule, or B3/S23]
  --pattern <NAME>        Seed the grid with a built-in pattern
  --pattern-file <PATH>   Seed the grid with an RLE pattern file
  --log-file <PATH>       Write logs to PATH (filtered by RUST_LOG)
  -h, --help              Print this message
";

#[derive(Debug, Clone)]
pub struct Config {
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub tick_interval: Duration,
    /// Rule given on the command line, if any
    pub rules: Option<RuleSet>,
    pub pattern: Option<Pattern>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: None,
            cols: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
            rules: None,
            pattern: None,
            log_file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Help requested")]
    Help,

    #[error("Unknown option \"{0}\"")]
    UnknownFlag(String),

    #[error("Option {flag} expects a value")]
    MissingValue { flag: &'static str },

    #[error("Option {flag} expects a positive integer, got \"{value}\"")]
    InvalidNumber { flag: &'static str, value: String },

    #[error("Only one of --pattern and --pattern-file may be given")]
    ConflictingPatterns,

    #[error("Invalid rule: {0}")]
    Rule(#[from] RuleError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("Failed to read pattern file {path:?}: {source}")]
    ReadPattern {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Config {
    /// Parse `--key value` arguments, not including the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            let mut value = |flag: &'static str| args.next().ok_or(ConfigError::MissingValue { flag });

            match arg.as_str() {
                "-h" | "--help" => return Err(ConfigError::Help),
                "--rows" => config.rows = Some(positive("--rows", value("--rows")?)?),
                "--cols" => config.cols = Some(positive("--cols", value("--cols")?)?),
                "--tick-ms" => {
                    let ms = positive("--tick-ms", value("--tick-ms")?)?;
                    config.tick_interval = Duration::from_millis(ms as u64);
                }
                "--rule" => config.rules = Some(value("--rule")?.parse()?),
                "--pattern" => {
                    if config.pattern.is_some() {
                        return Err(ConfigError::ConflictingPatterns);
                    }

                    config.pattern = Some(Pattern::builtin(&value("--pattern")?)?);
                }
                "--pattern-file" => {
                    if config.pattern.is_some() {
                        return Err(ConfigError::ConflictingPatterns);
                    }

                    let path = PathBuf::from(value("--pattern-file")?);
                    let bytes = std::fs::read(&path)
                        .map_err(|source| ConfigError::ReadPattern { path, source })?;

                    let pattern = Pattern::from_rle(&bytes).map_err(PatternError::from)?;
                    config.pattern = Some(pattern);
                }
                "--log-file" => config.log_file = Some(PathBuf::from(value("--log-file")?)),
                _ => return Err(ConfigError::UnknownFlag(arg)),
            }
        }

        Ok(config)
    }

    /// Grid dimensions as `(rows, cols)`. Anything not configured is derived from the terminal
    /// size, the way a canvas is divided by its cell size.
    pub fn dimensions(&self, term_cols: ScreenSize, term_rows: ScreenSize) -> (usize, usize) {
        let rows = self
            .rows
            .unwrap_or_else(|| term_rows.saturating_sub(STATUS_LINES).max(1) as usize);
        let cols = self
            .cols
            .unwrap_or_else(|| (term_cols / CELL_WIDTH).max(1) as usize);

        (rows, cols)
    }
}

fn positive(flag: &'static str, value: String) -> Result<usize, ConfigError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { flag, value }),
    }
}
