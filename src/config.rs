use crate::error::CompilerError;
use crate::scanner::KeywordCase;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "SIMPCALC_CONFIG";
pub const DEFAULT_FILE_ENV: &str = "SIMPCALC_DEFAULT_FILE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Program checked when no file is given on the command line.
    pub default_file: PathBuf,
    pub keyword_case: KeywordCase,
    /// Process exit code after a syntax error.
    pub failure_exit_code: i32,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_file: PathBuf::from("sample1.txt"),
            keyword_case: KeywordCase::Exact,
            failure_exit_code: 1,
            log_filter: String::from("warn"),
        }
    }
}

impl Config {
    /// Loads the config from [`Config::get_config_path`], falling back to
    /// defaults when no file exists.
    pub fn load() -> Result<Self, CompilerError> {
        Self::load_from(Self::get_config_path())
    }

    pub fn load_from(config_path: PathBuf) -> Result<Self, CompilerError> {
        let mut config = match fs::read_to_string(&config_path) {
            Ok(contents) => Self::parse(&contents).map_err(|e| CompilerError::Config {
                path: config_path.clone(),
                message: e.to_string(),
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(CompilerError::IO(e)),
        };

        if let Ok(default_file) = env::var(DEFAULT_FILE_ENV) {
            config.default_file = PathBuf::from(default_file);
        }

        Ok(config)
    }

    pub fn parse(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }

    pub fn save(&self, config_path: &Path) -> io::Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(config_path, contents)
    }

    pub fn get_config_path() -> PathBuf {
        env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("simpcalc.json"))
    }
}
