use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";
const DEFAULT_BOUT_CAP: u32 = 500;

/// Root simulation configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimConfig {
    pub run_id: String,
    pub games: GamesConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let cfg: SimConfig = serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
            source,
            path: path_buf.clone(),
        })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.games.validate()?;
        validate_agents(&self.agents)?;
        self.outputs.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Resolve output templates (`{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// Game sampling configuration block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GamesConfig {
    pub seed: Option<u64>,
    pub count: usize,
    #[serde(default = "default_bout_cap")]
    pub bout_cap: u32,
}

impl GamesConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::NoGames);
        }
        if self.bout_cap == 0 {
            return Err(ValidationError::ZeroBoutCap);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Epistemic,
    Reckless,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.jsonl.trim().is_empty() {
            return Err(ValidationError::EmptyOutput("jsonl"));
        }
        if self.summary_md.trim().is_empty() {
            return Err(ValidationError::EmptyOutput("summary_md"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub bout_details: bool,
}

impl LoggingConfig {
    pub fn level(&self) -> Option<Level> {
        self.level
            .as_deref()
            .and_then(|raw| raw.parse::<Level>().ok())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self.level.as_deref() {
            Some(raw) if raw.parse::<Level>().is_err() => {
                Err(ValidationError::BadLevel(raw.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Output templates resolved into concrete paths.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid config at {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("run_id must not be empty")]
    EmptyRunId,
    #[error("run_id contains unsupported character {0:?}")]
    RunIdCharset(char),
    #[error("games.count must be at least 1")]
    NoGames,
    #[error("games.bout_cap must be at least 1")]
    ZeroBoutCap,
    #[error("exactly four agents are required, found {found}")]
    SeatCount { found: usize },
    #[error("agent name {0:?} is used more than once")]
    DuplicateAgentName(String),
    #[error("outputs.{0} must not be empty")]
    EmptyOutput(&'static str),
    #[error("unknown logging level {0:?}")]
    BadLevel(String),
}

fn default_bout_cap() -> u32 {
    DEFAULT_BOUT_CAP
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.is_empty() {
        return Err(ValidationError::EmptyRunId);
    }
    if let Some(bad) = run_id.chars().find(|c| !RUN_ID_ALLOWED.contains(*c)) {
        return Err(ValidationError::RunIdCharset(bad));
    }
    Ok(())
}

fn validate_agents(agents: &[AgentConfig]) -> Result<(), ValidationError> {
    if agents.len() != 4 {
        return Err(ValidationError::SeatCount {
            found: agents.len(),
        });
    }
    for (index, agent) in agents.iter().enumerate() {
        if agents[..index].iter().any(|other| other.name == agent.name) {
            return Err(ValidationError::DuplicateAgentName(agent.name.clone()));
        }
    }
    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}
