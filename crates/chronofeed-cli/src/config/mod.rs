//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

use chronofeed::{FeedConfig, FeedError, FeedResult};

/// Overrides collected from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<String>,
    pub per_page: Option<usize>,
    pub max_depth: Option<usize>,
}

/// Resolve the config file path: explicit flag, `CHRONOFEED_CONFIG`, then
/// `./.chronofeed/config.json` if it exists.
pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }

    if let Ok(env_path) = std::env::var("CHRONOFEED_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    let cwd_config = PathBuf::from(".chronofeed/config.json");
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    None
}

/// Build the engine config. Flags beat environment, environment beats the
/// config file, the file beats defaults.
pub fn resolve_config(overrides: &ConfigOverrides) -> FeedResult<FeedConfig> {
    let mut config = match resolve_config_path(overrides.config_path.as_deref()) {
        Some(path) => {
            tracing::info!("Loading config: {}", path.display());
            FeedConfig::read_from_file(&path)?
        }
        None => FeedConfig::default(),
    };

    if let Some(per_page) = env_usize("CHRONOFEED_PER_PAGE")? {
        config.default_per_page = per_page;
    }
    if let Some(depth) = env_usize("CHRONOFEED_MAX_DEPTH")? {
        config.max_subevent_depth = depth;
    }

    if let Some(per_page) = overrides.per_page {
        config.default_per_page = per_page;
    }
    if let Some(depth) = overrides.max_depth {
        config.max_subevent_depth = depth;
    }

    config.validate()?;
    Ok(config)
}

fn env_usize(name: &str) -> FeedResult<Option<usize>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| FeedError::Config(format!("{name}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Location of the REPL history file.
pub fn history_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".chronofeed_history")
}
