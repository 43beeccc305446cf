use dirs::config_dir;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::word_index::{DuplicatePolicy, DEFAULT_BUCKETS};

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default = "default_dictionary")]
    pub dictionary: PathBuf,
    #[serde(default = "default_buckets")]
    pub buckets: usize,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary: default_dictionary(),
            buckets: default_buckets(),
            duplicates: DuplicatePolicy::default(),
        }
    }
}

impl Config {
    /// Reads `path`, or the per-user config file when no path is given.
    ///
    /// A missing per-user file means defaults; a missing explicit file is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = default_config_path();
                if !p.exists() {
                    debug!("no config at {:?}, using defaults", p);
                    return Ok(Config::default());
                }
                p
            }
        };
        info!("reading config {:?}", path);
        let text = fs::read_to_string(&path)?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: PathBuf) -> Result<Config> {
        let mut config: Config =
            serde_json::from_str(text).map_err(|source| Error::Config { path, source })?;
        if let Some(dictionary) = expand_tilde(&config.dictionary) {
            config.dictionary = dictionary;
        }
        Ok(config)
    }
}

fn speller_dir() -> PathBuf {
    let mut path = config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("speller");
    path
}

fn default_config_path() -> PathBuf {
    speller_dir().join("config.json")
}

fn default_dictionary() -> PathBuf {
    speller_dir().join("dictionary.txt")
}

fn default_buckets() -> usize {
    DEFAULT_BUCKETS
}

pub fn expand_tilde<P: AsRef<Path>>(path_user_input: P) -> Option<PathBuf> {
    let p = path_user_input.as_ref();
    if !p.starts_with("~") {
        return Some(p.to_path_buf());
    }
    if p == Path::new("~") {
        return dirs::home_dir();
    }
    let rest = p.strip_prefix("~").ok()?;
    dirs::home_dir().map(|mut h| {
        if h == Path::new("/") {
            // Corner case: `h` root directory;
            // don't prepend extra `/`, just drop the tilde.
            rest.to_path_buf()
        } else {
            h.push(rest);
            h
        }
    })
}
