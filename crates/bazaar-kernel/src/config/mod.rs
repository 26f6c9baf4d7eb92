//! Configuration file loading.
//!
//! Loads a configuration file in any format the `config` crate understands,
//! picking the format from the file extension and substituting `${VAR}`
//! environment references before parsing, so secrets can stay out of the file
//! itself. A bare `$word` is literal text; secrets often contain `$`.

use config::{Config as Cfg, File};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::LazyLock;

pub use config::FileFormat;

/// Why a configuration file could not be turned into a value.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Parse(String),

    #[error("no loader for configuration file '{0}'")]
    UnsupportedFormat(String),

    #[error("configuration does not match the expected shape: {0}")]
    Deserialize(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

static BRACED_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("braced env var pattern is valid")
});

/// File extensions (lowercase) and the format each one selects.
const EXTENSIONS: &[(&str, FileFormat)] = &[
    ("yaml", FileFormat::Yaml),
    ("yml", FileFormat::Yaml),
    ("toml", FileFormat::Toml),
    ("json", FileFormat::Json),
    ("ini", FileFormat::Ini),
    ("ron", FileFormat::Ron),
    ("json5", FileFormat::Json5),
];

/// Pick the file format from `path`'s extension, case-insensitively.
pub fn detect_format(path: &str) -> ConfigResult<FileFormat> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_string()))?;

    EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, format)| *format)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_string()))
}

/// Expand environment references in `content`.
///
/// Only the braced form `${VAR_NAME}` is recognised. References to unset
/// variables are left untouched.
pub fn substitute_env_vars(content: &str) -> String {
    BRACED_VAR
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Read `path`, expand environment references, and deserialize it as `T`.
///
/// ```rust,ignore
/// use bazaar_kernel::config::load_config;
///
/// #[derive(serde::Deserialize)]
/// struct ServerConfig {
///     port: u16,
///     jwt_secret: String,
/// }
///
/// let config: ServerConfig = load_config("gateway.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    from_str(&content, format)
}

/// Like [`load_config`] for content already in memory.
pub fn from_str<T>(content: &str, format: FileFormat) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let expanded = substitute_env_vars(content);

    Cfg::builder()
        .add_source(File::from_str(&expanded, format))
        .build()
        .map_err(|e| ConfigError::Parse(e.to_string()))?
        .try_deserialize()
        .map_err(|e| ConfigError::Deserialize(e.to_string()))
}
