use std::{collections::HashSet, env, fs, path::Path, str::FromStr};

use ini::ParseOption;
use thiserror::Error;

/// The AWS region the source buckets live in.
pub const REGION: &str = "us-west-2";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("section [{0}] appears more than once")]
    DuplicateSection(String),
    #[error("key '{key}' appears more than once in section [{section}]")]
    DuplicateKey { section: String, key: String },
    #[error("missing section [{0}]")]
    MissingSection(String),
    #[error("missing key '{key}' in section [{section}]")]
    MissingKey { section: String, key: String },
    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

impl From<ini::ParseError> for ConfigError {
    fn from(e: ini::ParseError) -> Self {
        ConfigError::Malformed {
            line: e.line,
            reason: e.msg.to_string(),
        }
    }
}

/// A parsed INI file.  Section names are case-sensitive, keys are not.  A
/// repeated section or a repeated key within a section is an error.
#[derive(Debug, Clone)]
pub struct Ini {
    inner: ini::Ini,
}

impl Ini {
    fn check_duplicates(&self) -> Result<(), ConfigError> {
        let mut sections = HashSet::new();
        for (name, props) in self.inner.iter() {
            let Some(name) = name else { continue };
            if !sections.insert(name) {
                return Err(ConfigError::DuplicateSection(name.to_string()));
            }
            let mut keys = HashSet::new();
            for (key, _) in props.iter() {
                if !keys.insert(key.to_lowercase()) {
                    return Err(ConfigError::DuplicateKey {
                        section: name.to_string(),
                        key: key.to_lowercase(),
                    });
                }
            }
        }
        Ok(())
    }

    fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        self.inner
            .iter()
            .filter(|(name, _)| *name == Some(section))
            .flat_map(|(_, props)| props.iter())
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.inner.iter().any(|(n, _)| n == Some(name))
    }

    /// Look up a key, falling back to the `[DEFAULT]` section.
    pub fn get(&self, section: &str, key: &str) -> Result<&str, ConfigError> {
        if !self.has_section(section) {
            return Err(ConfigError::MissingSection(section.to_string()));
        }
        self.lookup(section, key)
            .or_else(|| self.lookup("DEFAULT", key))
            .ok_or(ConfigError::MissingKey {
                section: section.to_string(),
                key: key.to_lowercase(),
            })
    }

    /// Replace values with `DWH_<SECTION>_<KEY>` environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        let overrides: Vec<(String, String, String)> = self
            .inner
            .iter()
            .filter_map(|(name, props)| name.map(|n| (n, props)))
            .flat_map(|(name, props)| {
                props.iter().filter_map(move |(key, _)| {
                    let var = format!("DWH_{}_{}", name, key).to_uppercase();
                    env::var(&var)
                        .ok()
                        .map(|v| (name.to_string(), key.to_string(), v))
                })
            })
            .collect();
        for (section, key, value) in overrides {
            self.inner.set_to(Some(section), key, value);
        }
    }
}

impl FromStr for Ini {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // quotes are stripped, backslashes are kept as written
        let opt = ParseOption {
            enabled_quote: true,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini {
            inner: ini::Ini::load_from_str_opt(s, opt)?,
        };
        ini.check_duplicates()?;
        Ok(ini)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    pub host: String,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub db_port: u16,
}

impl ClusterConfig {
    /// Connection parameters in the order the client expects them:
    /// host, dbname, user, password, port.
    pub fn params(&self) -> [(&'static str, String); 5] {
        [
            ("host", self.host.clone()),
            ("dbname", self.db_name.clone()),
            ("user", self.db_user.clone()),
            ("password", self.db_password.clone()),
            ("port", self.db_port.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct S3Config {
    pub log_data: String,
    pub song_data: String,
    pub log_jsonpath: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IamRoleConfig {
    pub arn: String,
}

/// Everything a run needs.  Loaded once in `main` and passed down.
#[derive(Debug, Clone, PartialEq)]
pub struct DwhConfig {
    pub cluster: ClusterConfig,
    pub s3: S3Config,
    pub iam_role: IamRoleConfig,
}

impl DwhConfig {
    /// Read the config file and apply `DWH_*` environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DwhConfig, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut ini = content.parse::<Ini>()?;
        ini.apply_env_overrides();
        DwhConfig::from_ini(&ini)
    }

    pub fn from_ini(ini: &Ini) -> Result<DwhConfig, ConfigError> {
        let port = ini.get("CLUSTER", "DB_PORT")?;
        Ok(DwhConfig {
            cluster: ClusterConfig {
                host: ini.get("CLUSTER", "HOST")?.to_string(),
                db_name: ini.get("CLUSTER", "DB_NAME")?.to_string(),
                db_user: ini.get("CLUSTER", "DB_USER")?.to_string(),
                db_password: ini.get("CLUSTER", "DB_PASSWORD")?.to_string(),
                db_port: port
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort(port.to_string()))?,
            },
            s3: S3Config {
                log_data: ini.get("S3", "LOG_DATA")?.to_string(),
                song_data: ini.get("S3", "SONG_DATA")?.to_string(),
                log_jsonpath: ini.get("S3", "LOG_JSONPATH")?.to_string(),
            },
            iam_role: IamRoleConfig {
                arn: ini.get("IAM_ROLE", "ARN")?.to_string(),
            },
        })
    }
}

impl FromStr for DwhConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DwhConfig::from_ini(&s.parse::<Ini>()?)
    }
}
