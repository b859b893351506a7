//! Bridge configuration
//!
//! Read once in `JNI_OnLoad`. A TOML file named by `SRT_BRIDGE_CONFIG` is
//! used when present, defaults otherwise; `SRT_LIBRARY_PATH` overrides the
//! library path either way.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a TOML configuration file
pub const CONFIG_ENV: &str = "SRT_BRIDGE_CONFIG";

/// Environment variable naming the libsrt shared object
pub const LIBRARY_ENV: &str = "SRT_LIBRARY_PATH";

/// Where libsrt is loaded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Explicit path; when set, `names` is not consulted
    pub path: Option<PathBuf>,
    /// File names handed to the dynamic loader, in order
    pub names: Vec<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        LibraryConfig {
            path: None,
            names: srt_sys::default_library_names(),
        }
    }
}

impl LibraryConfig {
    /// Candidates passed to the loader
    pub fn candidates(&self) -> Vec<OsString> {
        match &self.path {
            Some(path) => vec![path.clone().into_os_string()],
            None => self.names.iter().map(OsString::from).collect(),
        }
    }
}

const PACKAGE: &str = "com/github/thibaultbee/srtdroid";

/// JVM internal names of every managed class the bridge touches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    /// Runtime-control class (start up, clean up, log level)
    pub srt: String,
    pub socket: String,
    /// Error container (last error)
    pub error: String,
    pub error_type: String,
    pub sock_opt: String,
    pub sock_status: String,
    pub msg_ctrl: String,
    pub transtype: String,
    pub km_state: String,
    pub pair: String,
    pub inet_socket_address: String,
    pub protocol_family: String,
    pub epoll: String,
    pub epoll_opt: String,
    pub epoll_flag: String,
    /// Ready-socket record filled in by `uWait`
    pub epoll_event: String,
    /// Built from `SRT_TRACEBSTATS`; constructor arguments follow the C field order
    pub stats: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        ClassNames {
            srt: format!("{}/Srt", PACKAGE),
            socket: format!("{}/models/Socket", PACKAGE),
            error: format!("{}/models/Error", PACKAGE),
            error_type: format!("{}/enums/ErrorType", PACKAGE),
            sock_opt: format!("{}/enums/SockOpt", PACKAGE),
            sock_status: format!("{}/enums/SockStatus", PACKAGE),
            msg_ctrl: format!("{}/models/MsgCtrl", PACKAGE),
            transtype: format!("{}/enums/Transtype", PACKAGE),
            km_state: format!("{}/enums/KMState", PACKAGE),
            pair: "kotlin/Pair".to_string(),
            inet_socket_address: "java/net/InetSocketAddress".to_string(),
            protocol_family: "java/net/StandardProtocolFamily".to_string(),
            epoll: format!("{}/models/Epoll", PACKAGE),
            epoll_opt: format!("{}/enums/EpollOpt", PACKAGE),
            epoll_flag: format!("{}/enums/EpollFlag", PACKAGE),
            epoll_event: format!("{}/models/EpollEvent", PACKAGE),
            stats: format!("{}/models/Stats", PACKAGE),
        }
    }
}

impl ClassNames {
    /// Enum class whose simple name is `simple_name`
    pub fn enum_class(&self, simple_name: &str) -> Option<&str> {
        [
            &self.transtype,
            &self.km_state,
            &self.sock_status,
            &self.sock_opt,
            &self.error_type,
        ]
        .into_iter()
        .map(String::as_str)
        .find(|class| class.rsplit('/').next() == Some(simple_name))
    }
}

/// Host-side diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "info".to_string(),
        }
    }
}

/// Combined configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub library: LibraryConfig,
    pub classes: ClassNames,
    pub log: LogConfig,
}

impl BridgeConfig {
    /// Configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var_os(key))
    }

    /// Configuration from an arbitrary variable lookup
    pub fn load_with(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(path) = lookup(LIBRARY_ENV) {
            config.library.path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
