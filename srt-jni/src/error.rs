//! Error types for the JVM glue

use crate::config::ConfigError;
use srt_bridge::TranslateError;
use srt_sys::LoadError;
use thiserror::Error;

/// Failures while reading or building JVM objects
#[derive(Debug, Error)]
pub enum GlueError {
    #[error("JNI call failed: {0}")]
    Jni(#[from] jni::errors::Error),

    #[error("Unexpected null {0}")]
    Null(&'static str),

    #[error("No bridge loaded")]
    NotLoaded,

    #[error("No managed enum class named {0}")]
    UnknownEnumClass(String),

    #[error("Cannot build a managed value from {0}")]
    UnsupportedValue(String),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Library load error: {0}")]
    Library(#[from] LoadError),
}

pub type Result<T> = std::result::Result<T, GlueError>;
