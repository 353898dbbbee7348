//! Message data model for camera and vision pipeline devices
//!
//! [`raw`] holds the wire structs and their byte encoding, [`datatype`] the
//! typed accessors built on top of them, and [`convert`] the pluggable
//! color conversion used by `ImgFrame::get_bgr_frame`.

pub mod convert;
pub mod datatype;
pub mod error;
pub mod raw;

use std::path::Path;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

pub use convert::{ColorConversion, ColorConverter, SoftwareConverter};
pub use datatype::{
    ADatatype, Buffer, CameraControl, FrameArray, ImageManipConfig, ImgFrame, LayerData, NNData,
    SystemInformation,
};
pub use error::{Error, Result};
pub use raw::codec::DecodeError;
pub use raw::{DatatypeKind, PixelFormat, RawMessage, StorageOrder, TensorDataType, Timestamp};

/// Global configuration that can be atomically swapped at runtime
pub static CONFIG: once_cell::sync::Lazy<ArcSwap<Config>> =
    once_cell::sync::Lazy::new(|| ArcSwap::from_pointee(Config::default()));

/// Library configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub nn_data: NnDataConfig,
    pub codec: CodecConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NnDataConfig {
    /// Byte alignment of each tensor appended by `NNData::set_layer`
    pub tensor_alignment: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Largest encoded frame `RawMessage::decode` accepts
    pub max_message_size: usize,
    pub max_tensors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for NnDataConfig {
    fn default() -> Self {
        // matches the device side tensor layout
        Self {
            tensor_alignment: 64,
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_message_size: 64 * 1024 * 1024,
            max_tensors: 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "visionwire=info".into(),
        }
    }
}

impl Config {
    /// Layer built-in defaults, an optional TOML file and `VISIONWIRE__*`
    /// environment variables, later sources winning.
    ///
    /// `VISIONWIRE__CODEC__MAX_TENSORS=16` overrides `codec.max_tensors`.
    pub fn load(path: Option<&Path>) -> std::result::Result<Self, config::ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Config::default())?);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder
            .add_source(
                config::Environment::with_prefix("VISIONWIRE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Publish this configuration process-wide
    pub fn install(self) {
        CONFIG.store(std::sync::Arc::new(self));
    }
}
