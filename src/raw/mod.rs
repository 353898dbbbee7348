//! Wire-format message structs
//!
//! These are the literal units exchanged with a device transport. Field
//! layout and every enumeration's numeric value are part of the protocol;
//! see [`codec`] for the byte encoding.

pub mod buffer;
pub mod camera_control;
pub mod codec;
pub mod image_manip_config;
pub mod img_frame;
pub mod nn_data;
pub mod system_information;

use std::fmt;

use bytes::Bytes;

pub use buffer::{RawBuffer, Timestamp};
pub use camera_control::RawCameraControl;
pub use image_manip_config::{
    CropConfig, CropRect, FormatConfig, RawImageManipConfig, ResizeConfig,
};
pub use img_frame::{ElementType, PixelFormat, RawImgFrame, Specs};
pub use nn_data::{RawNNData, StorageOrder, TensorDataType, TensorInfo};
pub use system_information::{ChipTemperature, CpuUsage, MemoryInfo, RawSystemInformation};

use crate::error::Error;

/// Message type tag carried in every encoded message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatatypeKind {
    Buffer,
    ImgFrame,
    NNData,
    ImageManipConfig,
    CameraControl,
    SystemInformation,
}

impl DatatypeKind {
    pub fn to_wire(self) -> i32 {
        match self {
            DatatypeKind::Buffer => 0,
            DatatypeKind::ImgFrame => 1,
            DatatypeKind::NNData => 2,
            DatatypeKind::ImageManipConfig => 3,
            DatatypeKind::CameraControl => 4,
            DatatypeKind::SystemInformation => 7,
        }
    }

    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(DatatypeKind::Buffer),
            1 => Some(DatatypeKind::ImgFrame),
            2 => Some(DatatypeKind::NNData),
            3 => Some(DatatypeKind::ImageManipConfig),
            4 => Some(DatatypeKind::CameraControl),
            7 => Some(DatatypeKind::SystemInformation),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DatatypeKind::Buffer => "Buffer",
            DatatypeKind::ImgFrame => "ImgFrame",
            DatatypeKind::NNData => "NNData",
            DatatypeKind::ImageManipConfig => "ImageManipConfig",
            DatatypeKind::CameraControl => "CameraControl",
            DatatypeKind::SystemInformation => "SystemInformation",
        }
    }
}

impl fmt::Display for DatatypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common surface of every wire struct: a tag and the embedded base buffer
pub trait RawDatatype:
    Clone + Default + fmt::Debug + Into<RawMessage> + TryFrom<RawMessage, Error = Error>
{
    const KIND: DatatypeKind;

    fn buffer(&self) -> &RawBuffer;
    fn buffer_mut(&mut self) -> &mut RawBuffer;

    /// Serialize without taking ownership; see [`RawMessage::encode`]
    fn encode(&self) -> Bytes;
}

/// Any wire message, as handed to or received from a transport
#[derive(Debug, Clone, PartialEq)]
pub enum RawMessage {
    Buffer(RawBuffer),
    ImgFrame(RawImgFrame),
    NNData(RawNNData),
    ImageManipConfig(RawImageManipConfig),
    CameraControl(RawCameraControl),
    SystemInformation(RawSystemInformation),
}

impl RawMessage {
    pub fn kind(&self) -> DatatypeKind {
        match self {
            RawMessage::Buffer(_) => DatatypeKind::Buffer,
            RawMessage::ImgFrame(_) => DatatypeKind::ImgFrame,
            RawMessage::NNData(_) => DatatypeKind::NNData,
            RawMessage::ImageManipConfig(_) => DatatypeKind::ImageManipConfig,
            RawMessage::CameraControl(_) => DatatypeKind::CameraControl,
            RawMessage::SystemInformation(_) => DatatypeKind::SystemInformation,
        }
    }

    pub fn buffer(&self) -> &RawBuffer {
        match self {
            RawMessage::Buffer(b) => b,
            RawMessage::ImgFrame(m) => &m.buffer,
            RawMessage::NNData(m) => &m.buffer,
            RawMessage::ImageManipConfig(m) => &m.buffer,
            RawMessage::CameraControl(m) => &m.buffer,
            RawMessage::SystemInformation(m) => &m.buffer,
        }
    }

    pub fn buffer_mut(&mut self) -> &mut RawBuffer {
        match self {
            RawMessage::Buffer(b) => b,
            RawMessage::ImgFrame(m) => &mut m.buffer,
            RawMessage::NNData(m) => &mut m.buffer,
            RawMessage::ImageManipConfig(m) => &mut m.buffer,
            RawMessage::CameraControl(m) => &mut m.buffer,
            RawMessage::SystemInformation(m) => &mut m.buffer,
        }
    }
}

impl RawDatatype for RawBuffer {
    const KIND: DatatypeKind = DatatypeKind::Buffer;

    fn buffer(&self) -> &RawBuffer {
        self
    }

    fn buffer_mut(&mut self) -> &mut RawBuffer {
        self
    }

    fn encode(&self) -> Bytes {
        codec::encode_raw(self)
    }
}

macro_rules! raw_datatype {
    ($raw:ty, $variant:ident) => {
        impl RawDatatype for $raw {
            const KIND: DatatypeKind = DatatypeKind::$variant;

            fn buffer(&self) -> &RawBuffer {
                &self.buffer
            }

            fn buffer_mut(&mut self) -> &mut RawBuffer {
                &mut self.buffer
            }

            fn encode(&self) -> Bytes {
                codec::encode_raw(self)
            }
        }
    };
}

raw_datatype!(RawImgFrame, ImgFrame);
raw_datatype!(RawNNData, NNData);
raw_datatype!(RawImageManipConfig, ImageManipConfig);
raw_datatype!(RawCameraControl, CameraControl);
raw_datatype!(RawSystemInformation, SystemInformation);

macro_rules! message_variant {
    ($raw:ty, $variant:ident) => {
        impl From<$raw> for RawMessage {
            fn from(value: $raw) -> Self {
                RawMessage::$variant(value)
            }
        }

        impl TryFrom<RawMessage> for $raw {
            type Error = Error;

            fn try_from(value: RawMessage) -> Result<Self, Self::Error> {
                match value {
                    RawMessage::$variant(raw) => Ok(raw),
                    other => Err(Error::WrongDatatype {
                        expected: <$raw as RawDatatype>::KIND,
                        actual: other.kind(),
                    }),
                }
            }
        }
    };
}

message_variant!(RawBuffer, Buffer);
message_variant!(RawImgFrame, ImgFrame);
message_variant!(RawNNData, NNData);
message_variant!(RawImageManipConfig, ImageManipConfig);
message_variant!(RawCameraControl, CameraControl);
message_variant!(RawSystemInformation, SystemInformation);
