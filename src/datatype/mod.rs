//! Typed messages over the raw wire structs
//!
//! Every typed message owns exactly one raw struct. The shared surface lives
//! on [`ADatatype`]; format specific accessors live on each type.

use crate::error::{Error, Result};
use crate::raw::{RawBuffer, RawDatatype, RawMessage, Timestamp};

/// Declares a typed wrapper over a raw struct with the shared conversions
macro_rules! typed_datatype {
    ($(#[$meta:meta])* $name:ident, $raw:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            raw: $raw,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl $crate::datatype::ADatatype for $name {
            type Raw = $raw;

            fn get_raw(&self) -> &$raw {
                &self.raw
            }

            fn get_raw_mut(&mut self) -> &mut $raw {
                &mut self.raw
            }

            fn into_raw(self) -> $raw {
                self.raw
            }
        }

        impl From<$raw> for $name {
            fn from(raw: $raw) -> Self {
                Self { raw }
            }
        }

        impl From<$name> for $crate::raw::RawMessage {
            fn from(value: $name) -> Self {
                value.raw.into()
            }
        }

        impl TryFrom<$crate::raw::RawMessage> for $name {
            type Error = $crate::error::Error;

            fn try_from(value: $crate::raw::RawMessage) -> $crate::error::Result<Self> {
                <$raw>::try_from(value).map(Self::from)
            }
        }
    };
}

mod camera_control;
mod image_manip_config;
mod img_frame;
mod nn_data;
mod system_information;

pub use camera_control::CameraControl;
pub use image_manip_config::ImageManipConfig;
pub use img_frame::{FrameArray, ImgFrame};
pub use nn_data::{LayerData, NNData};
pub use system_information::SystemInformation;

/// Shared surface of every typed message
pub trait ADatatype: Sized + Into<RawMessage> {
    type Raw: RawDatatype;

    fn get_raw(&self) -> &Self::Raw;
    fn get_raw_mut(&mut self) -> &mut Self::Raw;
    fn into_raw(self) -> Self::Raw;

    /// Payload bytes, borrowed
    fn get_data(&self) -> &[u8] {
        &self.get_raw().buffer().data
    }

    /// Replace the payload. No validation against other fields.
    fn set_data(&mut self, data: Vec<u8>) -> &mut Self {
        self.get_raw_mut().buffer_mut().data = data;
        self
    }

    fn get_sequence_num(&self) -> u64 {
        self.get_raw().buffer().sequence_num
    }

    fn set_sequence_num(&mut self, sequence_num: u64) -> &mut Self {
        self.get_raw_mut().buffer_mut().sequence_num = sequence_num;
        self
    }

    /// Device timestamp in seconds
    fn get_timestamp(&self) -> f64 {
        self.get_raw().buffer().ts.as_secs_f64()
    }

    fn set_timestamp(&mut self, ts: f64) -> &mut Self {
        self.get_raw_mut().buffer_mut().ts = Timestamp::from_secs_f64(ts);
        self
    }

    fn get_timestamp_raw(&self) -> Timestamp {
        self.get_raw().buffer().ts
    }

    fn set_timestamp_raw(&mut self, ts: Timestamp) -> &mut Self {
        self.get_raw_mut().buffer_mut().ts = Timestamp::new(ts.sec, i64::from(ts.nsec));
        self
    }

    /// Encode for a transport. Borrows; the payload is copied once, into
    /// the frame.
    fn to_bytes(&self) -> bytes::Bytes {
        self.get_raw().encode()
    }

    /// Decode a frame and check it holds this message type
    fn from_bytes(frame: &[u8]) -> Result<Self>
    where
        Self: TryFrom<RawMessage, Error = Error>,
    {
        <Self as TryFrom<RawMessage>>::try_from(RawMessage::decode(frame)?)
    }
}

typed_datatype!(
    /// Untyped message: a payload with sequence number and timestamp
    Buffer,
    RawBuffer
);

impl Buffer {
    pub fn with_data(data: Vec<u8>) -> Self {
        RawBuffer::new(data).into()
    }
}
