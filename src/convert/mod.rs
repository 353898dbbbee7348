//! Pluggable colorimetric conversion
//!
//! `ImgFrame::get_bgr_frame` handles channel reordering itself and defers
//! anything involving YUV math to a [`ColorConverter`] supplied by the
//! caller. [`SoftwareConverter`] is the portable implementation.

mod software;

use ndarray::{Array3, ArrayView2};

use crate::error::Result;
use crate::raw::PixelFormat;

pub use software::SoftwareConverter;

/// Conversions a [`ColorConverter`] may be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorConversion {
    /// I420: full Y plane, then quarter size U and V planes
    Yuv420pToBgr,
    /// Y plane, then interleaved U/V
    Nv12ToBgr,
    /// Y plane, then interleaved V/U
    Nv21ToBgr,
}

impl ColorConversion {
    /// Conversion to BGR for a frame stored as `format`, if it needs one
    pub fn to_bgr(format: PixelFormat) -> Option<Self> {
        match format {
            PixelFormat::Yuv420p => Some(ColorConversion::Yuv420pToBgr),
            PixelFormat::Nv12 => Some(ColorConversion::Nv12ToBgr),
            PixelFormat::Nv21 => Some(ColorConversion::Nv21ToBgr),
            _ => None,
        }
    }
}

/// Converts a 4:2:0 frame of shape `(h * 3 / 2, w)` into an interleaved
/// `(h, w, 3)` BGR array
pub trait ColorConverter: Send + Sync {
    fn convert(&self, input: ArrayView2<'_, u8>, conversion: ColorConversion) -> Result<Array3<u8>>;
}
