use super::{PixelFormat, RawBuffer};

/// Crop rectangle in normalized coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CropRect {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

/// Either an explicit rectangle or a centered crop, picked by
/// `enable_center_crop_rectangle`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropConfig {
    pub crop_rect: CropRect,
    pub enable_center_crop_rectangle: bool,
    pub crop_ratio: f32,
    pub width_height_aspect_ratio: f32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            crop_rect: CropRect::default(),
            enable_center_crop_rectangle: false,
            crop_ratio: 1.0,
            width_height_aspect_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeConfig {
    pub width: i32,
    pub height: i32,
    /// Keep aspect ratio and pad with the background color
    pub lock_aspect_ratio_fill: bool,
    pub bg_red: u8,
    pub bg_green: u8,
    pub bg_blue: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatConfig {
    pub format: PixelFormat,
    pub flip_horizontal: bool,
}

/// Wire form of an image manipulation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawImageManipConfig {
    pub buffer: RawBuffer,
    pub enable_crop: bool,
    pub enable_resize: bool,
    pub enable_format: bool,
    pub crop_config: CropConfig,
    pub resize_config: ResizeConfig,
    pub format_config: FormatConfig,
}
