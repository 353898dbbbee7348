use super::RawBuffer;

/// Pixel formats understood by the device
///
/// Declaration order is the wire numbering (0..=32) and must not change.
/// Values from newer devices that this crate does not know decode to
/// `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Yuv422i,
    Yuv444p,
    Yuv420p,
    Yuv422p,
    Yuv400p,
    Rgba8888,
    Rgb161616,
    Rgb888p,
    Bgr888p,
    Rgb888i,
    Bgr888i,
    RgbF16F16F16p,
    BgrF16F16F16p,
    RgbF16F16F16i,
    BgrF16F16F16i,
    Gray8,
    GrayF16,
    Lut2,
    Lut4,
    Lut16,
    Raw16,
    Raw14,
    Raw12,
    Raw10,
    Raw8,
    Pack10,
    Pack12,
    Yuv444i,
    Nv12,
    Nv21,
    Bitstream,
    Hdr,
    #[default]
    None,
    Unknown(u32),
}

/// Scalar type of one frame element as exposed by shaped views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    U8,
    F16,
}

impl ElementType {
    pub fn size(self) -> usize {
        match self {
            ElementType::U8 => 1,
            ElementType::F16 => 2,
        }
    }
}

impl PixelFormat {
    /// Every known format in wire order
    pub const ALL: [PixelFormat; 33] = [
        PixelFormat::Yuv422i,
        PixelFormat::Yuv444p,
        PixelFormat::Yuv420p,
        PixelFormat::Yuv422p,
        PixelFormat::Yuv400p,
        PixelFormat::Rgba8888,
        PixelFormat::Rgb161616,
        PixelFormat::Rgb888p,
        PixelFormat::Bgr888p,
        PixelFormat::Rgb888i,
        PixelFormat::Bgr888i,
        PixelFormat::RgbF16F16F16p,
        PixelFormat::BgrF16F16F16p,
        PixelFormat::RgbF16F16F16i,
        PixelFormat::BgrF16F16F16i,
        PixelFormat::Gray8,
        PixelFormat::GrayF16,
        PixelFormat::Lut2,
        PixelFormat::Lut4,
        PixelFormat::Lut16,
        PixelFormat::Raw16,
        PixelFormat::Raw14,
        PixelFormat::Raw12,
        PixelFormat::Raw10,
        PixelFormat::Raw8,
        PixelFormat::Pack10,
        PixelFormat::Pack12,
        PixelFormat::Yuv444i,
        PixelFormat::Nv12,
        PixelFormat::Nv21,
        PixelFormat::Bitstream,
        PixelFormat::Hdr,
        PixelFormat::None,
    ];

    pub fn to_wire(self) -> u32 {
        match self {
            PixelFormat::Unknown(v) => v,
            known => Self::ALL
                .iter()
                .position(|f| *f == known)
                .map_or(u32::MAX, |i| i as u32),
        }
    }

    pub fn from_wire(value: u32) -> Self {
        Self::ALL
            .get(value as usize)
            .copied()
            .unwrap_or(PixelFormat::Unknown(value))
    }

    /// Element type of the shaped view `ImgFrame::get_frame` produces
    pub fn element_type(self) -> ElementType {
        match self {
            PixelFormat::RgbF16F16F16i
            | PixelFormat::BgrF16F16F16i
            | PixelFormat::RgbF16F16F16p
            | PixelFormat::BgrF16F16F16p => ElementType::F16,
            _ => ElementType::U8,
        }
    }

    /// Bytes per pixel within one plane; 0 for packed, LUT and compressed data
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Rgb888i | PixelFormat::Bgr888i | PixelFormat::Yuv444i => 3,
            PixelFormat::RgbF16F16F16i | PixelFormat::BgrF16F16F16i => 6,
            PixelFormat::Rgba8888 => 4,
            PixelFormat::Yuv422i
            | PixelFormat::Rgb161616
            | PixelFormat::RgbF16F16F16p
            | PixelFormat::BgrF16F16F16p
            | PixelFormat::GrayF16
            | PixelFormat::Raw16
            | PixelFormat::Raw14
            | PixelFormat::Raw12
            | PixelFormat::Raw10 => 2,
            PixelFormat::Yuv444p
            | PixelFormat::Yuv420p
            | PixelFormat::Yuv422p
            | PixelFormat::Yuv400p
            | PixelFormat::Rgb888p
            | PixelFormat::Bgr888p
            | PixelFormat::Gray8
            | PixelFormat::Raw8
            | PixelFormat::Nv12
            | PixelFormat::Nv21 => 1,
            PixelFormat::Lut2
            | PixelFormat::Lut4
            | PixelFormat::Lut16
            | PixelFormat::Pack10
            | PixelFormat::Pack12
            | PixelFormat::Bitstream
            | PixelFormat::Hdr
            | PixelFormat::None
            | PixelFormat::Unknown(_) => 0,
        }
    }

    /// Bytes in one row of the first plane
    pub fn row_stride(self, width: u32) -> u32 {
        match self {
            PixelFormat::Pack10 => width.saturating_mul(10).div_ceil(8),
            PixelFormat::Pack12 => width.saturating_mul(12).div_ceil(8),
            PixelFormat::Lut2 => width.div_ceil(8),
            PixelFormat::Lut4 => width.div_ceil(4),
            PixelFormat::Lut16 => width.div_ceil(2),
            other => other.bytes_per_pixel().saturating_mul(width),
        }
    }
}

/// Frame buffer description carried with every image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Specs {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub bytes_pp: u32,
    pub p1_offset: u32,
    pub p2_offset: u32,
    pub p3_offset: u32,
}

impl Specs {
    /// Tightly packed layout for `format`, planes laid out back to back
    pub fn packed(format: PixelFormat, width: u32, height: u32) -> Self {
        let stride = format.row_stride(width);
        let plane = stride.saturating_mul(height);
        let (p2_offset, p3_offset) = match format {
            PixelFormat::Rgb888p
            | PixelFormat::Bgr888p
            | PixelFormat::RgbF16F16F16p
            | PixelFormat::BgrF16F16F16p
            | PixelFormat::Rgb161616
            | PixelFormat::Yuv444p => (plane, plane.saturating_mul(2)),
            PixelFormat::Yuv422p => (plane, plane.saturating_add(plane / 2)),
            PixelFormat::Yuv420p => (plane, plane.saturating_add(plane / 4)),
            PixelFormat::Nv12 | PixelFormat::Nv21 => (plane, plane),
            _ => (0, 0),
        };
        Self {
            format,
            width,
            height,
            stride,
            bytes_pp: format.bytes_per_pixel(),
            p1_offset: 0,
            p2_offset,
            p3_offset,
        }
    }
}

/// Wire form of an image frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawImgFrame {
    pub buffer: RawBuffer,
    pub fb: Specs,
    pub category: u32,
    pub instance_num: u32,
}
