use half::f16;
use ndarray::{Array, Array1, ArrayView, ArrayViewD, Axis, CowArray, Ix2, IxDyn};
use tracing::trace;

use crate::convert::{ColorConversion, ColorConverter};
use crate::error::{Error, Result};
use crate::raw::{ElementType, PixelFormat, RawImgFrame, Specs};

typed_datatype!(
    /// Image frame with pixel format aware array views
    ImgFrame,
    RawImgFrame
);

/// Shaped view of a frame's pixels
#[derive(Debug, Clone, PartialEq)]
pub enum FrameArray<'a> {
    U8(CowArray<'a, u8, IxDyn>),
    F16(CowArray<'a, f16, IxDyn>),
}

impl FrameArray<'_> {
    pub fn shape(&self) -> &[usize] {
        match self {
            FrameArray::U8(a) => a.shape(),
            FrameArray::F16(a) => a.shape(),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            FrameArray::U8(_) => ElementType::U8,
            FrameArray::F16(_) => ElementType::F16,
        }
    }

    /// Whether the array aliases the frame's buffer
    pub fn is_view(&self) -> bool {
        match self {
            FrameArray::U8(a) => a.is_view(),
            FrameArray::F16(a) => a.is_view(),
        }
    }

    pub fn as_u8(&self) -> Option<ArrayViewD<'_, u8>> {
        match self {
            FrameArray::U8(a) => Some(a.view()),
            FrameArray::F16(_) => None,
        }
    }

    pub fn as_f16(&self) -> Option<ArrayViewD<'_, f16>> {
        match self {
            FrameArray::U8(_) => None,
            FrameArray::F16(a) => Some(a.view()),
        }
    }

    /// Detach from the frame's buffer
    pub fn into_owned<'b>(self) -> FrameArray<'b> {
        match self {
            FrameArray::U8(a) => FrameArray::U8(a.into_owned().into()),
            FrameArray::F16(a) => FrameArray::F16(a.into_owned().into()),
        }
    }
}

/// Array shape a format decodes to, `None` for formats exposed as flat bytes
fn format_shape(format: PixelFormat, width: usize, height: usize) -> Option<Vec<usize>> {
    match format {
        PixelFormat::Rgb888i
        | PixelFormat::Bgr888i
        | PixelFormat::RgbF16F16F16i
        | PixelFormat::BgrF16F16F16i => Some(vec![height, width, 3]),
        PixelFormat::Rgb888p
        | PixelFormat::Bgr888p
        | PixelFormat::RgbF16F16F16p
        | PixelFormat::BgrF16F16F16p => Some(vec![3, height, width]),
        PixelFormat::Yuv420p | PixelFormat::Nv12 | PixelFormat::Nv21 => {
            Some(vec![height.saturating_mul(3) / 2, width])
        }
        PixelFormat::Raw8 | PixelFormat::Gray8 => Some(vec![height, width]),
        _ => None,
    }
}

fn decode_f16(bytes: &[u8]) -> Vec<f16> {
    bytes
        .chunks_exact(2)
        .map(|b| f16::from_le_bytes([b[0], b[1]]))
        .collect()
}

fn shaped_u8<'a>(bytes: &'a [u8], shape: &[usize]) -> CowArray<'a, u8, IxDyn> {
    match ArrayView::from_shape(IxDyn(shape), bytes) {
        Ok(view) => view.into(),
        Err(_) => ArrayView::from(bytes).into_dyn().into(),
    }
}

fn shaped_f16<'a>(bytes: &'a [u8], shape: &[usize]) -> CowArray<'a, f16, IxDyn> {
    if cfg!(target_endian = "little") {
        if let Ok(values) = bytemuck::try_cast_slice::<u8, f16>(bytes) {
            if let Ok(view) = ArrayView::from_shape(IxDyn(shape), values) {
                return view.into();
            }
        }
    }
    // misaligned or big endian host
    match Array::from_shape_vec(IxDyn(shape), decode_f16(bytes)) {
        Ok(array) => array.into(),
        Err(_) => Array1::from(decode_f16(bytes)).into_dyn().into(),
    }
}

impl ImgFrame {
    /// Array shape of this frame, or `None` when the format has no shape or
    /// the header disagrees with the payload
    pub fn frame_shape(&self) -> Option<Vec<usize>> {
        let fb = &self.raw.fb;
        if fb.width == 0 || fb.height == 0 {
            return None;
        }
        let shape = format_shape(fb.format, fb.width as usize, fb.height as usize)?;
        let bytes = shape
            .iter()
            .try_fold(fb.format.element_type().size(), |acc, d| acc.checked_mul(*d))?;
        (bytes <= self.raw.buffer.data.len()).then_some(shape)
    }

    /// Pixels shaped per the pixel format.
    ///
    /// Formats without a shape, and frames whose header does not fit the
    /// payload, come back as a flat array over the whole buffer. This never
    /// fails. With `deep_copy` the result owns its data; otherwise it
    /// borrows the frame where the element type allows.
    pub fn get_frame(&self, deep_copy: bool) -> FrameArray<'_> {
        let frame = self.view();
        if deep_copy {
            frame.into_owned()
        } else {
            frame
        }
    }

    fn view(&self) -> FrameArray<'_> {
        let data = &self.raw.buffer.data;
        let fb = &self.raw.fb;
        let element = fb.format.element_type();
        let shape = match self.frame_shape() {
            Some(shape) => shape,
            None => {
                if format_shape(fb.format, 1, 1).is_some() {
                    trace!(
                        format = ?fb.format,
                        width = fb.width,
                        height = fb.height,
                        len = data.len(),
                        "frame header does not fit payload, using flat view"
                    );
                    metrics::counter!("visionwire_frame_shape_fallbacks_total").increment(1);
                }
                vec![data.len() / element.size()]
            }
        };
        let len = shape.iter().product::<usize>() * element.size();
        match element {
            ElementType::U8 => FrameArray::U8(shaped_u8(&data[..len], &shape)),
            ElementType::F16 => FrameArray::F16(shaped_f16(&data[..len], &shape)),
        }
    }

    /// Interleaved BGR pixels, always owned.
    ///
    /// Planar and RGB layouts are reordered here. YUV 4:2:0 formats need a
    /// `converter`, failing with [`Error::UnavailableCapability`] without
    /// one. Other formats, and frames that fall back to the flat view, are
    /// returned unchanged.
    pub fn get_bgr_frame(
        &self,
        converter: Option<&dyn ColorConverter>,
    ) -> Result<FrameArray<'static>> {
        let format = self.raw.fb.format;
        let shape = match self.frame_shape() {
            Some(shape) if format.element_type() == ElementType::U8 => shape,
            _ => return Ok(self.view().into_owned()),
        };
        let len = shape.iter().product::<usize>();
        let pixels = shaped_u8(&self.raw.buffer.data[..len], &shape);
        let pixels = pixels.view();

        let bgr = match format {
            PixelFormat::Bgr888p => pixels
                .permuted_axes(IxDyn(&[1, 2, 0]))
                .as_standard_layout()
                .into_owned(),
            PixelFormat::Rgb888p => {
                let mut v = pixels.permuted_axes(IxDyn(&[1, 2, 0]));
                v.invert_axis(Axis(2));
                v.as_standard_layout().into_owned()
            }
            PixelFormat::Rgb888i => {
                let mut v = pixels;
                v.invert_axis(Axis(2));
                v.as_standard_layout().into_owned()
            }
            other => {
                let Some(conversion) = ColorConversion::to_bgr(other) else {
                    return Ok(self.view().into_owned());
                };
                let converter =
                    converter.ok_or(Error::UnavailableCapability("YUV to BGR conversion"))?;
                let planes = pixels
                    .into_dimensionality::<Ix2>()
                    .map_err(|e| Error::Conversion(e.to_string()))?;
                converter.convert(planes, conversion)?.into_dyn()
            }
        };
        Ok(FrameArray::U8(bgr.into()))
    }

    pub fn get_width(&self) -> u32 {
        self.raw.fb.width
    }

    pub fn set_width(&mut self, width: u32) -> &mut Self {
        self.raw.fb.width = width;
        self
    }

    pub fn get_height(&self) -> u32 {
        self.raw.fb.height
    }

    pub fn set_height(&mut self, height: u32) -> &mut Self {
        self.raw.fb.height = height;
        self
    }

    pub fn get_type(&self) -> PixelFormat {
        self.raw.fb.format
    }

    pub fn set_type(&mut self, format: PixelFormat) -> &mut Self {
        self.raw.fb.format = format;
        self
    }

    pub fn get_stride(&self) -> u32 {
        self.raw.fb.stride
    }

    pub fn set_stride(&mut self, stride: u32) -> &mut Self {
        self.raw.fb.stride = stride;
        self
    }

    pub fn get_instance_num(&self) -> u32 {
        self.raw.instance_num
    }

    pub fn set_instance_num(&mut self, instance_num: u32) -> &mut Self {
        self.raw.instance_num = instance_num;
        self
    }

    pub fn get_category(&self) -> u32 {
        self.raw.category
    }

    pub fn set_category(&mut self, category: u32) -> &mut Self {
        self.raw.category = category;
        self
    }

    pub fn get_specs(&self) -> &Specs {
        &self.raw.fb
    }

    /// Replace pixels and header together with a tightly packed layout.
    /// Nothing checks that `data` matches the dimensions.
    pub fn set_frame(
        &mut self,
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> &mut Self {
        self.raw.buffer.data = data;
        self.raw.fb = Specs::packed(format, width, height);
        self
    }
}
