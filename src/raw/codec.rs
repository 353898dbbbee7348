//! Binary encoding of [`RawMessage`]
//!
//! All integers are little-endian. The payload leads and a fixed trailer
//! closes the frame, so a receiver can split data from metadata without
//! parsing either:
//!
//! ```text
//! | data | metadata | datatype: i32 | metadata_len: u32 |
//! ```
//!
//! Metadata opens with the common header (`data_len: u32`,
//! `sequence_num: u64`, `ts.sec: i64`, `ts.nsec: i32`) followed by the
//! variant's own fields in declaration order. Booleans are one byte,
//! strings and vectors carry a `u32` count prefix.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;
use tracing::{debug, trace};

use super::{
    ChipTemperature, CpuUsage, CropConfig, CropRect, DatatypeKind, FormatConfig, MemoryInfo,
    PixelFormat, RawBuffer, RawCameraControl, RawDatatype, RawImageManipConfig, RawImgFrame,
    RawMessage, RawNNData, RawSystemInformation, ResizeConfig, Specs, StorageOrder,
    TensorDataType, TensorInfo, Timestamp,
};
use crate::{CodecConfig, CONFIG};

/// Size of the `datatype` + `metadata_len` trailer
pub const TRAILER_LEN: usize = 8;

/// Size of the common metadata header
pub const HEADER_LEN: usize = 24;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("message truncated while reading {0}")]
    Truncated(&'static str),

    #[error("unknown datatype tag {0}")]
    UnknownDatatype(i32),

    #[error("{field} declares {declared} bytes, {available} available")]
    LengthMismatch {
        field: &'static str,
        declared: usize,
        available: usize,
    },

    #[error("message of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("{count} tensors exceed the limit of {limit}")]
    TooManyTensors { count: usize, limit: usize },

    #[error("tensor name is not valid UTF-8")]
    InvalidUtf8,

    #[error("{0} unread bytes left in metadata")]
    TrailingBytes(usize),
}

type DecodeResult<T> = Result<T, DecodeError>;

fn wire_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl RawMessage {
    /// Serialize into one contiguous frame.
    ///
    /// Lengths are written as `u32`; a payload beyond 4 GiB encodes with a
    /// saturated length and is rejected by [`RawMessage::decode`].
    pub fn encode(&self) -> Bytes {
        match self {
            RawMessage::Buffer(m) => m.encode(),
            RawMessage::ImgFrame(m) => m.encode(),
            RawMessage::NNData(m) => m.encode(),
            RawMessage::ImageManipConfig(m) => m.encode(),
            RawMessage::CameraControl(m) => m.encode(),
            RawMessage::SystemInformation(m) => m.encode(),
        }
    }

    /// Parse a frame produced by [`RawMessage::encode`] using the global
    /// codec limits
    pub fn decode(frame: &[u8]) -> DecodeResult<Self> {
        let config = CONFIG.load();
        Self::decode_with(frame, &config.codec)
    }

    /// Parse a frame with explicit limits. Never panics on malformed input.
    pub fn decode_with(frame: &[u8], limits: &CodecConfig) -> DecodeResult<Self> {
        match decode_frame(frame, limits) {
            Ok(msg) => {
                trace!(datatype = %msg.kind(), len = frame.len(), "decoded message");
                metrics::counter!("visionwire_messages_decoded_total", "datatype" => msg.kind().as_str())
                    .increment(1);
                metrics::histogram!("visionwire_decoded_bytes").record(frame.len() as f64);
                Ok(msg)
            }
            Err(e) => {
                debug!("rejected {} byte frame: {}", frame.len(), e);
                metrics::counter!("visionwire_decode_errors_total").increment(1);
                Err(e)
            }
        }
    }
}

/// Borrowed encode behind [`RawDatatype::encode`]. The timestamp is
/// normalized on the way out so decode reproduces it exactly.
pub(crate) fn encode_raw<R: RawDatatype + Fields>(raw: &R) -> Bytes {
    let base = raw.buffer();
    let ts = Timestamp::new(base.ts.sec, i64::from(base.ts.nsec));
    let mut out = BytesMut::with_capacity(base.data.len() + HEADER_LEN + TRAILER_LEN + 64);
    out.put_slice(&base.data);

    let meta_start = out.len();
    out.put_u32_le(wire_len(base.data.len()));
    out.put_u64_le(base.sequence_num);
    out.put_i64_le(ts.sec);
    out.put_i32_le(ts.nsec);
    raw.put_fields(&mut out);
    let meta_len = out.len() - meta_start;

    out.put_i32_le(R::KIND.to_wire());
    out.put_u32_le(wire_len(meta_len));

    trace!(
        datatype = %R::KIND,
        data_len = base.data.len(),
        meta_len,
        "encoded message"
    );
    metrics::counter!("visionwire_messages_encoded_total", "datatype" => R::KIND.as_str())
        .increment(1);
    metrics::histogram!("visionwire_encoded_bytes").record(out.len() as f64);

    out.freeze()
}

fn decode_frame(frame: &[u8], limits: &CodecConfig) -> DecodeResult<RawMessage> {
    if frame.len() > limits.max_message_size {
        return Err(DecodeError::TooLarge {
            size: frame.len(),
            limit: limits.max_message_size,
        });
    }
    if frame.len() < TRAILER_LEN {
        return Err(DecodeError::Truncated("trailer"));
    }

    let (body, mut trailer) = frame.split_at(frame.len() - TRAILER_LEN);
    let tag = trailer.get_i32_le();
    let meta_len = trailer.get_u32_le() as usize;
    let kind = DatatypeKind::from_wire(tag).ok_or(DecodeError::UnknownDatatype(tag))?;

    if meta_len > body.len() {
        return Err(DecodeError::LengthMismatch {
            field: "metadata_len",
            declared: meta_len,
            available: body.len(),
        });
    }
    let (data, meta) = body.split_at(body.len() - meta_len);
    let mut src = Reader {
        buf: meta,
        max_tensors: limits.max_tensors,
    };

    let data_len = src.u32("data_len")? as usize;
    if data_len != data.len() {
        return Err(DecodeError::LengthMismatch {
            field: "data_len",
            declared: data_len,
            available: data.len(),
        });
    }
    let sequence_num = src.u64("sequence_num")?;
    let sec = src.i64("ts.sec")?;
    let nsec = src.i32("ts.nsec")?;
    let buffer = RawBuffer {
        data: data.to_vec(),
        sequence_num,
        ts: Timestamp::new(sec, i64::from(nsec)),
    };

    let msg = match kind {
        DatatypeKind::Buffer => RawMessage::Buffer(RawBuffer::get_fields(buffer, &mut src)?),
        DatatypeKind::ImgFrame => RawMessage::ImgFrame(RawImgFrame::get_fields(buffer, &mut src)?),
        DatatypeKind::NNData => RawMessage::NNData(RawNNData::get_fields(buffer, &mut src)?),
        DatatypeKind::ImageManipConfig => {
            RawMessage::ImageManipConfig(RawImageManipConfig::get_fields(buffer, &mut src)?)
        }
        DatatypeKind::CameraControl => {
            RawMessage::CameraControl(RawCameraControl::get_fields(buffer, &mut src)?)
        }
        DatatypeKind::SystemInformation => {
            RawMessage::SystemInformation(RawSystemInformation::get_fields(buffer, &mut src)?)
        }
    };

    if src.buf.has_remaining() {
        return Err(DecodeError::TrailingBytes(src.buf.remaining()));
    }
    Ok(msg)
}

/// Bounds-checked metadata reader
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    max_tensors: usize,
}

impl Reader<'_> {
    fn need(&self, n: usize, field: &'static str) -> DecodeResult<()> {
        if self.buf.remaining() < n {
            return Err(DecodeError::Truncated(field));
        }
        Ok(())
    }

    fn u8(&mut self, field: &'static str) -> DecodeResult<u8> {
        self.need(1, field)?;
        Ok(self.buf.get_u8())
    }

    fn bool(&mut self, field: &'static str) -> DecodeResult<bool> {
        Ok(self.u8(field)? != 0)
    }

    fn u32(&mut self, field: &'static str) -> DecodeResult<u32> {
        self.need(4, field)?;
        Ok(self.buf.get_u32_le())
    }

    fn i32(&mut self, field: &'static str) -> DecodeResult<i32> {
        self.need(4, field)?;
        Ok(self.buf.get_i32_le())
    }

    fn u64(&mut self, field: &'static str) -> DecodeResult<u64> {
        self.need(8, field)?;
        Ok(self.buf.get_u64_le())
    }

    fn i64(&mut self, field: &'static str) -> DecodeResult<i64> {
        self.need(8, field)?;
        Ok(self.buf.get_i64_le())
    }

    fn f32(&mut self, field: &'static str) -> DecodeResult<f32> {
        self.need(4, field)?;
        Ok(self.buf.get_f32_le())
    }

    fn string(&mut self, field: &'static str) -> DecodeResult<String> {
        let len = self.u32(field)? as usize;
        self.need(len, field)?;
        let bytes = self.buf[..len].to_vec();
        self.buf.advance(len);
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
    }

    fn u32_vec(&mut self, field: &'static str) -> DecodeResult<Vec<u32>> {
        let count = self.u32(field)? as usize;
        self.need(count.saturating_mul(4), field)?;
        Ok((0..count).map(|_| self.buf.get_u32_le()).collect())
    }
}

fn put_bool(dst: &mut BytesMut, value: bool) {
    dst.put_u8(u8::from(value));
}

fn put_u32_vec(dst: &mut BytesMut, values: &[u32]) {
    dst.put_u32_le(wire_len(values.len()));
    for v in values {
        dst.put_u32_le(*v);
    }
}

/// Variant specific metadata following the common header
pub(crate) trait Fields: Sized {
    fn put_fields(&self, dst: &mut BytesMut);
    fn get_fields(buffer: RawBuffer, src: &mut Reader<'_>) -> DecodeResult<Self>;
}

impl Fields for RawBuffer {
    fn put_fields(&self, _dst: &mut BytesMut) {}

    fn get_fields(buffer: RawBuffer, _src: &mut Reader<'_>) -> DecodeResult<Self> {
        Ok(buffer)
    }
}

impl Fields for RawImgFrame {
    fn put_fields(&self, dst: &mut BytesMut) {
        let fb = &self.fb;
        dst.put_u32_le(fb.format.to_wire());
        dst.put_u32_le(fb.width);
        dst.put_u32_le(fb.height);
        dst.put_u32_le(fb.stride);
        dst.put_u32_le(fb.bytes_pp);
        dst.put_u32_le(fb.p1_offset);
        dst.put_u32_le(fb.p2_offset);
        dst.put_u32_le(fb.p3_offset);
        dst.put_u32_le(self.category);
        dst.put_u32_le(self.instance_num);
    }

    fn get_fields(buffer: RawBuffer, src: &mut Reader<'_>) -> DecodeResult<Self> {
        let fb = Specs {
            format: PixelFormat::from_wire(src.u32("fb.type")?),
            width: src.u32("fb.width")?,
            height: src.u32("fb.height")?,
            stride: src.u32("fb.stride")?,
            bytes_pp: src.u32("fb.bytes_pp")?,
            p1_offset: src.u32("fb.p1_offset")?,
            p2_offset: src.u32("fb.p2_offset")?,
            p3_offset: src.u32("fb.p3_offset")?,
        };
        Ok(Self {
            buffer,
            fb,
            category: src.u32("category")?,
            instance_num: src.u32("instance_num")?,
        })
    }
}

impl Fields for RawNNData {
    fn put_fields(&self, dst: &mut BytesMut) {
        dst.put_u32_le(wire_len(self.tensors.len()));
        for t in &self.tensors {
            dst.put_u32_le(wire_len(t.name.len()));
            dst.put_slice(t.name.as_bytes());
            dst.put_i32_le(t.order.to_wire());
            dst.put_i32_le(t.data_type.to_wire());
            dst.put_u32_le(t.num_dimensions);
            put_u32_vec(dst, &t.dims);
            put_u32_vec(dst, &t.strides);
            dst.put_u32_le(t.offset);
        }
        dst.put_u32_le(self.batch_size);
    }

    fn get_fields(buffer: RawBuffer, src: &mut Reader<'_>) -> DecodeResult<Self> {
        let count = src.u32("tensors")? as usize;
        if count > src.max_tensors {
            return Err(DecodeError::TooManyTensors {
                count,
                limit: src.max_tensors,
            });
        }
        let mut tensors = Vec::with_capacity(count);
        for _ in 0..count {
            tensors.push(TensorInfo {
                name: src.string("tensor.name")?,
                order: StorageOrder::from_wire(src.i32("tensor.order")?),
                data_type: TensorDataType::from_wire(src.i32("tensor.data_type")?),
                num_dimensions: src.u32("tensor.num_dimensions")?,
                dims: src.u32_vec("tensor.dims")?,
                strides: src.u32_vec("tensor.strides")?,
                offset: src.u32("tensor.offset")?,
            });
        }
        Ok(Self {
            buffer,
            tensors,
            batch_size: src.u32("batch_size")?,
        })
    }
}

impl Fields for RawImageManipConfig {
    fn put_fields(&self, dst: &mut BytesMut) {
        put_bool(dst, self.enable_crop);
        put_bool(dst, self.enable_resize);
        put_bool(dst, self.enable_format);

        let crop = &self.crop_config;
        dst.put_f32_le(crop.crop_rect.xmin);
        dst.put_f32_le(crop.crop_rect.ymin);
        dst.put_f32_le(crop.crop_rect.xmax);
        dst.put_f32_le(crop.crop_rect.ymax);
        put_bool(dst, crop.enable_center_crop_rectangle);
        dst.put_f32_le(crop.crop_ratio);
        dst.put_f32_le(crop.width_height_aspect_ratio);

        let resize = &self.resize_config;
        dst.put_i32_le(resize.width);
        dst.put_i32_le(resize.height);
        put_bool(dst, resize.lock_aspect_ratio_fill);
        dst.put_u8(resize.bg_red);
        dst.put_u8(resize.bg_green);
        dst.put_u8(resize.bg_blue);

        dst.put_u32_le(self.format_config.format.to_wire());
        put_bool(dst, self.format_config.flip_horizontal);
    }

    fn get_fields(buffer: RawBuffer, src: &mut Reader<'_>) -> DecodeResult<Self> {
        let enable_crop = src.bool("enable_crop")?;
        let enable_resize = src.bool("enable_resize")?;
        let enable_format = src.bool("enable_format")?;
        let crop_config = CropConfig {
            crop_rect: CropRect {
                xmin: src.f32("crop.xmin")?,
                ymin: src.f32("crop.ymin")?,
                xmax: src.f32("crop.xmax")?,
                ymax: src.f32("crop.ymax")?,
            },
            enable_center_crop_rectangle: src.bool("crop.enable_center_crop_rectangle")?,
            crop_ratio: src.f32("crop.crop_ratio")?,
            width_height_aspect_ratio: src.f32("crop.width_height_aspect_ratio")?,
        };
        let resize_config = ResizeConfig {
            width: src.i32("resize.width")?,
            height: src.i32("resize.height")?,
            lock_aspect_ratio_fill: src.bool("resize.lock_aspect_ratio_fill")?,
            bg_red: src.u8("resize.bg_red")?,
            bg_green: src.u8("resize.bg_green")?,
            bg_blue: src.u8("resize.bg_blue")?,
        };
        let format_config = FormatConfig {
            format: PixelFormat::from_wire(src.u32("format.type")?),
            flip_horizontal: src.bool("format.flip_horizontal")?,
        };
        Ok(Self {
            buffer,
            enable_crop,
            enable_resize,
            enable_format,
            crop_config,
            resize_config,
            format_config,
        })
    }
}

impl Fields for RawCameraControl {
    fn put_fields(&self, dst: &mut BytesMut) {
        put_bool(dst, self.capture_still);
    }

    fn get_fields(buffer: RawBuffer, src: &mut Reader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            buffer,
            capture_still: src.bool("capture_still")?,
        })
    }
}

fn put_memory(dst: &mut BytesMut, m: &MemoryInfo) {
    dst.put_i64_le(m.remaining);
    dst.put_i64_le(m.used);
    dst.put_i64_le(m.total);
}

fn get_memory(src: &mut Reader<'_>) -> DecodeResult<MemoryInfo> {
    Ok(MemoryInfo {
        remaining: src.i64("memory.remaining")?,
        used: src.i64("memory.used")?,
        total: src.i64("memory.total")?,
    })
}

fn put_cpu(dst: &mut BytesMut, c: &CpuUsage) {
    dst.put_f32_le(c.average);
    dst.put_i32_le(c.ms_time);
}

fn get_cpu(src: &mut Reader<'_>) -> DecodeResult<CpuUsage> {
    Ok(CpuUsage {
        average: src.f32("cpu.average")?,
        ms_time: src.i32("cpu.ms_time")?,
    })
}

impl Fields for RawSystemInformation {
    fn put_fields(&self, dst: &mut BytesMut) {
        put_memory(dst, &self.ddr_memory_usage);
        put_memory(dst, &self.leon_css_memory_usage);
        put_memory(dst, &self.leon_mss_memory_usage);
        put_cpu(dst, &self.leon_css_cpu_usage);
        put_cpu(dst, &self.leon_mss_cpu_usage);
        let t = &self.chip_temperature;
        for v in [t.css, t.mss, t.upa, t.dss, t.average] {
            dst.put_f32_le(v);
        }
    }

    fn get_fields(buffer: RawBuffer, src: &mut Reader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            buffer,
            ddr_memory_usage: get_memory(src)?,
            leon_css_memory_usage: get_memory(src)?,
            leon_mss_memory_usage: get_memory(src)?,
            leon_css_cpu_usage: get_cpu(src)?,
            leon_mss_cpu_usage: get_cpu(src)?,
            chip_temperature: ChipTemperature {
                css: src.f32("temperature.css")?,
                mss: src.f32("temperature.mss")?,
                upa: src.f32("temperature.upa")?,
                dss: src.f32("temperature.dss")?,
                average: src.f32("temperature.average")?,
            },
        })
    }
}
