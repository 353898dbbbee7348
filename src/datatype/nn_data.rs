use half::f16;
use tracing::debug;

use crate::error::{Error, Result};
use crate::raw::{RawNNData, StorageOrder, TensorDataType, TensorInfo};
use crate::CONFIG;

typed_datatype!(
    /// Neural network tensors sharing one payload, addressed by name
    NNData,
    RawNNData
);

/// Values accepted by [`NNData::set_layer`]
///
/// Floats are stored as FP16, rounded to nearest even.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerData {
    U8(Vec<u8>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl LayerData {
    /// Stored element type
    pub fn data_type(&self) -> TensorDataType {
        match self {
            LayerData::U8(_) => TensorDataType::U8F,
            LayerData::I32(_) => TensorDataType::Int,
            LayerData::F32(_) | LayerData::F64(_) => TensorDataType::Fp16,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LayerData::U8(v) => v.len(),
            LayerData::I32(v) => v.len(),
            LayerData::F32(v) => v.len(),
            LayerData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            LayerData::U8(v) => out.extend_from_slice(v),
            LayerData::I32(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            LayerData::F32(v) => v
                .iter()
                .for_each(|x| out.extend_from_slice(&f16::from_f32(*x).to_le_bytes())),
            LayerData::F64(v) => v
                .iter()
                .for_each(|x| out.extend_from_slice(&f16::from_f64(*x).to_le_bytes())),
        }
    }
}

macro_rules! layer_data_from {
    ($t:ty, $variant:ident) => {
        impl From<Vec<$t>> for LayerData {
            fn from(value: Vec<$t>) -> Self {
                LayerData::$variant(value)
            }
        }

        impl From<&[$t]> for LayerData {
            fn from(value: &[$t]) -> Self {
                LayerData::$variant(value.to_vec())
            }
        }

        impl<const N: usize> From<[$t; N]> for LayerData {
            fn from(value: [$t; N]) -> Self {
                LayerData::$variant(value.to_vec())
            }
        }
    };
}

layer_data_from!(u8, U8);
layer_data_from!(i32, I32);
layer_data_from!(f32, F32);
layer_data_from!(f64, F64);

/// Offset and end of a tensor appended to a payload of `payload_len` bytes.
/// Both must stay within `u32`, which is all the directory can address.
fn layer_span(
    name: &str,
    payload_len: usize,
    count: usize,
    data_type: TensorDataType,
    alignment: usize,
) -> Result<(usize, usize)> {
    let offset = payload_len.checked_next_multiple_of(alignment);
    let end = offset.and_then(|o| {
        count
            .checked_mul(data_type.element_size())
            .and_then(|n| o.checked_add(n))
    });
    match (offset, end) {
        (Some(offset), Some(end)) if end <= u32::MAX as usize => Ok((offset, end)),
        _ => Err(Error::PayloadTooLarge {
            name: name.into(),
            size: end.unwrap_or(usize::MAX),
        }),
    }
}

impl NNData {
    /// Append a one dimensional tensor at the next aligned offset.
    ///
    /// Setting an existing name replaces its directory entry in place. The
    /// previous bytes stay in the payload unreferenced. Fails without
    /// touching the message if the payload would outgrow `u32::MAX` bytes.
    pub fn set_layer(
        &mut self,
        name: impl Into<String>,
        values: impl Into<LayerData>,
    ) -> Result<&mut Self> {
        let name = name.into();
        let values = values.into();
        let alignment = CONFIG.load().nn_data.tensor_alignment.max(1);
        let data_type = values.data_type();

        let data = &mut self.raw.buffer.data;
        let (offset, _) = layer_span(&name, data.len(), values.len(), data_type, alignment)?;
        data.resize(offset, 0);
        values.write_to(data);

        let info = TensorInfo {
            name,
            order: StorageOrder::C,
            data_type,
            num_dimensions: 1,
            dims: vec![values.len() as u32],
            strides: vec![data_type.element_size() as u32],
            offset: offset as u32,
        };
        match self.raw.tensors.iter_mut().find(|t| t.name == info.name) {
            Some(slot) => {
                debug!(name = %info.name, offset, "replacing layer");
                *slot = info;
            }
            None => self.raw.tensors.push(info),
        }
        Ok(self)
    }

    pub fn get_layer(&self, name: &str) -> Result<&TensorInfo> {
        self.raw
            .tensors
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::NotFound { name: name.into() })
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.raw.tensors.iter().any(|t| t.name == name)
    }

    /// Layer names in directory order
    pub fn get_all_layer_names(&self) -> Vec<&str> {
        self.raw.tensors.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn get_all_layers(&self) -> &[TensorInfo] {
        &self.raw.tensors
    }

    /// Whether `name` exists and holds `data_type`
    pub fn get_layer_datatype(&self, name: &str, data_type: TensorDataType) -> bool {
        self.get_layer(name)
            .is_ok_and(|t| t.data_type == data_type)
    }

    pub fn get_batch_size(&self) -> u32 {
        self.raw.batch_size
    }

    pub fn set_batch_size(&mut self, batch_size: u32) -> &mut Self {
        self.raw.batch_size = batch_size;
        self
    }

    /// U8F tensor bytes, borrowed from the payload
    pub fn get_layer_uint8(&self, name: &str) -> Result<&[u8]> {
        self.tensor_bytes(self.get_layer(name)?, TensorDataType::U8F)
    }

    /// FP16 tensor widened to f32
    pub fn get_layer_fp16(&self, name: &str) -> Result<Vec<f32>> {
        let bytes = self.tensor_bytes(self.get_layer(name)?, TensorDataType::Fp16)?;
        Ok(decode_fp16(bytes))
    }

    pub fn get_layer_int32(&self, name: &str) -> Result<Vec<i32>> {
        let bytes = self.tensor_bytes(self.get_layer(name)?, TensorDataType::Int)?;
        Ok(decode_int32(bytes))
    }

    pub fn get_first_layer_uint8(&self) -> Result<&[u8]> {
        self.tensor_bytes(self.first_layer()?, TensorDataType::U8F)
    }

    pub fn get_first_layer_fp16(&self) -> Result<Vec<f32>> {
        let bytes = self.tensor_bytes(self.first_layer()?, TensorDataType::Fp16)?;
        Ok(decode_fp16(bytes))
    }

    pub fn get_first_layer_int32(&self) -> Result<Vec<i32>> {
        let bytes = self.tensor_bytes(self.first_layer()?, TensorDataType::Int)?;
        Ok(decode_int32(bytes))
    }

    fn first_layer(&self) -> Result<&TensorInfo> {
        self.raw.tensors.first().ok_or(Error::EmptyDirectory)
    }

    fn tensor_bytes(&self, info: &TensorInfo, expected: TensorDataType) -> Result<&[u8]> {
        if info.data_type != expected {
            return Err(Error::TypeMismatch {
                name: info.name.clone(),
                expected,
                actual: info.data_type,
            });
        }
        let data = &self.raw.buffer.data;
        let offset = info.offset as usize;
        let len = info.byte_size();
        offset
            .checked_add(len)
            .and_then(|end| data.get(offset..end))
            .ok_or_else(|| Error::OutOfBounds {
                name: info.name.clone(),
                offset,
                len,
                available: data.len(),
            })
    }
}

fn decode_fp16(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|b| f16::from_le_bytes([b[0], b[1]]).to_f32())
        .collect()
}

fn decode_int32(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
