use super::RawBuffer;

/// Element type of a tensor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TensorDataType {
    /// Half precision float
    #[default]
    Fp16,
    /// Unsigned byte, normalized by the consumer
    U8F,
    /// Signed 32-bit integer
    Int,
    /// Single precision float
    Fp32,
    /// Signed byte
    I8,
    Unknown(i32),
}

impl TensorDataType {
    pub fn to_wire(self) -> i32 {
        match self {
            TensorDataType::Fp16 => 0,
            TensorDataType::U8F => 1,
            TensorDataType::Int => 2,
            TensorDataType::Fp32 => 3,
            TensorDataType::I8 => 4,
            TensorDataType::Unknown(v) => v,
        }
    }

    pub fn from_wire(value: i32) -> Self {
        match value {
            0 => TensorDataType::Fp16,
            1 => TensorDataType::U8F,
            2 => TensorDataType::Int,
            3 => TensorDataType::Fp32,
            4 => TensorDataType::I8,
            other => TensorDataType::Unknown(other),
        }
    }

    pub fn element_size(self) -> usize {
        match self {
            TensorDataType::Fp16 => 2,
            TensorDataType::U8F | TensorDataType::I8 | TensorDataType::Unknown(_) => 1,
            TensorDataType::Int | TensorDataType::Fp32 => 4,
        }
    }
}

/// Axis layout of a tensor, outermost axis first.
///
/// The wire value spells the axes as hex digits: N=4, C=3, H=2, W=1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StorageOrder {
    Nhwc,
    Nhcw,
    Nchw,
    Hwc,
    Chw,
    Whc,
    Hcw,
    Wch,
    Cwh,
    Nc,
    Cn,
    #[default]
    C,
    H,
    W,
    Unknown(i32),
}

impl StorageOrder {
    pub fn to_wire(self) -> i32 {
        match self {
            StorageOrder::Nhwc => 0x4213,
            StorageOrder::Nhcw => 0x4231,
            StorageOrder::Nchw => 0x4321,
            StorageOrder::Hwc => 0x213,
            StorageOrder::Chw => 0x321,
            StorageOrder::Whc => 0x123,
            StorageOrder::Hcw => 0x231,
            StorageOrder::Wch => 0x132,
            StorageOrder::Cwh => 0x312,
            StorageOrder::Nc => 0x43,
            StorageOrder::Cn => 0x34,
            StorageOrder::C => 0x3,
            StorageOrder::H => 0x2,
            StorageOrder::W => 0x1,
            StorageOrder::Unknown(v) => v,
        }
    }

    pub fn from_wire(value: i32) -> Self {
        match value {
            0x4213 => StorageOrder::Nhwc,
            0x4231 => StorageOrder::Nhcw,
            0x4321 => StorageOrder::Nchw,
            0x213 => StorageOrder::Hwc,
            0x321 => StorageOrder::Chw,
            0x123 => StorageOrder::Whc,
            0x231 => StorageOrder::Hcw,
            0x132 => StorageOrder::Wch,
            0x312 => StorageOrder::Cwh,
            0x43 => StorageOrder::Nc,
            0x34 => StorageOrder::Cn,
            0x3 => StorageOrder::C,
            0x2 => StorageOrder::H,
            0x1 => StorageOrder::W,
            other => StorageOrder::Unknown(other),
        }
    }

    /// Number of axes the order names
    pub fn rank(self) -> Option<usize> {
        match self {
            StorageOrder::Unknown(_) => None,
            known => {
                let mut v = known.to_wire();
                let mut rank = 0;
                while v != 0 {
                    rank += 1;
                    v >>= 4;
                }
                Some(rank)
            }
        }
    }
}

/// Metadata for one tensor stored in an NNData payload.
///
/// Holds no bytes itself; `offset` points into the owning message's data.
/// `strides` are in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TensorInfo {
    pub name: String,
    pub order: StorageOrder,
    pub data_type: TensorDataType,
    pub num_dimensions: u32,
    pub dims: Vec<u32>,
    pub strides: Vec<u32>,
    pub offset: u32,
}

impl TensorInfo {
    /// Bytes spanned by the tensor: the largest `dims[i] * strides[i]`
    pub fn byte_size(&self) -> usize {
        self.dims
            .iter()
            .zip(&self.strides)
            .map(|(d, s)| (*d as usize).saturating_mul(*s as usize))
            .max()
            .unwrap_or(0)
    }

    /// Element count implied by the byte span
    pub fn num_elements(&self) -> usize {
        self.byte_size() / self.data_type.element_size()
    }
}

/// Wire form of a neural network result or input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawNNData {
    pub buffer: RawBuffer,
    pub tensors: Vec<TensorInfo>,
    pub batch_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_order_wire_values() {
        let orders = [
            StorageOrder::Nhwc,
            StorageOrder::Nhcw,
            StorageOrder::Nchw,
            StorageOrder::Hwc,
            StorageOrder::Chw,
            StorageOrder::Whc,
            StorageOrder::Hcw,
            StorageOrder::Wch,
            StorageOrder::Cwh,
            StorageOrder::Nc,
            StorageOrder::Cn,
            StorageOrder::C,
            StorageOrder::H,
            StorageOrder::W,
        ];
        for order in orders {
            assert_eq!(StorageOrder::from_wire(order.to_wire()), order);
        }
        assert_eq!(StorageOrder::Nchw.to_wire(), 0x4321);
        assert_eq!(StorageOrder::from_wire(0x7777), StorageOrder::Unknown(0x7777));
    }

    #[test]
    fn test_storage_order_rank() {
        assert_eq!(StorageOrder::Nhwc.rank(), Some(4));
        assert_eq!(StorageOrder::Chw.rank(), Some(3));
        assert_eq!(StorageOrder::Nc.rank(), Some(2));
        assert_eq!(StorageOrder::W.rank(), Some(1));
        assert_eq!(StorageOrder::Unknown(0).rank(), None);
    }

    #[test]
    fn test_data_type_wire_values() {
        assert_eq!(TensorDataType::Fp16.to_wire(), 0);
        assert_eq!(TensorDataType::U8F.to_wire(), 1);
        assert_eq!(TensorDataType::Int.to_wire(), 2);
        assert_eq!(TensorDataType::Fp32.to_wire(), 3);
        assert_eq!(TensorDataType::I8.to_wire(), 4);
        assert_eq!(TensorDataType::from_wire(9), TensorDataType::Unknown(9));
    }

    #[test]
    fn test_byte_size_uses_largest_span() {
        // 1x3x4x4 NCHW fp16, strides in bytes
        let info = TensorInfo {
            name: "out".into(),
            order: StorageOrder::Nchw,
            data_type: TensorDataType::Fp16,
            num_dimensions: 4,
            dims: vec![1, 3, 4, 4],
            strides: vec![96, 32, 8, 2],
            offset: 0,
        };
        assert_eq!(info.byte_size(), 96);
        assert_eq!(info.num_elements(), 48);
    }

    #[test]
    fn test_dimensionless_tensor_is_empty() {
        let info = TensorInfo::default();
        assert_eq!(info.byte_size(), 0);
        assert_eq!(info.num_elements(), 0);
    }
}
