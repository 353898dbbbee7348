use proptest::prelude::*;
use visionwire::datatype::ADatatype;
use visionwire::raw::{RawBuffer, RawMessage, RawNNData, TensorInfo, Timestamp};
use visionwire::{Buffer, ImgFrame, NNData, PixelFormat};

fn expected_shape(format: PixelFormat, w: usize, h: usize) -> Option<Vec<usize>> {
    match format {
        PixelFormat::Rgb888i
        | PixelFormat::Bgr888i
        | PixelFormat::RgbF16F16F16i
        | PixelFormat::BgrF16F16F16i => Some(vec![h, w, 3]),
        PixelFormat::Rgb888p
        | PixelFormat::Bgr888p
        | PixelFormat::RgbF16F16F16p
        | PixelFormat::BgrF16F16F16p => Some(vec![3, h, w]),
        PixelFormat::Yuv420p | PixelFormat::Nv12 | PixelFormat::Nv21 => Some(vec![h * 3 / 2, w]),
        PixelFormat::Raw8 | PixelFormat::Gray8 => Some(vec![h, w]),
        _ => None,
    }
}

fn any_format() -> impl Strategy<Value = PixelFormat> {
    prop::sample::select(PixelFormat::ALL.to_vec())
}

proptest! {
    #[test]
    fn test_frame_shape_matches_table(format in any_format(), w in 1u32..32, h in 1u32..32) {
        let element = format.element_type().size();
        let shape = expected_shape(format, w as usize, h as usize);
        let len = shape.as_ref().map_or(17, |s| s.iter().product::<usize>() * element);

        let mut frame = ImgFrame::new();
        frame.set_frame(vec![0; len], w, h, format);
        let view = frame.get_frame(false);

        match shape {
            Some(shape) => prop_assert_eq!(view.shape(), shape.as_slice()),
            None => prop_assert_eq!(view.shape(), &[len][..]),
        }
        let count: usize = view.shape().iter().product();
        prop_assert!(count * element <= frame.get_data().len());
    }

    #[test]
    fn test_zero_dimension_is_flat(
        format in any_format(),
        w in 0u32..8,
        data in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut frame = ImgFrame::new();
        frame.set_frame(data.clone(), w, 0, format);
        let view = frame.get_frame(false);
        prop_assert_eq!(view.shape(), &[data.len() / format.element_type().size()][..]);
    }

    #[test]
    fn test_set_data_round_trip(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut buf = Buffer::new();
        buf.set_data(data.clone());
        prop_assert_eq!(buf.get_data(), data.as_slice());
    }

    #[test]
    fn test_timestamp_round_trip(t in 0.0f64..1.0e6) {
        let mut buf = Buffer::new();
        buf.set_timestamp(t);
        prop_assert!((buf.get_timestamp() - t).abs() < 1e-9);
        prop_assert!(buf.get_timestamp_raw().is_normalized());
    }

    #[test]
    fn test_timestamp_normalizes(sec in -1_000_000i64..1_000_000, nsec in any::<i32>()) {
        let ts = Timestamp::new(sec, i64::from(nsec));
        prop_assert!(ts.is_normalized());
        prop_assert_eq!(
            i128::from(ts.sec) * 1_000_000_000 + i128::from(ts.nsec),
            i128::from(sec) * 1_000_000_000 + i128::from(nsec)
        );
    }

    #[test]
    fn test_layer_overwrite(
        first in prop::collection::vec(-100.0f32..100.0, 0..16),
        second in prop::collection::vec(-100.0f32..100.0, 0..16),
    ) {
        let mut nn = NNData::new();
        nn.set_layer("a", first).unwrap().set_layer("a", second.clone()).unwrap();
        prop_assert_eq!(nn.get_all_layer_names(), vec!["a"]);
        let stored = nn.get_layer_fp16("a").unwrap();
        prop_assert_eq!(stored.len(), second.len());
        for (got, want) in stored.iter().zip(&second) {
            // fp16 keeps 11 significant bits
            prop_assert!((got - want).abs() <= want.abs() / 1024.0 + 1e-3);
        }
    }

    #[test]
    fn test_decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..128)) {
        let _ = RawMessage::decode(&data);
    }

    #[test]
    fn test_nn_data_round_trip(
        names in prop::collection::btree_set("[a-z]{1,8}", 0..6),
        payload in prop::collection::vec(any::<u8>(), 0..64),
        seq in any::<u64>(),
    ) {
        let raw = RawNNData {
            buffer: RawBuffer { data: payload, sequence_num: seq, ts: Timestamp::new(5, 7) },
            tensors: names
                .into_iter()
                .map(|name| TensorInfo { name, dims: vec![2, 3], strides: vec![6, 2], num_dimensions: 2, ..Default::default() })
                .collect(),
            batch_size: 1,
        };
        let msg = RawMessage::from(raw);
        prop_assert_eq!(RawMessage::decode(&msg.encode()).unwrap(), msg);
    }
}
