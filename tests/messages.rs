use visionwire::datatype::ADatatype;
use visionwire::raw::{MemoryInfo, RawMessage};
use visionwire::{
    CameraControl, DecodeError, Error, ImageManipConfig, ImgFrame, NNData, PixelFormat,
    SoftwareConverter, SystemInformation, TensorDataType,
};

#[test]
fn test_rgb888p_scenario() {
    let mut frame = ImgFrame::new();
    frame.set_frame((0..24).collect(), 4, 2, PixelFormat::Rgb888p);
    let view = frame.get_frame(false);
    assert_eq!(view.shape(), &[3, 2, 4]);
    let pixels = view.as_u8().unwrap();
    assert_eq!(pixels.len(), 24);
    assert_eq!(pixels[[1, 0, 0]], 8);
}

#[test]
fn test_nv12_scenario() {
    let mut frame = ImgFrame::new();
    frame.set_frame(vec![128; 6], 2, 2, PixelFormat::Nv12);
    assert_eq!(frame.get_frame(false).shape(), &[3, 2]);

    let bgr = frame.get_bgr_frame(Some(&SoftwareConverter)).unwrap();
    assert_eq!(bgr.shape(), &[2, 2, 3]);
}

#[test]
fn test_set_resize_leaves_crop() {
    let mut cfg = ImageManipConfig::new();
    cfg.set_resize(300, 300);
    let raw = cfg.get_raw();
    assert!(raw.enable_resize);
    assert_eq!((raw.resize_config.width, raw.resize_config.height), (300, 300));
    assert!(!raw.enable_crop);
}

#[test]
fn test_nn_data_through_wire() {
    let mut nn = NNData::new();
    nn.set_layer("boxes", vec![0.25f32, 0.5, 0.75])
        .unwrap()
        .set_layer("labels", vec![3i32, 1])
        .unwrap()
        .set_batch_size(1)
        .set_sequence_num(12);

    let decoded = NNData::from_bytes(&nn.to_bytes()).unwrap();
    assert_eq!(decoded.get_all_layer_names(), vec!["boxes", "labels"]);
    assert_eq!(decoded.get_layer_fp16("boxes").unwrap(), vec![0.25, 0.5, 0.75]);
    assert!(decoded.get_layer_datatype("labels", TensorDataType::Int));
    assert_eq!(decoded.get_sequence_num(), 12);
}

#[test]
fn test_frame_through_wire() {
    let mut frame = ImgFrame::new();
    frame
        .set_frame(vec![1, 2, 3, 4, 5, 6], 2, 1, PixelFormat::Bgr888i)
        .set_category(4)
        .set_timestamp(100.125);

    let decoded = ImgFrame::from_bytes(&frame.to_bytes()).unwrap();
    assert_eq!(decoded, frame);
    assert_eq!(decoded.get_frame(false).shape(), &[1, 2, 3]);
}

#[test]
fn test_every_variant_round_trips() {
    let mut ctrl = CameraControl::new();
    ctrl.set_capture_still(true);
    let mut sys = SystemInformation::new();
    sys.set_leon_mss_memory_usage(MemoryInfo {
        remaining: 1,
        used: 2,
        total: 3,
    });
    let mut manip = ImageManipConfig::new();
    manip
        .set_center_crop(0.5, 1.5)
        .set_resize_thumbnail(10, 20, 1, 2, 3)
        .set_frame_type(PixelFormat::Gray8);

    let messages = [
        RawMessage::from(ctrl),
        RawMessage::from(sys),
        RawMessage::from(manip),
        RawMessage::from(ImgFrame::new()),
    ];
    for msg in messages {
        assert_eq!(RawMessage::decode(&msg.encode()).unwrap(), msg);
    }
}

#[test]
fn test_decoding_wrong_type() {
    let bytes = CameraControl::new().to_bytes();
    assert!(matches!(
        ImgFrame::from_bytes(&bytes),
        Err(Error::WrongDatatype { .. })
    ));
    assert!(matches!(
        ImgFrame::from_bytes(&bytes[..4]),
        Err(Error::Decode(DecodeError::Truncated(_)))
    ));
}
