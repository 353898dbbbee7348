use super::RawBuffer;

/// Wire form of a camera control command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCameraControl {
    pub buffer: RawBuffer,
    pub capture_still: bool,
}
