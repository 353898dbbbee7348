use crate::raw::RawCameraControl;

typed_datatype!(
    /// Control message sent to a camera node
    CameraControl,
    RawCameraControl
);

impl CameraControl {
    /// Request a still capture
    pub fn set_capture_still(&mut self, capture: bool) -> &mut Self {
        self.raw.capture_still = capture;
        self
    }

    pub fn get_capture_still(&self) -> bool {
        self.raw.capture_still
    }
}
