use crate::raw::{CropRect, PixelFormat, RawImageManipConfig};

typed_datatype!(
    /// Crop, resize and format instructions for an image manipulation node
    ImageManipConfig,
    RawImageManipConfig
);

impl ImageManipConfig {
    /// Crop to a normalized rectangle
    pub fn set_crop_rect(&mut self, xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> &mut Self {
        self.raw.enable_crop = true;
        self.raw.crop_config.enable_center_crop_rectangle = false;
        self.raw.crop_config.crop_rect = CropRect {
            xmin,
            ymin,
            xmax,
            ymax,
        };
        self
    }

    /// Crop a centered window covering `ratio` of the frame with the given
    /// width to height ratio
    pub fn set_center_crop(&mut self, ratio: f32, wh_ratio: f32) -> &mut Self {
        self.raw.enable_crop = true;
        self.raw.crop_config.enable_center_crop_rectangle = true;
        self.raw.crop_config.crop_ratio = ratio;
        self.raw.crop_config.width_height_aspect_ratio = wh_ratio;
        self
    }

    /// Resize, stretching to fit. Leaves any crop untouched.
    pub fn set_resize(&mut self, width: i32, height: i32) -> &mut Self {
        self.raw.enable_resize = true;
        self.raw.resize_config.width = width;
        self.raw.resize_config.height = height;
        self.raw.resize_config.lock_aspect_ratio_fill = false;
        self
    }

    /// Resize keeping the aspect ratio, padding with the background color
    pub fn set_resize_thumbnail(
        &mut self,
        width: i32,
        height: i32,
        bg_red: u8,
        bg_green: u8,
        bg_blue: u8,
    ) -> &mut Self {
        self.raw.enable_resize = true;
        let resize = &mut self.raw.resize_config;
        resize.width = width;
        resize.height = height;
        resize.lock_aspect_ratio_fill = true;
        resize.bg_red = bg_red;
        resize.bg_green = bg_green;
        resize.bg_blue = bg_blue;
        self
    }

    pub fn set_frame_type(&mut self, format: PixelFormat) -> &mut Self {
        self.raw.enable_format = true;
        self.raw.format_config.format = format;
        self
    }

    pub fn set_horizontal_flip(&mut self, flip: bool) -> &mut Self {
        self.raw.enable_format = true;
        self.raw.format_config.flip_horizontal = flip;
        self
    }

    pub fn get_crop_x_min(&self) -> f32 {
        self.raw.crop_config.crop_rect.xmin
    }

    pub fn get_crop_y_min(&self) -> f32 {
        self.raw.crop_config.crop_rect.ymin
    }

    pub fn get_crop_x_max(&self) -> f32 {
        self.raw.crop_config.crop_rect.xmax
    }

    pub fn get_crop_y_max(&self) -> f32 {
        self.raw.crop_config.crop_rect.ymax
    }

    pub fn get_resize_width(&self) -> i32 {
        self.raw.resize_config.width
    }

    pub fn get_resize_height(&self) -> i32 {
        self.raw.resize_config.height
    }

    pub fn is_resize_thumbnail(&self) -> bool {
        self.raw.resize_config.lock_aspect_ratio_fill
    }

    pub fn is_center_crop(&self) -> bool {
        self.raw.crop_config.enable_center_crop_rectangle
    }

    pub fn get_frame_type(&self) -> PixelFormat {
        self.raw.format_config.format
    }

    pub fn is_horizontal_flip(&self) -> bool {
        self.raw.format_config.flip_horizontal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::ADatatype;

    #[test]
    fn test_defaults() {
        let cfg = ImageManipConfig::new();
        let raw = cfg.get_raw();
        assert!(!raw.enable_crop && !raw.enable_resize && !raw.enable_format);
        assert_eq!(raw.crop_config.crop_ratio, 1.0);
        assert_eq!(cfg.get_frame_type(), PixelFormat::None);
    }

    #[test]
    fn test_crop_rect() {
        let mut cfg = ImageManipConfig::new();
        cfg.set_center_crop(0.5, 1.0).set_crop_rect(0.1, 0.2, 0.9, 0.8);
        assert!(cfg.get_raw().enable_crop);
        assert!(!cfg.is_center_crop());
        assert_eq!(
            (
                cfg.get_crop_x_min(),
                cfg.get_crop_y_min(),
                cfg.get_crop_x_max(),
                cfg.get_crop_y_max()
            ),
            (0.1, 0.2, 0.9, 0.8)
        );
    }

    #[test]
    fn test_resize_keeps_crop() {
        let mut cfg = ImageManipConfig::new();
        cfg.set_crop_rect(0.0, 0.0, 0.5, 0.5)
            .set_resize_thumbnail(300, 300, 0, 0, 255)
            .set_resize(640, 480);
        assert!(cfg.get_raw().enable_crop);
        assert!(cfg.get_raw().enable_resize);
        assert!(!cfg.is_resize_thumbnail());
        assert_eq!((cfg.get_resize_width(), cfg.get_resize_height()), (640, 480));
    }

    #[test]
    fn test_thumbnail() {
        let mut cfg = ImageManipConfig::new();
        cfg.set_resize_thumbnail(300, 200, 1, 2, 3);
        assert!(cfg.is_resize_thumbnail());
        let resize = cfg.get_raw().resize_config;
        assert_eq!((resize.bg_red, resize.bg_green, resize.bg_blue), (1, 2, 3));
    }

    #[test]
    fn test_format_enables_format_stage() {
        let mut cfg = ImageManipConfig::new();
        cfg.set_horizontal_flip(true);
        assert!(cfg.get_raw().enable_format);
        cfg.set_frame_type(PixelFormat::Bgr888p);
        assert_eq!(cfg.get_frame_type(), PixelFormat::Bgr888p);
        assert!(cfg.is_horizontal_flip());
    }
}
