use ndarray::{Array3, ArrayView2};
use tracing::trace;

use super::{ColorConversion, ColorConverter};
use crate::error::{Error, Result};

// BT.601 limited range, 20-bit fixed point
const SHIFT: u32 = 20;
const HALF: i32 = 1 << (SHIFT - 1);
const CY: i32 = 1_220_542;
const CUB: i32 = 2_116_026;
const CUG: i32 = -409_993;
const CVG: i32 = -852_492;
const CVR: i32 = 1_673_527;

/// CPU implementation of the BT.601 YUV to BGR conversions
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareConverter;

impl SoftwareConverter {
    pub fn new() -> Self {
        Self
    }
}

#[inline]
fn clamp(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[inline]
fn yuv_to_bgr(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = (i32::from(y) - 16).max(0) * CY;
    let u = i32::from(u) - 128;
    let v = i32::from(v) - 128;
    [
        clamp((y + CUB * u + HALF) >> SHIFT),
        clamp((y + CUG * u + CVG * v + HALF) >> SHIFT),
        clamp((y + CVR * v + HALF) >> SHIFT),
    ]
}

impl ColorConverter for SoftwareConverter {
    fn convert(&self, input: ArrayView2<'_, u8>, conversion: ColorConversion) -> Result<Array3<u8>> {
        let (rows, width) = input.dim();
        if rows % 3 != 0 || width % 2 != 0 {
            return Err(Error::Conversion(format!(
                "{conversion:?} needs an even width and h * 3 / 2 rows, got {rows}x{width}"
            )));
        }
        let height = rows / 3 * 2;

        let planes = input.as_standard_layout();
        let data = planes
            .as_slice()
            .ok_or_else(|| Error::Conversion("input is not contiguous".into()))?;

        let luma_len = width * height;
        let mut out = Array3::<u8>::zeros((height, width, 3));
        for y in 0..height {
            for x in 0..width {
                let luma = data[y * width + x];
                let (u, v) = match conversion {
                    ColorConversion::Yuv420pToBgr => {
                        let c = (y / 2) * (width / 2) + x / 2;
                        (data[luma_len + c], data[luma_len + luma_len / 4 + c])
                    }
                    ColorConversion::Nv12ToBgr => {
                        let c = luma_len + (y / 2) * width + (x / 2) * 2;
                        (data[c], data[c + 1])
                    }
                    ColorConversion::Nv21ToBgr => {
                        let c = luma_len + (y / 2) * width + (x / 2) * 2;
                        (data[c + 1], data[c])
                    }
                };
                let [b, g, r] = yuv_to_bgr(luma, u, v);
                out[[y, x, 0]] = b;
                out[[y, x, 1]] = g;
                out[[y, x, 2]] = r;
            }
        }

        trace!(?conversion, width, height, "converted frame to BGR");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn uniform(height: usize, width: usize, y: u8, u: u8, v: u8) -> Array2<u8> {
        // I420 layout with constant planes
        let luma = width * height;
        let mut data = vec![y; luma];
        data.extend(std::iter::repeat(u).take(luma / 4));
        data.extend(std::iter::repeat(v).take(luma / 4));
        Array2::from_shape_vec((height * 3 / 2, width), data).unwrap()
    }

    #[test]
    fn test_mid_gray() {
        let input = uniform(2, 2, 128, 128, 128);
        let out = SoftwareConverter
            .convert(input.view(), ColorConversion::Yuv420pToBgr)
            .unwrap();
        assert_eq!(out.dim(), (2, 2, 3));
        assert!(out.iter().all(|&v| v == 130));
    }

    #[test]
    fn test_limited_range_extremes() {
        assert_eq!(yuv_to_bgr(16, 128, 128), [0, 0, 0]);
        assert_eq!(yuv_to_bgr(235, 128, 128), [255, 255, 255]);
        // luma below the footroom clamps to black
        assert_eq!(yuv_to_bgr(0, 128, 128), [0, 0, 0]);
    }

    #[test]
    fn test_chroma_moves_channels() {
        let [b, _, r] = yuv_to_bgr(128, 128, 240);
        assert!(r > 200);
        assert!(b < 140);
        let [b, _, r] = yuv_to_bgr(128, 240, 128);
        assert!(b > 200);
        assert!(r < 140);
    }

    #[test]
    fn test_nv12_and_nv21_swap_chroma() {
        // 2x2 luma plus one U/V pair
        let data = vec![128, 128, 128, 128, 90, 240];
        let input = Array2::from_shape_vec((3, 2), data).unwrap();
        let nv12 = SoftwareConverter
            .convert(input.view(), ColorConversion::Nv12ToBgr)
            .unwrap();
        let nv21 = SoftwareConverter
            .convert(input.view(), ColorConversion::Nv21ToBgr)
            .unwrap();

        assert_eq!([nv12[[0, 0, 0]], nv12[[0, 0, 1]], nv12[[0, 0, 2]]], yuv_to_bgr(128, 90, 240));
        assert_eq!([nv21[[1, 1, 0]], nv21[[1, 1, 1]], nv21[[1, 1, 2]]], yuv_to_bgr(128, 240, 90));
    }

    #[test]
    fn test_yuv420p_chroma_indexing() {
        // 4x2 frame: left and right halves carry different chroma
        let mut data = vec![128u8; 8];
        data.extend([100, 200]); // U
        data.extend([150, 50]); // V
        let input = Array2::from_shape_vec((3, 4), data).unwrap();
        let out = SoftwareConverter
            .convert(input.view(), ColorConversion::Yuv420pToBgr)
            .unwrap();
        let px = |y: usize, x: usize| [out[[y, x, 0]], out[[y, x, 1]], out[[y, x, 2]]];
        assert_eq!(px(1, 1), yuv_to_bgr(128, 100, 150));
        assert_eq!(px(0, 3), yuv_to_bgr(128, 200, 50));
    }

    #[test]
    fn test_odd_dimensions_fail() {
        let input = Array2::<u8>::zeros((3, 3));
        let err = SoftwareConverter
            .convert(input.view(), ColorConversion::Nv12ToBgr)
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));

        // an odd height of 3 gives 4 rows
        let input = Array2::<u8>::zeros((4, 2));
        assert!(SoftwareConverter
            .convert(input.view(), ColorConversion::Nv12ToBgr)
            .is_err());
    }
}
