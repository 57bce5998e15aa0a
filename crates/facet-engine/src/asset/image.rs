use std::path::Path;

use super::error::DecodeError;

/// Row order of a decoded pixel buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RowOrder {
    TopDown,
    BottomUp,
}

/// RGBA8 pixel buffer, tightly packed, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub row_order: RowOrder,
}

impl DecodedImage {
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }

    /// Returns the image with rows ordered top to bottom, which is what the
    /// texture upload path expects.
    pub fn into_top_down(mut self) -> Self {
        if self.row_order == RowOrder::BottomUp {
            let stride = self.bytes_per_row() as usize;
            let rows = self.height as usize;
            for y in 0..rows / 2 {
                let (head, tail) = self.pixels.split_at_mut((rows - 1 - y) * stride);
                head[y * stride..(y + 1) * stride].swap_with_slice(&mut tail[..stride]);
            }
            self.row_order = RowOrder::TopDown;
        }
        self
    }
}

/// Image file decoder.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError>;
}

/// Decoder backed by the `image` crate. Always yields top-down rows.
#[derive(Debug, Default, Copy, Clone)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        let img = ::image::open(path).map_err(|e| DecodeError::new(path, e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::new(path, "image has zero size"));
        }

        Ok(DecodedImage {
            width,
            height,
            pixels: rgba.into_raw(),
            row_order: RowOrder::TopDown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_with_rows(rows: &[u8], order: RowOrder) -> DecodedImage {
        // 1 pixel wide; each row's pixel is filled with its tag byte.
        let pixels = rows.iter().flat_map(|&r| [r; 4]).collect();
        DecodedImage {
            width: 1,
            height: rows.len() as u32,
            pixels,
            row_order: order,
        }
    }

    #[test]
    fn bottom_up_rows_are_reversed() {
        let img = image_with_rows(&[1, 2, 3], RowOrder::BottomUp).into_top_down();
        assert_eq!(img.row_order, RowOrder::TopDown);
        assert_eq!(img.pixels, vec![3, 3, 3, 3, 2, 2, 2, 2, 1, 1, 1, 1]);
    }

    #[test]
    fn even_row_count_flips() {
        let img = image_with_rows(&[1, 2, 3, 4], RowOrder::BottomUp).into_top_down();
        let firsts: Vec<u8> = img.pixels.chunks(4).map(|p| p[0]).collect();
        assert_eq!(firsts, vec![4, 3, 2, 1]);
    }

    #[test]
    fn top_down_is_untouched() {
        let img = image_with_rows(&[1, 2], RowOrder::TopDown);
        assert_eq!(img.clone().into_top_down(), img);
    }

    #[test]
    fn missing_file_is_decode_error() {
        let path = std::env::temp_dir().join("facet-definitely-missing.png");
        let err = ImageCrateDecoder.decode(&path).unwrap_err();
        assert_eq!(err.path, path);
    }
}
