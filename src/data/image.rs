//! Image-backed training data: learn a grayscale picture as a function
//! `(x, y) -> intensity` and render the learned function back at any size.

use std::path::Path;

use image::{GrayImage, ImageFormat, Luma};
use tracing::info;

use crate::data::training_set::TrainingSet;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Maps pixel index `i` of an axis with `len` pixels onto `[0, 1]`.
fn normalized(i: u32, len: u32) -> f64 {
    if len > 1 {
        i as f64 / (len - 1) as f64
    } else {
        0.0
    }
}

/// Scanline index of pixel `(x, y)`, computed in `usize`.
fn pixel_row(x: u32, y: u32, width: u32) -> usize {
    y as usize * width as usize + x as usize
}

/// Converts a grayscale image into one training row per pixel:
/// `(x / (w - 1), y / (h - 1), intensity / 255)`, rows in scanline order.
pub fn field_from_image(img: &GrayImage) -> TrainingSet {
    let (width, height) = img.dimensions();
    let mut t = Matrix::zeros(width as usize * height as usize, 3);
    for (x, y, pixel) in img.enumerate_pixels() {
        let row = t.row_slice_mut(pixel_row(x, y, width));
        row[0] = normalized(x, width);
        row[1] = normalized(y, height);
        row[2] = pixel.0[0] as f64 / 255.0;
    }
    TrainingSet::new(t, 2)
}

/// Loads any supported image, converts it to 8-bit grayscale, and builds the
/// per-pixel training set.
pub fn image_field<P: AsRef<Path>>(path: P) -> Result<TrainingSet> {
    let path = path.as_ref();
    let img = image::open(path)?.to_luma8();
    info!(path = %path.display(), width = img.width(), height = img.height(), "loaded image");
    Ok(field_from_image(&img))
}

/// Evaluates a 2-input, 1-output network on a `width × height` grid of
/// normalized coordinates and returns the result as a grayscale image.
pub fn render_field(net: &mut Network, width: u32, height: u32) -> Result<GrayImage> {
    if net.input_width() != 2 || net.output_width() != 1 {
        return Err(Error::InvalidConfig(format!(
            "rendering needs a 2-input, 1-output network, got {:?}",
            net.architecture()
        )));
    }
    if width == 0 || height == 0 {
        return Err(Error::InvalidConfig(format!("cannot render a {width}x{height} image")));
    }

    let mut img = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let out = net.predict(&[normalized(x, width), normalized(y, height)])[0];
            let value = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
            img.put_pixel(x, y, Luma([value]));
        }
    }
    Ok(img)
}

/// Renders the learned field and writes it as a PNG.
pub fn save_field_png<P: AsRef<Path>>(net: &mut Network, width: u32, height: u32, path: P) -> Result<()> {
    let path = path.as_ref();
    let img = render_field(net, width, height)?;
    img.save_with_format(path, ImageFormat::Png)?;
    info!(path = %path.display(), width, height, "wrote rendered field");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_rows_cover_corners() {
        let mut img = GrayImage::new(3, 2);
        img.put_pixel(2, 1, Luma([255]));
        let set = field_from_image(&img);
        assert_eq!(set.len(), 6);
        assert_eq!(set.matrix().row_slice(0), &[0.0, 0.0, 0.0]);
        assert_eq!(set.matrix().row_slice(5), &[1.0, 1.0, 1.0]);
        assert_eq!(set.matrix().row_slice(1), &[0.5, 0.0, 0.0]);
    }

    #[test]
    fn pixel_rows_do_not_wrap_for_huge_images() {
        assert_eq!(pixel_row(2, 1, 3), 5);
        let side = 70_000u32;
        let expected = 70_000usize * 70_000 + 69_999;
        assert_eq!(pixel_row(side - 1, side, side), expected);
        assert!(expected > u32::MAX as usize);
    }

    #[test]
    fn single_pixel_axis_maps_to_zero() {
        let img = GrayImage::new(1, 1);
        let set = field_from_image(&img);
        assert_eq!(set.inputs().row_slice(0), &[0.0, 0.0]);
    }

    #[test]
    fn render_uses_network_output() {
        // Freshly allocated parameters are zero, so every pixel is σ(0) = 0.5.
        let mut net = Network::alloc(&[2, 1]);
        let img = render_field(&mut net, 4, 3).unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert!(img.pixels().all(|p| p.0[0] == 128));
    }

    #[test]
    fn render_rejects_wrong_shape() {
        let mut net = Network::alloc(&[3, 1]);
        assert!(matches!(render_field(&mut net, 4, 4), Err(Error::InvalidConfig(_))));
    }
}
