use anyhow::{Context, Result};
use glam::Vec4;
use image::{DynamicImage, ImageReader, Rgba32FImage};
use rayon::prelude::*;
use std::path::Path;

/// Read access to a grid of RGBA samples. Coordinates are y-up: row 0 is the bottom of the image.
pub trait ImageSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Point lookup, clamped to the nearest edge texel outside the image.
    fn sample(&self, x: i32, y: i32) -> Vec4;

    fn bounds(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Bilinear interpolation between the four texels surrounding `(x, y)`.
    fn bilinear(&self, x: f32, y: f32) -> Vec4 {
        let x0 = x.floor();
        let y0 = y.floor();
        let tx = x - x0;
        let ty = y - y0;
        let (ix, iy) = (x0 as i32, y0 as i32);

        let c00 = self.sample(ix, iy);
        let c10 = self.sample(ix + 1, iy);
        let c01 = self.sample(ix, iy + 1);
        let c11 = self.sample(ix + 1, iy + 1);

        let c0 = c00 * (1.0 - tx) + c10 * tx;
        let c1 = c01 * (1.0 - tx) + c11 * tx;
        c0 * (1.0 - ty) + c1 * ty
    }
}

/// Owned float RGBA image.
#[derive(Debug, Clone, PartialEq)]
pub struct HdrBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl HdrBuffer {
    pub fn filled(width: u32, height: u32, value: Vec4) -> Self {
        Self { width, height, pixels: vec![value; (width as usize) * (height as usize)] }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Vec4) -> Self {
        let mut pixels = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self { width, height, pixels }
    }

    /// Evaluates `f` once per texel, rows in parallel. The output does not depend on scheduling.
    pub fn par_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Vec4 + Sync) -> Self {
        let mut pixels = vec![Vec4::ZERO; (width as usize) * (height as usize)];
        if width > 0 {
            pixels.par_chunks_mut(width as usize).enumerate().for_each(|(y, row)| {
                for (x, slot) in row.iter_mut().enumerate() {
                    *slot = f(x as u32, y as u32);
                }
            });
        }
        Self { width, height, pixels }
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Vec4> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }

    /// Decodes any format the `image` crate understands, flipping rows into y-up order.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = ImageReader::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("Failed to detect format of {}", path.display()))?;
        let decoded = reader.decode().with_context(|| format!("Failed to decode image {}", path.display()))?;
        let buffer = Self::from_dynamic(&decoded);
        log::debug!("Loaded {} ({}x{})", path.display(), buffer.width, buffer.height);
        Ok(buffer)
    }

    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let rgba = image.to_rgba32f();
        let (width, height) = rgba.dimensions();
        Self::from_fn(width, height, |x, y| Vec4::from_array(rgba.get_pixel(x, height - 1 - y).0))
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        let height = self.height;
        let image = Rgba32FImage::from_fn(self.width, height, |x, y| {
            image::Rgba(self.pixels[self.index(x, height - 1 - y)].to_array())
        });
        DynamicImage::ImageRgba32F(image)
    }

    /// Writes `.exr` as RGBA float, `.hdr` as RGB float and anything else as 8-bit RGBA.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|ext| ext.to_str()).map(|ext| ext.to_ascii_lowercase());
        let image = self.to_dynamic();
        let encoded = match extension.as_deref() {
            Some("exr") => image,
            Some("hdr") => DynamicImage::ImageRgb32F(image.to_rgb32f()),
            _ => DynamicImage::ImageRgba8(image.to_rgba8()),
        };
        encoded.save(path).with_context(|| format!("Failed to write image {}", path.display()))?;
        log::info!("Wrote {} ({}x{})", path.display(), self.width, self.height);
        Ok(())
    }
}

impl ImageSource for HdrBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn sample(&self, x: i32, y: i32) -> Vec4 {
        if self.pixels.is_empty() {
            return Vec4::ZERO;
        }
        let cx = x.clamp(0, self.width as i32 - 1) as u32;
        let cy = y.clamp(0, self.height as i32 - 1) as u32;
        self.pixels[self.index(cx, cy)]
    }
}
