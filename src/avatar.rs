use anyhow::Context as _;

use crate::error::{QuoteError, QuoteResult};
use crate::layer::LayerRgba;

/// Inset of the disk radius from the avatar's half-width.
const MASK_INSET: f64 = 1.5;
/// Width of the smoothed ring that anti-aliases the disk edge.
const MASK_FEATHER: f64 = 1.0;

/// A decoded, circularly masked, resized avatar plus the tint derived from
/// its average color.
#[derive(Clone, Debug)]
pub struct ProcessedAvatar {
    /// Premultiplied RGBA at `target_size` width.
    pub layer: LayerRgba,
    /// Straight-alpha tint for the card background, alpha 255.
    pub tint: [u8; 4],
}

/// Decode and prepare the avatar.
///
/// Steps, in order: decode; average the RGB bands with any original alpha
/// stripped (transparency must not bias the tint); damp the average into the
/// background tint; replace the alpha channel with a circular mask;
/// premultiply; resize to `target_size` width if needed.
///
/// Malformed bytes fail the whole request with [`QuoteError::Decode`].
pub fn process(bytes: &[u8], target_size: u32, damping: f64) -> QuoteResult<ProcessedAvatar> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| QuoteError::decode(format!("avatar bytes: {e}")))?;

    let tint = tint_from_average(&dyn_img.to_rgb8(), damping);

    let mut rgba = dyn_img.to_rgba8();
    apply_circular_mask(&mut rgba);

    let (width, height) = rgba.dimensions();
    let mut data = rgba.into_raw();
    premultiply_rgba8_in_place(&mut data);

    let img = image::RgbaImage::from_raw(width, height, data)
        .context("rebuild avatar buffer after masking")?;
    let img = if width != target_size {
        let scale = f64::from(target_size) / f64::from(width);
        let new_h = ((f64::from(height) * scale).round() as u32).max(1);
        image::imageops::resize(&img, target_size, new_h, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    let (w, h) = img.dimensions();
    let layer = LayerRgba::from_premul(w, h, img.into_raw())?;
    Ok(ProcessedAvatar { layer, tint })
}

/// Per-channel average over the opaque RGB buffer, damped, alpha 255.
fn tint_from_average(rgb: &image::RgbImage, damping: f64) -> [u8; 4] {
    let (w, h) = rgb.dimensions();
    let n = (u64::from(w) * u64::from(h)).max(1);
    let mut sums = [0u64; 3];
    for px in rgb.pixels() {
        sums[0] += u64::from(px[0]);
        sums[1] += u64::from(px[1]);
        sums[2] += u64::from(px[2]);
    }

    let damp = |sum: u64| -> u8 {
        let avg = sum as f64 / n as f64;
        (avg * damping).round().clamp(0.0, 255.0) as u8
    };
    [damp(sums[0]), damp(sums[1]), damp(sums[2]), 255]
}

/// Replace the alpha channel with a circular mask: a hard disk of radius
/// `width/2 - MASK_INSET` combined with a smoothstep ring falloff along the
/// edge. Any original alpha is discarded.
fn apply_circular_mask(rgba: &mut image::RgbaImage) {
    let (w, h) = rgba.dimensions();
    let center = kurbo::Point::new(f64::from(w) / 2.0, f64::from(h) / 2.0);
    let radius = (f64::from(w) / 2.0 - MASK_INSET).max(0.0);

    for (x, y, px) in rgba.enumerate_pixels_mut() {
        let p = kurbo::Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
        let d = p.distance(center);
        let coverage = if d <= radius - MASK_FEATHER {
            1.0
        } else {
            1.0 - smoothstep(radius - MASK_FEATHER, radius, d)
        };
        px[3] = (coverage * 255.0).round() as u8;
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn smoothstep(a: f64, b: f64, x: f64) -> f64 {
    if x <= a {
        return 0.0;
    }
    if x >= b {
        return 1.0;
    }
    let t = (x - a) / (b - a);
    (t * t * (3.0 - 2.0 * t)).clamp(0.0, 1.0)
}
