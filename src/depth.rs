use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

/// Dense depth in millimeters, same size as the left image.
pub type DepthMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Anything nearer than this (including zero and negative) is clamped to it.
const MIN_DEPTH_MM: f32 = 1.0;

/// `ln(depth)` with depth clipped to [`MIN_DEPTH_MM`], or `None` for pixels
/// with no finite far value (NaN or +∞).
fn clipped_log(depth: f32) -> Option<f32> {
    if depth.is_nan() || depth == f32::INFINITY {
        return None;
    }
    Some(depth.max(MIN_DEPTH_MM).ln())
}

/// Turns depth into display intensity: log-compressed, stretched over
/// 0..=255 across the frame and inverted so that near is bright.
///
/// Pixels without a finite depth are shown as far as the farthest valid
/// pixel. A frame with a single distance comes out fully bright; a frame
/// with no valid pixel at all comes out black.
pub fn normalize_depth(depth: &DepthMap) -> GrayImage {
    let (width, height) = depth.dimensions();
    let logs: Vec<Option<f32>> = depth.pixels().map(|p| clipped_log(p.0[0])).collect();

    let (min, max) = logs
        .iter()
        .flatten()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if min > max {
        return GrayImage::new(width, height);
    }

    let range = max - min;
    let scale = if range > 0.0 { 255.0 / range } else { 0.0 };

    GrayImage::from_fn(width, height, |x, y| {
        let l = logs[(y * width + x) as usize].unwrap_or(max);
        let level = ((l - min) * scale).round().clamp(0.0, 255.0) as u8;
        Luma([255 - level])
    })
}

/// The classic "jet" colormap: dark blue → cyan → yellow → dark red.
pub fn jet(level: u8) -> Rgb<u8> {
    let x = f32::from(level) / 255.0;
    let channel = |center: f32| {
        let c = (1.5 - (4.0 * x - center).abs()).clamp(0.0, 1.0);
        (c * 255.0).round() as u8
    };
    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}

pub fn colorize(intensity: &GrayImage) -> RgbImage {
    let (width, height) = intensity.dimensions();
    RgbImage::from_fn(width, height, |x, y| jet(intensity.get_pixel(x, y).0[0]))
}

/// Depth as a heat map, near objects hot.
pub fn render_depth(depth: &DepthMap) -> RgbImage {
    colorize(&normalize_depth(depth))
}
