//! A synthetic stereo camera implementing [`StereoCamera`].
//!
//! Renders a sloping background with a box sliding across it. The left
//! border has no depth (as with a real stereo pair, nothing to match against)
//! and a patch near the bottom right reports zero.

use tracing::debug;

use crate::camera::*;

/// Focal length times baseline, in pixel·mm, at 1280 px wide.
const FOCAL_BASELINE_PX_MM: f32 = 700.0 * 120.0;
const BOX_DEPTH_MM: f32 = 1200.0;
const NEAR_MM: f32 = 800.0;
const FAR_MM: f32 = 8000.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct SimCameraOptions {
    /// Fail `open` with this status.
    pub fail_open: Option<CameraStatus>,
    /// Fail every n-th grab (1 = every grab).
    pub fail_grab_every: Option<u32>,
}

#[derive(Debug)]
struct Frame {
    left: RawImage,
    right: RawImage,
    depth: RawDepth,
}

#[derive(Debug, Default)]
pub struct SimulatedStereoCamera {
    options: SimCameraOptions,
    session: Option<CameraOptions>,
    grabs: u32,
    frame: Option<Frame>,
}

impl SimulatedStereoCamera {
    pub fn new(options: SimCameraOptions) -> Self {
        Self { options, ..Default::default() }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    fn render(&self, session: &CameraOptions) -> Frame {
        let (width, height) = session.resolution.dimensions();
        let depth_mm = scene_depth(width, height, self.grabs);

        let left = shade(width, height, &depth_mm, |x, _| x as i64);
        // right camera sits to the right, so near things appear shifted left
        let focal_baseline = FOCAL_BASELINE_PX_MM * width as f32 / 1280.0;
        let right = shade(width, height, &depth_mm, |x, d| match d {
            Some(d) if d > 0.0 => x as i64 + (focal_baseline / d).round() as i64,
            _ => x as i64,
        });

        let per_unit = session.unit.millimeters();
        let bytes = depth_mm.iter().flat_map(|d| (d / per_unit).to_le_bytes()).collect();

        Frame {
            left: RawImage { width, height, bgra: left },
            right: RawImage { width, height, bgra: right },
            depth: RawDepth { width, height, bytes },
        }
    }
}

/// Depth in millimeters for frame number `n`.
fn scene_depth(width: u32, height: u32, n: u32) -> Vec<f32> {
    let box_w = width / 5;
    let box_x = (n * 8) % width;
    let box_y = height / 3;
    let invalid_border = width / 40;

    let mut depth = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        // far at the top, near at the bottom
        let t = y as f32 / (height - 1).max(1) as f32;
        let background = FAR_MM + (NEAR_MM - FAR_MM) * t;
        for x in 0..width {
            let d = if x < invalid_border {
                f32::NAN
            } else if x >= box_x && x < box_x + box_w && y >= box_y && y < 2 * box_y {
                BOX_DEPTH_MM
            } else if x >= width - width / 10 && y >= height - height / 10 {
                0.0
            } else {
                background
            };
            depth.push(d);
        }
    }
    depth
}

/// BGRA image where the pixel at `x` shows the scene point at `source(x, depth)`.
fn shade(
    width: u32,
    height: u32,
    depth: &[f32],
    source: impl Fn(u32, Option<f32>) -> i64,
) -> Vec<u8> {
    let mut bgra = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        let row = &depth[(y * width) as usize..((y + 1) * width) as usize];
        for x in 0..width {
            let here = row[x as usize];
            let sx = source(x, Some(here).filter(|d| d.is_finite())).clamp(0, width as i64 - 1) as usize;
            let d = row[sx];
            let pixel = if d == BOX_DEPTH_MM {
                [40, 140, 240, 255]
            } else {
                let g = if d.is_finite() && d > 0.0 {
                    (255.0 * (1.0 - (d - NEAR_MM) / (FAR_MM - NEAR_MM))).clamp(30.0, 225.0) as u8
                } else {
                    20
                };
                [g, g, g, 255]
            };
            bgra.extend_from_slice(&pixel);
        }
    }
    bgra
}

impl StereoCamera for SimulatedStereoCamera {
    fn open(&mut self, options: &CameraOptions) -> Result<(), CameraStatus> {
        if let Some(status) = self.options.fail_open {
            return Err(status);
        }
        self.session = Some(*options);
        self.grabs = 0;
        Ok(())
    }

    fn grab(&mut self) -> Result<(), CameraStatus> {
        let session = self.session.ok_or(CameraStatus::CameraNotInitialized)?;
        self.grabs += 1;

        if let Some(n) = self.options.fail_grab_every {
            if n > 0 && self.grabs % n == 0 {
                debug!("[SimCamera] grab #{} failed", self.grabs);
                self.frame = None;
                return Err(CameraStatus::CorruptedFrame);
            }
        }

        self.frame = Some(self.render(&session));
        Ok(())
    }

    fn retrieve_image(&mut self, view: View) -> Result<RawImage, CameraStatus> {
        let frame = self.frame.as_ref().ok_or(CameraStatus::Failure)?;
        match view {
            View::Left => Ok(frame.left.clone()),
            View::Right => Ok(frame.right.clone()),
            View::Depth => Err(CameraStatus::Failure),
        }
    }

    fn retrieve_depth(&mut self) -> Result<RawDepth, CameraStatus> {
        let frame = self.frame.as_ref().ok_or(CameraStatus::Failure)?;
        Ok(frame.depth.clone())
    }

    fn close(&mut self) {
        self.session = None;
        self.frame = None;
    }
}
