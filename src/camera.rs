use bytebuffer::{ByteBuffer, Endian};
use image::{ImageBuffer, Luma, Rgb, RgbImage};
use strum::Display;
use tracing::info;

use crate::depth::DepthMap;
use crate::errors::{PilotError, Result};

/// Status codes reported by the stereo camera SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraStatus {
    Failure,
    CameraNotDetected,
    InvalidResolution,
    LowUsbBandwidth,
    CameraFailedToSetup,
    NotEnoughGpuMemory,
    CorruptedFrame,
    CameraNotInitialized,
    EndOfFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Resolution {
    #[strum(serialize = "HD2K")]
    Hd2k,
    #[strum(serialize = "HD1080")]
    Hd1080,
    #[default]
    #[strum(serialize = "HD720")]
    Hd720,
    #[strum(serialize = "VGA")]
    Vga,
}

impl Resolution {
    /// Width and height of a single (left or right) image.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Resolution::Hd2k => (2208, 1242),
            Resolution::Hd1080 => (1920, 1080),
            Resolution::Hd720 => (1280, 720),
            Resolution::Vga => (672, 376),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DepthMode {
    Performance,
    Quality,
    Ultra,
    #[default]
    Neural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Unit {
    #[default]
    Millimeter,
    Centimeter,
    Meter,
}

impl Unit {
    pub(crate) fn millimeters(self) -> f32 {
        match self {
            Unit::Millimeter => 1.0,
            Unit::Centimeter => 10.0,
            Unit::Meter => 1000.0,
        }
    }
}

/// Camera session parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraOptions {
    pub resolution: Resolution,
    pub depth_mode: DepthMode,
    /// Unit of the depth values the camera hands back.
    pub unit: Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum View {
    Left,
    Right,
    Depth,
}

/// An image as the SDK hands it over: tightly packed BGRA, 8 bits per channel.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub bgra: Vec<u8>,
}

/// A depth measure as the SDK hands it over: little-endian `f32` per pixel.
#[derive(Debug, Clone)]
pub struct RawDepth {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// The stereo camera SDK.
pub trait StereoCamera {
    fn open(&mut self, options: &CameraOptions) -> Result<(), CameraStatus>;

    /// Captures one synchronized left/right/depth set.
    fn grab(&mut self) -> Result<(), CameraStatus>;

    /// Image from the last grab; `view` is `Left` or `Right`.
    fn retrieve_image(&mut self, view: View) -> Result<RawImage, CameraStatus>;

    /// Depth from the last grab, in the unit the session was opened with.
    fn retrieve_depth(&mut self) -> Result<RawDepth, CameraStatus>;

    fn close(&mut self);
}

/// One grab, converted: left and right RGB images plus depth in millimeters.
#[derive(Debug, Clone)]
pub struct FrameSet {
    pub left: RgbImage,
    pub right: RgbImage,
    pub depth: DepthMap,
}

/// An open camera. Closes the camera when dropped.
#[derive(Debug)]
pub struct CameraSession<Cam: StereoCamera> {
    camera: Cam,
    options: CameraOptions,
}

impl<Cam: StereoCamera> CameraSession<Cam> {
    pub fn open(mut camera: Cam, options: CameraOptions) -> Result<Self> {
        info!(
            "[Camera] OPEN {} depth {} in {}",
            options.resolution, options.depth_mode, options.unit
        );
        camera.open(&options).map_err(|status| PilotError::CameraOpen { status })?;
        Ok(Self { camera, options })
    }

    pub fn options(&self) -> &CameraOptions {
        &self.options
    }

    pub fn grab(&mut self) -> Result<FrameSet> {
        let camera_err =
            |action: &'static str| move |status: CameraStatus| PilotError::Camera { action, status };

        self.camera.grab().map_err(camera_err("grab"))?;
        let left = self.camera.retrieve_image(View::Left).map_err(camera_err("retrieve left"))?;
        let right = self.camera.retrieve_image(View::Right).map_err(camera_err("retrieve right"))?;
        let depth = self.camera.retrieve_depth().map_err(camera_err("retrieve depth"))?;

        Ok(FrameSet {
            left: rgb_from_bgra(&left)?,
            right: rgb_from_bgra(&right)?,
            depth: depth_from_le_bytes(&depth, self.options.unit.millimeters())?,
        })
    }
}

impl<Cam: StereoCamera> Drop for CameraSession<Cam> {
    fn drop(&mut self) {
        info!("[Camera] CLOSE");
        self.camera.close();
    }
}

fn expect_len(what: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(PilotError::Buffer {
            what,
            msg: format!("expected {expected} bytes, got {actual}"),
        });
    }
    Ok(())
}

pub fn rgb_from_bgra(raw: &RawImage) -> Result<RgbImage> {
    let pixels = raw.width as usize * raw.height as usize;
    expect_len("image", raw.bgra.len(), pixels * 4)?;

    let mut rgb = Vec::with_capacity(pixels * 3);
    for px in raw.bgra.chunks_exact(4) {
        rgb.extend_from_slice(&[px[2], px[1], px[0]]);
    }
    ImageBuffer::<Rgb<u8>, _>::from_raw(raw.width, raw.height, rgb).ok_or(PilotError::Buffer {
        what: "image",
        msg: "size mismatch".to_string(),
    })
}

/// Decodes a raw depth buffer, scaling each value by `scale` to millimeters.
pub fn depth_from_le_bytes(raw: &RawDepth, scale: f32) -> Result<DepthMap> {
    let pixels = raw.width as usize * raw.height as usize;
    expect_len("depth", raw.bytes.len(), pixels * 4)?;

    let mut buf = ByteBuffer::from_bytes(&raw.bytes);
    buf.set_endian(Endian::LittleEndian);

    let mut values = Vec::with_capacity(pixels);
    for _ in 0..pixels {
        values.push(buf.read_f32()? * scale);
    }
    ImageBuffer::<Luma<f32>, _>::from_raw(raw.width, raw.height, values).ok_or(PilotError::Buffer {
        what: "depth",
        msg: "size mismatch".to_string(),
    })
}
