use image::RgbImage;
use tracing::{info, warn};

use crate::camera::{CameraSession, StereoCamera, View};
use crate::depth::render_depth;
use crate::errors::Result;

/// Log the first failed grab and then every this many.
const GRAB_FAILURE_LOG_EVERY: u64 = 100;

/// Where preview frames end up, eg a window per view.
pub trait PreviewSink {
    fn show(&mut self, view: View, image: &RgbImage) -> Result<()>;

    /// Polled once per loop iteration; `true` ends the preview.
    fn quit_requested(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewStats {
    pub frames_shown: u64,
    pub grab_failures: u64,
}

/// Grabs and shows left, right and colored depth until the sink asks to
/// quit.
///
/// Failed grabs are counted and retried straight away; only the sink ends
/// the loop. Errors from the sink itself are returned.
pub fn run_preview<Cam, S>(session: &mut CameraSession<Cam>, sink: &mut S) -> Result<PreviewStats>
where
    Cam: StereoCamera,
    S: PreviewSink,
{
    info!("[Preview] running, press 'q' to exit");
    let mut stats = PreviewStats::default();

    loop {
        match session.grab() {
            Ok(frames) => {
                sink.show(View::Left, &frames.left)?;
                sink.show(View::Right, &frames.right)?;
                sink.show(View::Depth, &render_depth(&frames.depth))?;
                stats.frames_shown += 1;
            }
            Err(err) => {
                stats.grab_failures += 1;
                if stats.grab_failures % GRAB_FAILURE_LOG_EVERY == 1 {
                    warn!("[Preview] {err} ({} so far)", stats.grab_failures);
                }
            }
        }

        if sink.quit_requested() {
            break;
        }
    }

    info!("[Preview] done, {} frames shown, {} failed grabs", stats.frames_shown, stats.grab_failures);
    Ok(stats)
}
