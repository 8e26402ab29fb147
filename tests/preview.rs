use image::RgbImage;
use offboard_pilot::*;

/// Records what would have been displayed and quits after a number of polls.
#[derive(Default)]
struct RecordingSink {
    shown: Vec<(View, (u32, u32))>,
    polls: u32,
    quit_after: u32,
}

impl RecordingSink {
    fn quitting_after(polls: u32) -> Self {
        Self { quit_after: polls, ..Default::default() }
    }
}

impl PreviewSink for RecordingSink {
    fn show(&mut self, view: View, image: &RgbImage) -> Result<()> {
        self.shown.push((view, image.dimensions()));
        Ok(())
    }

    fn quit_requested(&mut self) -> bool {
        self.polls += 1;
        self.polls >= self.quit_after
    }
}

fn vga() -> CameraOptions {
    CameraOptions { resolution: Resolution::Vga, ..CameraOptions::default() }
}

#[test]
fn shows_left_right_and_depth_per_frame() {
    let mut session = CameraSession::open(SimulatedStereoCamera::default(), vga()).unwrap();
    let mut sink = RecordingSink::quitting_after(3);

    let stats = run_preview(&mut session, &mut sink).unwrap();

    assert_eq!(stats, PreviewStats { frames_shown: 3, grab_failures: 0 });
    let views: Vec<View> = sink.shown.iter().map(|(v, _)| *v).collect();
    assert_eq!(views, [View::Left, View::Right, View::Depth].repeat(3));
    assert!(sink.shown.iter().all(|(_, dims)| *dims == (672, 376)));
}

#[test]
fn failed_grabs_are_skipped_not_fatal() {
    let camera = SimulatedStereoCamera::new(SimCameraOptions {
        fail_grab_every: Some(2),
        ..SimCameraOptions::default()
    });
    let mut session = CameraSession::open(camera, vga()).unwrap();
    let mut sink = RecordingSink::quitting_after(6);

    let stats = run_preview(&mut session, &mut sink).unwrap();

    assert_eq!(stats, PreviewStats { frames_shown: 3, grab_failures: 3 });
    assert_eq!(sink.shown.len(), 9);
}

#[test]
fn quit_is_honoured_while_every_grab_fails() {
    let camera = SimulatedStereoCamera::new(SimCameraOptions {
        fail_grab_every: Some(1),
        ..SimCameraOptions::default()
    });
    let mut session = CameraSession::open(camera, vga()).unwrap();
    let mut sink = RecordingSink::quitting_after(250);

    let stats = run_preview(&mut session, &mut sink).unwrap();

    assert_eq!(stats, PreviewStats { frames_shown: 0, grab_failures: 250 });
    assert!(sink.shown.is_empty());
}

#[test]
fn sink_errors_end_the_preview() {
    struct BrokenSink;

    impl PreviewSink for BrokenSink {
        fn show(&mut self, _: View, _: &RgbImage) -> Result<()> {
            Err(PilotError::Display { msg: "window gone".to_string() })
        }

        fn quit_requested(&mut self) -> bool {
            false
        }
    }

    let mut session = CameraSession::open(SimulatedStereoCamera::default(), vga()).unwrap();
    let err = run_preview(&mut session, &mut BrokenSink).unwrap_err();
    assert_eq!(err.to_string(), "display error - window gone");
}

#[test]
fn depth_frames_render_hot_near_cold_far() {
    let mut session = CameraSession::open(SimulatedStereoCamera::default(), vga()).unwrap();
    let frames = session.grab().unwrap();
    let intensity = normalize_depth(&frames.depth);
    let level = |x, y| intensity.get_pixel(x, y).0[0];

    // top row is the far background, bottom rows the near floor, and the
    // zero-depth patch in the corner is clipped to the nearest possible value
    assert_eq!(level(300, 0), 0);
    assert!(level(300, 370) > level(300, 0));
    assert_eq!(level(671, 375), 255);
    // no depth at all on the left border: drawn as far
    assert_eq!(level(0, 200), 0);

    let heat = render_depth(&frames.depth);
    assert_eq!(heat.get_pixel(300, 0), &jet(0));
    assert_eq!(heat.get_pixel(671, 375), &jet(255));
}
