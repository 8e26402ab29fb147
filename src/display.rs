//! SDL2 windows for the depth preview.

use image::RgbImage;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::{EventPump, Sdl};

use crate::camera::View;
use crate::errors::{PilotError, Result};
use crate::preview::PreviewSink;

fn display_err(e: impl ToString) -> PilotError {
    PilotError::Display { msg: e.to_string() }
}

/// One window per view. `q`, `Esc` or closing any window quits.
pub struct SdlPreview {
    _sdl: Sdl,
    event_pump: EventPump,
    windows: Vec<(View, Canvas<Window>)>,
}

impl SdlPreview {
    /// Opens the windows at half the camera resolution.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let sdl = sdl2::init().map_err(display_err)?;
        let video = sdl.video().map_err(display_err)?;

        let (w, h) = (width / 2, height / 2);
        let mut windows = vec![];
        for (i, view) in [View::Left, View::Right, View::Depth].into_iter().enumerate() {
            let title = match view {
                View::Depth => "Depth".to_string(),
                _ => format!("{view} Image"),
            };
            let window = video
                .window(&title, w, h)
                .position(i as i32 * (w as i32 + 10), 40)
                .build()
                .map_err(display_err)?;
            let mut canvas = window.into_canvas().build().map_err(display_err)?;
            canvas.clear();
            canvas.present();
            windows.push((view, canvas));
        }

        let event_pump = sdl.event_pump().map_err(display_err)?;
        Ok(Self { _sdl: sdl, event_pump, windows })
    }
}

impl PreviewSink for SdlPreview {
    fn show(&mut self, view: View, image: &RgbImage) -> Result<()> {
        let Some((_, canvas)) = self.windows.iter_mut().find(|(v, _)| *v == view) else {
            return Ok(());
        };

        let (width, height) = image.dimensions();
        let texture_creator = canvas.texture_creator();
        let mut texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB24, width, height)
            .map_err(display_err)?;
        texture
            .update(None, image.as_raw(), width as usize * 3)
            .map_err(display_err)?;

        canvas.copy(&texture, None, None).map_err(display_err)?;
        canvas.present();
        Ok(())
    }

    fn quit_requested(&mut self) -> bool {
        let mut quit = false;
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::Window { win_event: WindowEvent::Close, .. }
                | Event::KeyDown { keycode: Some(Keycode::Q | Keycode::Escape), .. } => quit = true,
                _ => {}
            }
        }
        quit
    }
}
