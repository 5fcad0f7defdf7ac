//! Scheduled test screenshots
//!
//! `--testshots` takes a comma-separated list of frame numbers. The observer
//! installed on the core captures each listed frame in turn and stops the
//! emulation once the list is exhausted.

use crate::cli::atoi;
use anyhow::{bail, Context};
use image::ColorType;
use m64c_core::{Frame, FrameAction, FrameCallback};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Zero-terminated list of frames to capture, consumed in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotSchedule {
    frames: Vec<i32>,
    next: usize,
}

impl ScreenshotSchedule {
    /// Parse a `--testshots` list
    ///
    /// Entries use `atoi` rules, so an empty or malformed entry reads as 0 and
    /// ends the schedule at that point.
    pub fn parse(list: &str) -> Self {
        Self::from_frames(list.split(',').map(atoi))
    }

    pub fn from_frames(frames: impl IntoIterator<Item = i32>) -> Self {
        let mut frames: Vec<i32> = frames.into_iter().collect();
        frames.push(0);
        Self { frames, next: 0 }
    }

    /// All entries including the terminating 0
    pub fn frames(&self) -> &[i32] {
        &self.frames
    }

    /// Next frame to capture; 0 once the schedule is exhausted
    pub fn next_frame(&self) -> i32 {
        self.frames.get(self.next).copied().unwrap_or(0)
    }

    pub fn advance(&mut self) {
        if self.next < self.frames.len() {
            self.next += 1;
        }
    }
}

/// Destination for captured frames
pub trait CaptureSink {
    fn capture(&mut self, frame_index: i32, frame: &Frame<'_>) -> anyhow::Result<()>;
}

/// Writes each captured frame to `<dir>/testshot_<frame>.png`
#[derive(Debug, Clone)]
pub struct PngCaptureSink {
    dir: PathBuf,
}

impl PngCaptureSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_path(&self, frame_index: i32) -> PathBuf {
        self.dir.join(format!("testshot_{}.png", frame_index))
    }
}

impl CaptureSink for PngCaptureSink {
    fn capture(&mut self, frame_index: i32, frame: &Frame<'_>) -> anyhow::Result<()> {
        let (color, bytes_per_pixel) = match frame.bits_per_pixel {
            24 => (ColorType::Rgb8, 3),
            32 => (ColorType::Rgba8, 4),
            bpp => bail!("unsupported frame depth of {} bits per pixel", bpp),
        };

        let expected = frame.width as usize * frame.height as usize * bytes_per_pixel;
        if frame.pixels.len() < expected {
            bail!(
                "frame buffer holds {} bytes, {}x{} at {} bpp needs {}",
                frame.pixels.len(),
                frame.width,
                frame.height,
                frame.bits_per_pixel,
                expected
            );
        }

        let path = self.file_path(frame_index);
        image::save_buffer(
            &path,
            &frame.pixels[..expected],
            frame.width,
            frame.height,
            color,
        )
        .with_context(|| format!("couldn't write screenshot '{}'", path.display()))?;

        info!("Captured frame {} to {}", frame_index, path.display());
        Ok(())
    }
}

/// Per-frame observer driving a [`ScreenshotSchedule`]
pub struct ScreenshotObserver {
    schedule: Option<ScreenshotSchedule>,
    current_frame: i32,
    sink: Box<dyn CaptureSink + Send>,
}

impl ScreenshotObserver {
    pub fn new(schedule: ScreenshotSchedule, sink: Box<dyn CaptureSink + Send>) -> Self {
        Self {
            schedule: Some(schedule),
            current_frame: 0,
            sink,
        }
    }

    /// Frames seen so far
    pub fn current_frame(&self) -> i32 {
        self.current_frame
    }

    /// Whether the schedule has been used up and released
    pub fn is_finished(&self) -> bool {
        self.schedule.is_none()
    }

    pub fn on_frame(&mut self, frame: &Frame<'_>) -> FrameAction {
        let mut action = FrameAction::Continue;

        if let Some(schedule) = self.schedule.as_mut() {
            let next = schedule.next_frame();
            if next == 0 {
                debug!("Screenshot schedule done at frame {}, stopping", self.current_frame);
                self.schedule = None;
                action = FrameAction::Stop;
            } else if next == self.current_frame {
                if let Err(e) = self.sink.capture(self.current_frame, frame) {
                    warn!("Failed to capture frame {}: {:#}", self.current_frame, e);
                }
                schedule.advance();
            }
        }

        self.current_frame = self.current_frame.wrapping_add(1);
        action
    }

    pub fn into_callback(mut self) -> FrameCallback {
        Box::new(move |frame| self.on_frame(frame))
    }
}
