use crate::foundation::{core::Fps, error::FlexResult};

/// Something that advances its animations when handed elapsed time.
pub trait Animated {
    /// Advance by `dt_ms` milliseconds.
    fn advance(&mut self, dt_ms: f64) -> FlexResult<()>;
}

/// External per-frame driver. Owns the scheduling policy so nodes never reschedule themselves.
#[derive(Clone, Copy, Debug)]
pub struct FrameDriver {
    fps: Fps,
    frame: u64,
}

impl FrameDriver {
    /// Driver stepping at a fixed frame rate.
    pub fn new(fps: Fps) -> Self {
        Self { fps, frame: 0 }
    }

    /// Frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Elapsed driver time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.frame as f64 * self.fps.frame_duration_ms()
    }

    /// Advance `target` by one frame.
    pub fn step<A: Animated + ?Sized>(&mut self, target: &mut A) -> FlexResult<()> {
        self.frame += 1;
        target.advance(self.fps.frame_duration_ms())
    }

    /// Advance `target` by `frames` frames, stopping at the first error.
    pub fn run<A: Animated + ?Sized>(&mut self, target: &mut A, frames: u64) -> FlexResult<()> {
        for _ in 0..frames {
            self.step(target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/driver.rs"]
mod tests;
