//! Animation playback timer.
//!
//! The editor drives this from its own clock: every tick passes the elapsed
//! time and gets back the frame index to show. Elapsed time accumulates in
//! whole frame intervals so slow ticks still advance by the right amount.

use std::time::Duration;

pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 60;
pub const DEFAULT_FPS: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    fps: u32,
    playing: bool,
    accumulated: Duration,
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

impl Playback {
    /// A paused timer at `fps`, clamped to `1..=60`.
    pub fn new(fps: u32) -> Self {
        Self { fps: fps.clamp(MIN_FPS, MAX_FPS), playing: false, accumulated: Duration::ZERO }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.clamp(MIN_FPS, MAX_FPS);
    }

    /// Time each frame is shown at the current rate.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Stop advancing. The current frame index is left where it is.
    pub fn pause(&mut self) {
        self.playing = false;
        self.accumulated = Duration::ZERO;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Account for `elapsed` time and return the frame to show next.
    ///
    /// While paused, or with an empty timeline, `current` is returned as is.
    pub fn advance(&mut self, elapsed: Duration, current: usize, frame_count: usize) -> usize {
        if !self.playing || frame_count == 0 {
            return current;
        }
        self.accumulated += elapsed;
        let interval = self.frame_interval();
        let mut steps = 0usize;
        while self.accumulated >= interval {
            self.accumulated -= interval;
            steps += 1;
        }
        (current + steps) % frame_count
    }
}
