//! Frame timing utilities

use std::time::Instant;

/// Where frame deltas come from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeSource {
    /// Wall-clock time between consecutive `update` calls
    Realtime,
    /// Constant step in seconds, independent of the wall clock
    Fixed(f32),
}

/// Frame timer producing the `dt` handed to `Scene::advance`
pub struct Timer {
    source: TimeSource,
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new wall-clock timer
    pub fn new() -> Self {
        Self::with_source(TimeSource::Realtime)
    }

    /// Create a timer with an explicit time source
    pub fn with_source(source: TimeSource) -> Self {
        Self {
            source,
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = match self.source {
            TimeSource::Realtime => now.duration_since(self.last_frame).as_secs_f32(),
            TimeSource::Fixed(step) => step,
        };
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
