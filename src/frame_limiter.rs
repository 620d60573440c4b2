use std::time::{Duration, Instant};

/// Paces redraws to a target frame rate.
#[derive(Debug)]
pub struct FrameLimiter {
    frame_time: Duration,
    next_frame: Instant,
}

impl FrameLimiter {
    pub fn new(fps: u32, now: Instant) -> FrameLimiter {
        FrameLimiter {
            frame_time: Self::frame_time_for(fps),
            next_frame: now,
        }
    }

    fn frame_time_for(fps: u32) -> Duration {
        Duration::from_secs(1) / fps.max(1)
    }

    pub fn set_frame_rate(&mut self, fps: u32) {
        self.frame_time = Self::frame_time_for(fps);
    }

    pub fn next_frame(&self) -> Instant {
        self.next_frame
    }

    /// Returns true when a frame is due at `now` and schedules the next one.
    ///
    /// If the loop fell more than a frame behind, the schedule restarts from
    /// `now` rather than bursting to catch up.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now < self.next_frame {
            return false;
        }
        self.next_frame += self.frame_time;
        if self.next_frame <= now {
            self.next_frame = now + self.frame_time;
        }
        true
    }
}
