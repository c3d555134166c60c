use std::time::{Duration, Instant};

/// Fixed-rate frame scheduler. A frame is due once its deadline passes; deadlines advance
/// by whole intervals so a slow frame does not cause a burst of catch-up frames.
#[derive(Debug, Copy, Clone)]
pub struct FramePacer {
    interval: Duration,
    next_frame: Instant,
}

impl FramePacer {
    pub fn new(target_fps: u32, now: Instant) -> Self {
        Self {
            interval: Duration::from_secs(1) / target_fps.max(1),
            next_frame: now,
        }
    }

    pub fn next_frame(&self) -> Instant {
        self.next_frame
    }

    /// Returns true and schedules the next deadline if a frame is due at `now`.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now < self.next_frame {
            return false;
        }
        self.next_frame += self.interval;
        if self.next_frame <= now {
            self.next_frame = now + self.interval;
        }
        true
    }
}

/// Frames-per-second over a rolling one second window.
#[derive(Debug, Copy, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0,
        }
    }

    /// Counts a frame; returns the new reading when a window closes.
    pub fn frame(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;
        let elapsed = now - self.window_start;
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        self.fps = (self.frames as f64 / elapsed.as_secs_f64()).round() as u32;
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacer_runs_first_frame_immediately() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(60, start);
        assert!(pacer.tick(start));
        assert!(!pacer.tick(start));
        assert_eq!(pacer.next_frame() - start, Duration::from_secs(1) / 60);
    }

    #[test]
    fn pacer_waits_for_deadline() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(50, start);
        pacer.tick(start);
        assert!(!pacer.tick(start + Duration::from_millis(19)));
        assert!(pacer.tick(start + Duration::from_millis(20)));
        assert_eq!(pacer.next_frame(), start + Duration::from_millis(40));
    }

    #[test]
    fn pacer_does_not_burst_after_stall() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(50, start);
        pacer.tick(start);
        let late = start + Duration::from_millis(500);
        assert!(pacer.tick(late));
        assert!(!pacer.tick(late));
        assert_eq!(pacer.next_frame(), late + Duration::from_millis(20));
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let start = Instant::now();
        let mut counter = FpsCounter::new(start);
        for i in 1..30 {
            assert_eq!(counter.frame(start + Duration::from_millis(i * 33)), None);
        }
        assert_eq!(counter.frame(start + Duration::from_secs(1)), Some(30));
        assert_eq!(counter.fps(), 30);
    }
}
