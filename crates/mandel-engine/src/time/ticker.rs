use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Fixed-rate frame scheduler.
///
/// The runtime asks `next_deadline()` when the loop goes idle and calls
/// `tick()` once per presented frame. Deadlines advance by whole periods; a
/// late frame reschedules from "now" instead of bursting to catch up.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// hand downstream code a huge step.
#[derive(Debug, Clone)]
pub struct FrameTicker {
    period: Duration,
    last: Instant,
    next: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameTicker {
    pub const DEFAULT_FPS: u32 = 60;

    /// Creates a ticker for `fps` frames per second (0 is treated as 1).
    pub fn new(fps: u32) -> Self {
        let now = Instant::now();
        let period = Duration::from_secs(1) / fps.max(1);
        Self {
            period,
            last: now,
            next: now,
            frame_index: 0,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// When the next frame should be drawn.
    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameTicker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FPS)
    }
}
