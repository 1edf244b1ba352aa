//! Frame timing from host-supplied timestamps.

/// Longest step fed to the simulation, in seconds. Longer gaps (a
/// backgrounded tab, a debugger pause) are clamped so particles don't jump.
pub const MAX_FRAME_DT: f32 = 0.1;
/// Seconds per FPS measurement window.
pub const FPS_WINDOW_SECS: f64 = 1.0;
/// Step used for the very first frame, which has no predecessor.
pub const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

/// Timing for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Host timestamp, seconds.
    pub now: f64,
    /// Seconds since the first accepted frame.
    pub time: f64,
    pub dt: f32,
    /// Average FPS over the window that just closed, if one did.
    pub fps_sample: Option<f32>,
}

#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    origin: Option<f64>,
    last: Option<f64>,
    window_start: f64,
    window_frames: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `now` (seconds). Returns `None` for timestamps that are
    /// not finite or do not move forward.
    pub fn tick(&mut self, now: f64) -> Option<Tick> {
        if !now.is_finite() {
            return None;
        }
        let (Some(origin), Some(last)) = (self.origin, self.last) else {
            self.origin = Some(now);
            self.last = Some(now);
            self.window_start = now;
            self.window_frames = 0;
            return Some(Tick {
                now,
                time: 0.0,
                dt: FIRST_FRAME_DT,
                fps_sample: None,
            });
        };
        if now <= last {
            return None;
        }

        let dt = ((now - last) as f32).min(MAX_FRAME_DT);
        self.last = Some(now);
        self.window_frames += 1;

        let window = now - self.window_start;
        let fps_sample = if window >= FPS_WINDOW_SECS {
            let fps = (self.window_frames as f64 / window) as f32;
            self.window_start = now;
            self.window_frames = 0;
            Some(fps)
        } else {
            None
        };

        Some(Tick {
            now,
            time: now - origin,
            dt,
            fps_sample,
        })
    }

    /// Timestamp of the last accepted frame.
    pub fn last(&self) -> Option<f64> {
        self.last
    }

    /// Seconds since the first accepted frame, 0 before any frame.
    pub fn time(&self) -> f64 {
        match (self.origin, self.last) {
            (Some(origin), Some(last)) => last - origin,
            _ => 0.0,
        }
    }
}
