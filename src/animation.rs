use std::time::{Duration, Instant};

pub const FADE_DURATION: Duration = Duration::from_millis(400);
pub const INITIAL_OFFSET: f64 = 24.0;
pub const SPRING_TENSION: f64 = 80.0;
pub const SPRING_FRICTION: f64 = 12.0;

// Offset below which the card counts as in place.
const REST_THRESHOLD: f64 = 0.01;

/// Card appearance at one instant of the entrance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntranceFrame {
    pub opacity: f64,
    pub translate_y: f64,
}

impl EntranceFrame {
    pub const HIDDEN: EntranceFrame = EntranceFrame { opacity: 0.0, translate_y: INITIAL_OFFSET };
    pub const SETTLED: EntranceFrame = EntranceFrame { opacity: 1.0, translate_y: 0.0 };
}

/// Fade-in plus spring slide-up played whenever a fresh quote card appears.
///
/// Opacity runs linearly from 0 to 1 over [`FADE_DURATION`]; the vertical
/// offset is a unit-mass damped spring released from [`INITIAL_OFFSET`].
#[derive(Debug, Clone, Default)]
pub struct EntranceTransition {
    started_at: Option<Instant>,
}

impl EntranceTransition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the hidden starting pose.
    pub fn reset(&mut self) {
        self.started_at = None;
    }

    pub fn restart(&mut self, now: Instant) {
        self.started_at = Some(now);
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn frame_at(&self, now: Instant) -> EntranceFrame {
        match self.started_at {
            Some(start) => Self::frame_after(now.saturating_duration_since(start)),
            None => EntranceFrame::HIDDEN,
        }
    }

    pub fn is_settled_at(&self, now: Instant) -> bool {
        match self.started_at {
            Some(start) => Self::settled_after(now.saturating_duration_since(start)),
            None => false,
        }
    }

    pub fn frame_after(elapsed: Duration) -> EntranceFrame {
        if Self::settled_after(elapsed) {
            return EntranceFrame::SETTLED;
        }
        let t = elapsed.as_secs_f64();
        EntranceFrame {
            opacity: (t / FADE_DURATION.as_secs_f64()).min(1.0),
            translate_y: spring_offset(t),
        }
    }

    pub fn settled_after(elapsed: Duration) -> bool {
        elapsed >= FADE_DURATION && spring_envelope(elapsed.as_secs_f64()) < REST_THRESHOLD
    }
}

fn spring_params() -> (f64, f64, f64) {
    let omega0 = SPRING_TENSION.sqrt();
    let zeta = SPRING_FRICTION / (2.0 * omega0);
    let omega_d = omega0 * (1.0 - zeta * zeta).sqrt();
    (omega0, zeta, omega_d)
}

// Underdamped release from rest at INITIAL_OFFSET.
fn spring_offset(t: f64) -> f64 {
    let (omega0, zeta, omega_d) = spring_params();
    let decay = (-zeta * omega0 * t).exp();
    INITIAL_OFFSET * decay * ((omega_d * t).cos() + (zeta * omega0 / omega_d) * (omega_d * t).sin())
}

// Upper bound on |spring_offset(t)|.
fn spring_envelope(t: f64) -> f64 {
    let (omega0, zeta, _) = spring_params();
    INITIAL_OFFSET * (-zeta * omega0 * t).exp() / (1.0 - zeta * zeta).sqrt()
}
