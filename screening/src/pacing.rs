use std::{thread, time::Duration};

/// Blocking pause between wizard steps. Purely cosmetic; swapped for
/// [`NoPacer`] in tests and with `--no-delay`.
pub trait Pacer: Send + Sync {
    fn pause(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacer;

impl Pacer for NoPacer {
    fn pause(&self, _duration: Duration) {}
}

/// How long each step stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Intro shown before the login page.
    pub welcome: Duration,
    /// Confirmation after a successful login.
    pub login: Duration,
    /// Confirmation after the patient form is saved.
    pub patient_details: Duration,
    /// Confirmation after an image is accepted.
    pub upload: Duration,
    /// Minimum time the processing page is visible, inference included.
    pub processing: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            welcome: Duration::from_millis(3000),
            login: Duration::from_millis(1000),
            patient_details: Duration::from_millis(1000),
            upload: Duration::from_millis(1000),
            processing: Duration::from_millis(3000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn no_pacer_returns_immediately() {
        let start = Instant::now();
        NoPacer.pause(Duration::from_secs(30));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn thread_pacer_waits_at_least_the_duration() {
        let start = Instant::now();
        ThreadPacer.pause(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
