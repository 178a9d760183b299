use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

/// Delay and sound timers. They're decremented by a separate cadence while the
/// interpreter reads and writes them, so each lives in an atomic; no timer
/// value is ever updated in more than one step.
#[derive(Debug, Default)]
pub struct Timers {
    delay: AtomicU8,
    sound: AtomicU8,
}

impl Timers {
    pub fn new() -> Self {
        Timers::default()
    }

    pub fn delay(&self) -> u8 {
        self.delay.load(Ordering::Acquire)
    }

    pub fn set_delay(&self, value: u8) {
        self.delay.store(value, Ordering::Release);
    }

    pub fn sound(&self) -> u8 {
        self.sound.load(Ordering::Acquire)
    }

    pub fn set_sound(&self, value: u8) {
        self.sound.store(value, Ordering::Release);
    }

    /// whether the buzzer should be on
    pub fn sound_active(&self) -> bool {
        self.sound() > 0
    }

    /// count both timers down by one, stopping at zero; returns whether the
    /// sound timer is still running afterwards
    pub fn tick(&self) -> bool {
        let dec = |t: u8| t.checked_sub(1);
        let _ = self
            .delay
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, dec);
        let _ = self
            .sound
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, dec);
        self.sound_active()
    }
}

/// fires at most once per interval, catching up on missed intervals one at a
/// time
pub struct Ticker {
    interval: Duration,
    last_tick: Instant,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Ticker {
            interval,
            last_tick: Instant::now(),
        }
    }

    /// interval for a rate in Hz
    pub fn from_hz(hz: u32) -> Self {
        Ticker::new(Duration::from_secs_f64(1.0 / hz.max(1) as f64))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn tick(&mut self) -> bool {
        if self.last_tick.elapsed() >= self.interval {
            self.last_tick += self.interval;
            true
        } else {
            false
        }
    }

    /// how long until the next tick is due
    pub fn remaining(&self) -> Duration {
        self.interval.saturating_sub(self.last_tick.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counts_down() {
        let t = Timers::new();
        t.set_delay(3);
        t.set_sound(1);
        assert!(!t.tick());
        assert_eq!(t.delay(), 2);
        assert_eq!(t.sound(), 0);
    }

    #[test]
    fn test_tick_stops_at_zero() {
        let t = Timers::new();
        t.set_delay(1);
        for _ in 0..5 {
            t.tick();
        }
        assert_eq!(t.delay(), 0);
        assert_eq!(t.sound(), 0);
    }

    #[test]
    fn test_sound_active() {
        let t = Timers::new();
        assert!(!t.sound_active());
        t.set_sound(2);
        assert!(t.sound_active());
        assert!(t.tick());
        assert!(!t.tick());
    }

    #[test]
    fn test_ticker_fires_after_interval() {
        let mut ticker = Ticker::new(Duration::from_millis(5));
        assert!(!ticker.tick());
        std::thread::sleep(Duration::from_millis(6));
        assert!(ticker.tick());
        assert!(ticker.remaining() <= Duration::from_millis(5));
    }

    #[test]
    fn test_ticker_from_hz() {
        let ticker = Ticker::from_hz(60);
        assert_eq!(ticker.interval(), Duration::from_secs_f64(1.0 / 60.0));
    }
}
