use beep::beep;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the buzzer should be sounding. Set from the timer thread, read by
/// whatever makes the noise.
pub trait SoundFlag: Send + Sync {
    fn set_active(&self, active: bool);
    fn is_active(&self) -> bool;
}

/// the usual [`SoundFlag`]
#[derive(Debug, Default)]
pub struct Speaker {
    active: AtomicBool,
}

impl Speaker {
    pub fn new() -> Self {
        Speaker::default()
    }
}

impl SoundFlag for Speaker {
    fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// makes (or doesn't make) the actual noise
pub trait Sound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
    fn is_beeping(&self) -> bool;

    /// start or stop to match the flag
    fn follow(&mut self, flag: &dyn SoundFlag) -> Result<(), Box<dyn Error>> {
        match (flag.is_active(), self.is_beeping()) {
            (true, false) => self.beep(),
            (false, true) => self.stop(),
            _ => Ok(()),
        }
    }
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        SimpleBeep::new()
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        beep(SIMPLEBEEP_PITCH)?;
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        beep(0)?;
        self.is_beeping = false;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

/// silent, but keeps track of whether it would be beeping
#[derive(Default)]
pub struct Mute {
    is_beeping: bool,
}

impl Mute {
    pub fn new() -> Self {
        Mute::default()
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = false;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_flag() {
        let s = Speaker::new();
        assert!(!s.is_active());
        s.set_active(true);
        assert!(s.is_active());
        s.set_active(false);
        assert!(!s.is_active());
    }

    #[test]
    fn test_mute_follows_flag() -> Result<(), Box<dyn Error>> {
        let flag = Speaker::new();
        let mut m = Mute::new();
        m.follow(&flag)?;
        assert!(!m.is_beeping());
        flag.set_active(true);
        m.follow(&flag)?;
        assert!(m.is_beeping());
        flag.set_active(false);
        m.follow(&flag)?;
        assert!(!m.is_beeping());
        Ok(())
    }
}
