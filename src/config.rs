/// default instruction rate; roughly what most contemporary ROMs expect
pub const DEFAULT_CLOCK_HZ: u32 = 700;

/// delay and sound timers always count down at 60Hz on real hardware
pub const DEFAULT_TIMER_HZ: u32 = 60;

/// Knobs for a single interpreter run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chip8Config {
    /// instructions executed per second
    pub clock_hz: u32,
    /// timer decrements per second
    pub timer_hz: u32,
    /// seed for CXNN; entropy when unset
    pub seed: Option<u64>,
}

impl Default for Chip8Config {
    fn default() -> Self {
        Chip8Config {
            clock_hz: DEFAULT_CLOCK_HZ,
            timer_hz: DEFAULT_TIMER_HZ,
            seed: None,
        }
    }
}
