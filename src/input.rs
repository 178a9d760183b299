use clap::ValueEnum;
use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::HashMap;
use std::io;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub const KEY_COUNT: usize = 16;

/// how often a blocked key wait re-checks, even without being signalled
const KEY_WAIT_POLL: Duration = Duration::from_millis(50);

/// terminals only report presses (and autorepeat), so a key counts as held
/// until it hasn't been seen for this long
const KEY_HOLD: Duration = Duration::from_millis(150);

/// map of characters read from the keyboard to what the chip8 might expect
/// where '1' => 0x01 and 'a' => 0x0a
const CHIP8_LITERAL_KEYMAP: [(char, u8); 16] = [
    ('0', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('4', 0x04),
    ('5', 0x05),
    ('6', 0x06),
    ('7', 0x07),
    ('8', 0x08),
    ('9', 0x09),
    ('a', 0x0a),
    ('b', 0x0b),
    ('c', 0x0c),
    ('d', 0x0d),
    ('e', 0x0e),
    ('f', 0x0f),
];

/// ditto using left-hand side of qwerty keyboard
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// which physical layout drives the hex keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Keymap {
    /// 1234/qwer/asdf/zxcv, laid out like the COSMAC keypad
    #[default]
    Conventional,
    /// type the hex digit itself
    Literal,
}

impl Keymap {
    fn table(self) -> HashMap<char, u8> {
        match self {
            Keymap::Conventional => HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            Keymap::Literal => HashMap::from(CHIP8_LITERAL_KEYMAP),
        }
    }
}

/// The 16-key hex keypad, as seen by the interpreter. Written by an input
/// source on another thread, so everything goes through `&self`.
pub trait Keypad: Send + Sync {
    /// is the key at this address down right now
    fn is_pressed(&self, key: u8) -> bool;

    /// block until a key is pressed, and return its address
    fn next_pressed_key(&self) -> u8;

    /// release every key
    fn clear(&self);
}

#[derive(Debug, Default)]
struct KeyState {
    pressed: [bool; KEY_COUNT],
    /// most recent press, consumed by a waiting `next_pressed_key`
    latest: Option<u8>,
}

/// Keypad shared between an input producer and the interpreter
#[derive(Debug, Default)]
pub struct SharedKeypad {
    state: Mutex<KeyState>,
    pressed: Condvar,
}

impl SharedKeypad {
    pub fn new() -> Self {
        SharedKeypad::default()
    }

    // key state is plain data, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, KeyState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// put a key down, waking anything waiting for a key
    pub fn press(&self, key: u8) {
        if key as usize >= KEY_COUNT {
            return;
        }
        let mut state = self.lock();
        state.pressed[key as usize] = true;
        state.latest = Some(key);
        self.pressed.notify_all();
    }

    pub fn release(&self, key: u8) {
        if key as usize >= KEY_COUNT {
            return;
        }
        self.lock().pressed[key as usize] = false;
    }
}

impl Keypad for SharedKeypad {
    fn is_pressed(&self, key: u8) -> bool {
        (key as usize) < KEY_COUNT && self.lock().pressed[key as usize]
    }

    fn next_pressed_key(&self) -> u8 {
        let mut state = self.lock();
        // only presses after we started waiting count
        state.latest = None;
        loop {
            if let Some(key) = state.latest.take() {
                return key;
            }
            state = match self.pressed.wait_timeout(state, KEY_WAIT_POLL) {
                Ok((guard, _)) => guard,
                Err(e) => e.into_inner().0,
            };
        }
    }

    fn clear(&self) {
        let mut state = self.lock();
        state.pressed = [false; KEY_COUNT];
        state.latest = None;
    }
}

/// what the user asked of the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Continue,
    Quit,
}

/// reads keypresses from the terminal, and feeds them to a keypad
pub struct TermInput {
    keymap: HashMap<char, u8>,
    last_seen: HashMap<u8, Instant>,
}

impl TermInput {
    pub fn new(keymap: Keymap) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: keymap.table(),
            last_seen: HashMap::new(),
        })
    }

    /// drain pending terminal events into the keypad, then release any key
    /// that's gone quiet
    pub fn poll(&mut self, keypad: &SharedKeypad) -> Result<InputEvent, io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Esc => return Ok(InputEvent::Quit),
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(InputEvent::Quit)
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&mapped_key) => {
                            keypad.press(mapped_key);
                            self.last_seen.insert(mapped_key, Instant::now());
                        }
                        None => warn!("can't map {:?} to a COSMAC key", key),
                    },
                    other => debug!("ignoring key {:?}", other),
                },
                other => debug!("ignoring event {:?}", other),
            }
        }
        self.last_seen.retain(|&key, seen| {
            let held = seen.elapsed() < KEY_HOLD;
            if !held {
                keypad.release(key);
            }
            held
        });
        Ok(InputEvent::Continue)
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
