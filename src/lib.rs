//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the interpreter owns memory and registers, and borrows everything else
//! * abstract display, keypad and sound behind traits so the interpreter
//!   doesn't need to know how they work; tests plug in plain in-memory ones
//! * CHIP-8 instructions run as fast as possible then sleep, to hold the
//!   configured clock rate
//! * timers tick on their own thread, so `FX0A` can block without freezing them
//!
//! Model
//!
//! Front end (main.rs)
//!  |-- screen, terminal input, beeper, config
//!  |-- shared frame buffer, keypad, speaker flag
//!  |-- interpreter thread
//!  |    |-- interpreter(frame buffer, keypad, speaker flag, config)
//!  |    |    |-- memory, registers, timers
//!  |    |    `-- decode -> instruction -> execute
//!  |    `-- timer thread, 60Hz
//!  `-- main loop, per frame
//!       |-- poll terminal -> keypad
//!       |-- frame buffer snapshot -> screen
//!       `-- speaker flag -> beeper
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod sound;
pub mod timer;

pub use config::Chip8Config;
pub use error::{Chip8Error, Fault};
pub use interpreter::Chip8Interpreter;
