//! # interpreter
//!
//! Fetch, decode and execute, one instruction at a time. Each call to
//! [`Chip8Interpreter::step`] is a complete transaction: by the time it returns
//! every register, memory and display effect of that instruction is visible.
//!
//! The delay and sound timers are counted down by a thread of their own while
//! [`Chip8Interpreter::main_loop`] runs, so they keep going while the
//! instruction stream is parked in `FX0A` waiting for a key.
use crate::config::Chip8Config;
use crate::display::{DisplayBuffer, DISPLAY_COLS, DISPLAY_ROWS};
use crate::error::{Chip8Error, Fault};
use crate::input::Keypad;
use crate::instruction::{Instruction, Opcode};
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::registers::Registers;
use crate::sound::SoundFlag;
use crate::timer::{Ticker, Timers};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spin_sleep::LoopHelper;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// sprites are always a byte wide
const SPRITE_WIDTH: usize = 8;

pub struct Chip8Interpreter<'a> {
    memory: Chip8MemoryMap,
    registers: Registers,
    timers: Arc<Timers>,
    display: &'a mut dyn DisplayBuffer,
    keypad: &'a dyn Keypad,
    sound: &'a dyn SoundFlag,
    rng: StdRng,
    config: Chip8Config,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        display: &'a mut dyn DisplayBuffer,
        keypad: &'a dyn Keypad,
        sound: &'a dyn SoundFlag,
        config: Chip8Config,
    ) -> Chip8Interpreter<'a> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            registers: Registers::new(),
            timers: Arc::new(Timers::new()),
            display,
            keypad,
            sound,
            rng,
            config,
        }
    }

    /// load a chip8 program and point the program counter at it
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        let len = self.memory.load_program(reader)?;
        self.registers.pc = self.memory.program_addr;
        Ok(len)
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Chip8MemoryMap {
        &mut self.memory
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn display(&self) -> &dyn DisplayBuffer {
        &*self.display
    }

    /// one 60Hz timer step, for hosts that drive the timers themselves
    pub fn tick_timers(&mut self) {
        self.sound.set_active(self.timers.tick());
    }

    /// fetch, decode and execute a single instruction
    pub fn step(&mut self) -> Result<(), Chip8Error> {
        let pc = self.registers.pc;
        let word = self.memory.fetch(pc)?;
        self.registers.pc = pc.wrapping_add(2);

        let halt = |fault| Chip8Error::Halted {
            opcode: word,
            pc,
            fault,
        };
        let instruction = Instruction::try_from(Opcode::from(word)).map_err(halt)?;
        trace!("{:#06x}: {:04x} {}", pc, word, instruction);
        self.execute(instruction).map_err(halt)
    }

    /// Run at the configured clock rate until an instruction fails, or until
    /// `max_cycles` instructions have run. Returns how many ran.
    pub fn main_loop(&mut self, max_cycles: Option<u64>) -> Result<u64, Chip8Error> {
        let timers = Arc::clone(&self.timers);
        let sound = self.sound;
        let timer_hz = self.config.timer_hz;
        let running = AtomicBool::new(true);

        info!(
            "running at {}Hz, timers at {}Hz",
            self.config.clock_hz, timer_hz
        );
        thread::scope(|s| {
            s.spawn(|| {
                let mut ticker = Ticker::from_hz(timer_hz);
                while running.load(Ordering::Acquire) {
                    spin_sleep::sleep(ticker.remaining());
                    if ticker.tick() {
                        sound.set_active(timers.tick());
                    }
                }
            });
            let result = self.run_clocked(max_cycles);
            running.store(false, Ordering::Release);
            result
        })
    }

    fn run_clocked(&mut self, max_cycles: Option<u64>) -> Result<u64, Chip8Error> {
        // a zero rate runs at 1Hz, same as the timers
        let clock_hz = self.config.clock_hz.max(1);
        let mut loop_helper = LoopHelper::builder()
            .build_with_target_rate(f64::from(clock_hz));
        let mut cycles = 0u64;
        while max_cycles.map_or(true, |max| cycles < max) {
            loop_helper.loop_start();
            self.step()?;
            cycles += 1;
            loop_helper.loop_sleep();
        }
        info!("stopped after {} cycles", cycles);
        Ok(cycles)
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.registers.pc = self.registers.pc.wrapping_add(2);
        }
    }

    fn execute(&mut self, instruction: Instruction) -> Result<(), Fault> {
        use Instruction::*;
        let r = &mut self.registers;
        match instruction {
            Cls => self.display.clear(),
            Ret => r.pc = r.pop()?,
            Jp { addr } => r.pc = addr,
            Call { addr } => {
                r.push(r.pc)?;
                r.pc = addr;
            }
            SeImm { x, nn } => {
                let c = r.v(x) == nn;
                self.skip_if(c)
            }
            SneImm { x, nn } => {
                let c = r.v(x) != nn;
                self.skip_if(c)
            }
            SeReg { x, y } => {
                let c = r.v(x) == r.v(y);
                self.skip_if(c)
            }
            SneReg { x, y } => {
                let c = r.v(x) != r.v(y);
                self.skip_if(c)
            }
            LdImm { x, nn } => r.set_v(x, nn),
            AddImm { x, nn } => r.set_v(x, r.v(x).wrapping_add(nn)),
            Ld { x, y } => r.set_v(x, r.v(y)),
            Or { x, y } => *r.v_mut(x) |= r.v(y),
            And { x, y } => *r.v_mut(x) &= r.v(y),
            Xor { x, y } => *r.v_mut(x) ^= r.v(y),
            Add { x, y } => {
                let (result, carry) = r.v(x).overflowing_add(r.v(y));
                r.set_v(x, result);
                r.set_flag(carry);
            }
            // VF = 1 means no borrow
            Sub { x, y } => {
                let (result, borrow) = r.v(x).overflowing_sub(r.v(y));
                r.set_v(x, result);
                r.set_flag(!borrow);
            }
            Subn { x, y } => {
                let (result, borrow) = r.v(y).overflowing_sub(r.v(x));
                r.set_v(x, result);
                r.set_flag(!borrow);
            }
            Shr { x } => {
                let vx = r.v(x);
                r.set_v(x, vx >> 1);
                r.set_flag(vx & 0x01 == 0x01);
            }
            Shl { x } => {
                let vx = r.v(x);
                r.set_v(x, vx << 1);
                r.set_flag(vx & 0x80 == 0x80);
            }
            LdI { addr } => r.i = addr,
            JpV0 { addr } => r.pc = addr + r.v(0) as u16,
            Rnd { x, nn } => {
                let random: u8 = self.rng.gen();
                self.registers.set_v(x, random & nn);
            }
            Drw { x, y, n } => self.draw(x, y, n)?,
            Skp { x } => {
                let c = self.keypad.is_pressed(r.v(x));
                self.skip_if(c)
            }
            Sknp { x } => {
                let c = !self.keypad.is_pressed(r.v(x));
                self.skip_if(c)
            }
            LdVxDt { x } => r.set_v(x, self.timers.delay()),
            LdVxK { x } => {
                debug!("waiting for a key for V{:X}", x);
                let key = self.keypad.next_pressed_key();
                debug!("got key {:X}", key);
                self.registers.set_v(x, key);
            }
            LdDtVx { x } => self.timers.set_delay(r.v(x)),
            LdStVx { x } => {
                self.timers.set_sound(r.v(x));
                self.sound.set_active(self.timers.sound_active());
            }
            // VF is left alone, and I isn't masked to 12 bits
            AddIVx { x } => r.i = r.i.wrapping_add(r.v(x) as u16),
            LdFVx { x } => r.i = self.memory.glyph_addr(r.v(x)),
            LdBVx { x } => {
                let v = r.v(x);
                self.memory.write(&[v / 100, v / 10 % 10, v % 10], r.i)?;
            }
            // I is left where it was
            LdIVx { x } => self.memory.write(r.v_range(x), r.i)?,
            LdVxI { x } => {
                let bytes = self.memory.get_ro_slice(r.i, x as usize + 1)?;
                r.v_range_mut(x).copy_from_slice(bytes);
            }
        }
        Ok(())
    }

    /// XOR an 8xN sprite from memory at I onto the display. The start position
    /// wraps around the screen; the sprite itself is clipped at the right and
    /// bottom edges. VF ends up 1 if any lit pixel was turned off.
    fn draw(&mut self, x: u8, y: u8, n: u8) -> Result<(), Fault> {
        let start_col = self.registers.v(x) as usize % DISPLAY_COLS;
        let start_row = self.registers.v(y) as usize % DISPLAY_ROWS;
        let sprite = self.memory.get_ro_slice(self.registers.i, n as usize)?;
        let mut collision = false;

        for (row_offset, bits) in sprite.iter().enumerate() {
            let row = start_row + row_offset;
            if row >= DISPLAY_ROWS {
                break;
            }
            for col_offset in 0..SPRITE_WIDTH {
                let col = start_col + col_offset;
                if col >= DISPLAY_COLS {
                    break;
                }
                if bits & (0x80u8 >> col_offset) == 0 {
                    continue;
                }
                let pixel = self.display.get(row, col);
                collision |= pixel.is_on();
                self.display.set(pixel.toggled(), row, col);
            }
        }
        self.registers.set_flag(collision);
        Ok(())
    }
}
