use crate::error::Fault;
use crate::memory::CHIP8_PROGRAM_ADDR;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;

/// VF doubles as carry, borrow and collision flag
pub const FLAG: u8 = 0xf;

/// The programmer-visible CPU state, minus the timers (which are shared with
/// the timer thread, see [`crate::timer::Timers`])
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    v: [u8; REGISTER_COUNT],
    /// index register
    pub i: u16,
    /// program counter; address of the next instruction to fetch
    pub pc: u16,
    stack: [u16; STACK_DEPTH],
    sp: usize,
}

impl Default for Registers {
    fn default() -> Self {
        Registers {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            stack: [0; STACK_DEPTH],
            sp: 0,
        }
    }
}

impl Registers {
    pub fn new() -> Self {
        Registers::default()
    }

    /// read VX; x comes from a 4-bit field, so anything >= 16 is a decode bug
    pub fn v(&self, x: u8) -> u8 {
        self.v[x as usize]
    }

    pub fn v_mut(&mut self, x: u8) -> &mut u8 {
        &mut self.v[x as usize]
    }

    pub fn set_v(&mut self, x: u8, value: u8) {
        self.v[x as usize] = value;
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.v[FLAG as usize] = flag as u8;
    }

    pub fn flag(&self) -> u8 {
        self.v[FLAG as usize]
    }

    /// push a return address
    pub fn push(&mut self, addr: u16) -> Result<(), Fault> {
        if self.sp >= STACK_DEPTH {
            return Err(Fault::StackOverflow);
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    /// pop the most recent return address
    pub fn pop(&mut self) -> Result<u16, Fault> {
        if self.sp == 0 {
            return Err(Fault::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    /// how many return addresses are on the stack
    pub fn depth(&self) -> usize {
        self.sp
    }

    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }

    /// V0..=VX as a slice
    pub fn v_range(&self, x: u8) -> &[u8] {
        &self.v[..=x as usize]
    }

    pub fn v_range_mut(&mut self, x: u8) -> &mut [u8] {
        &mut self.v[..=x as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_state() {
        let r = Registers::new();
        assert_eq!(r.pc, 0x200);
        assert_eq!(r.i, 0);
        assert_eq!(r.depth(), 0);
        for x in 0..16 {
            assert_eq!(r.v(x), 0);
        }
    }

    #[test]
    fn test_flag_is_vf() {
        let mut r = Registers::new();
        r.set_flag(true);
        assert_eq!(r.v(0xf), 1);
        r.set_flag(false);
        assert_eq!(r.flag(), 0);
    }

    #[test]
    fn test_stack_lifo() -> Result<(), Fault> {
        let mut r = Registers::new();
        r.push(0x202)?;
        r.push(0x404)?;
        assert_eq!(r.stack(), &[0x202, 0x404]);
        assert_eq!(r.pop()?, 0x404);
        assert_eq!(r.pop()?, 0x202);
        assert_eq!(r.depth(), 0);
        Ok(())
    }

    #[test]
    fn test_stack_overflow() {
        let mut r = Registers::new();
        for n in 0..16 {
            assert_eq!(r.push(n), Ok(()));
        }
        assert_eq!(r.push(0xabc), Err(Fault::StackOverflow));
        assert_eq!(r.depth(), 16);
    }

    #[test]
    fn test_stack_underflow() {
        let mut r = Registers::new();
        assert_eq!(r.pop(), Err(Fault::StackUnderflow));
        assert_eq!(r.depth(), 0);
    }

    #[test]
    #[should_panic]
    fn test_register_out_of_range_panics() {
        let r = Registers::new();
        let _ = r.v(16);
    }
}
