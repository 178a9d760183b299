use crate::error::{Chip8Error, Fault};
use log::debug;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the flat, byte-addressed RAM of the machine
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), Fault> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word
    fn get_word(&self, addr: u16) -> Result<u16, Fault> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Fault>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Fault>;
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the hex glyphs live, and how tall each one is
pub const CHIP8_FONT_ADDR: u16 = 0x050;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 standard memory map, 4K configuration:
///   0x0000-0x004f  unused (interpreter on the COSMAC)
///   0x0050-0x009f  hex font
///   0x00a0-0x01ff  unused
///   0x0200-0x0fff  program
///
/// unlike the COSMAC the stack, variables and display live outside RAM, so a
/// program can use everything from 0x200 up
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub font_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Fault> {
        let a = addr as usize;
        self.bytes
            .get_mut(a..(a + len))
            .ok_or_else(|| Fault::MemoryOutOfBounds { addr: a + len - 1 })
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Fault> {
        let a = addr as usize;
        self.bytes
            .get(a..(a + len))
            .ok_or_else(|| Fault::MemoryOutOfBounds { addr: a + len - 1 })
    }
}

impl Chip8MemoryMap {
    /// initialises CHIP-8 RAM with the font baked in
    pub fn new() -> Self {
        let mut bytes = vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice();
        let font = CHIP8_FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap {
            bytes,
            program_addr: CHIP8_PROGRAM_ADDR,
            font_addr: CHIP8_FONT_ADDR,
        }
    }

    /// load a CHIP-8 program at 0x200, returning how many bytes were loaded
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let max = self.max_program_size();
        if buf.len() > max {
            return Err(Chip8Error::ProgramTooLarge {
                size: buf.len(),
                max,
            });
        }
        self.write(&buf, self.program_addr)
            .map_err(|_| Chip8Error::ProgramTooLarge { size: buf.len(), max })?;
        debug!(
            "loaded {} byte program at {:#06x}",
            buf.len(),
            self.program_addr
        );
        Ok(buf.len())
    }

    pub fn max_program_size(&self) -> usize {
        CHIP8_RAM_SIZE_BYTES - self.program_addr as usize
    }

    /// fetch the instruction word at pc; the last complete word starts at
    /// `CHIP8_RAM_SIZE_BYTES - 2`
    pub fn fetch(&self, pc: u16) -> Result<u16, Chip8Error> {
        if pc as usize > CHIP8_RAM_SIZE_BYTES - 2 {
            return Err(Chip8Error::PcOutOfBounds { pc });
        }
        self.get_word(pc).map_err(|_| Chip8Error::PcOutOfBounds { pc })
    }

    /// address of the 5-byte glyph for a hex digit; only the low nibble counts
    pub fn glyph_addr(&self, digit: u8) -> u16 {
        self.font_addr + (digit & 0x0f) as u16 * CHIP8_FONT_GLYPH_BYTES
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Chip8MemoryMap::new()
    }
}

pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed from 0x200 because before that we bake in the font
        assert_eq!(m.bytes[0x200..], [0; 0xe00]);
        assert_eq!(m.bytes.len(), 4096);
    }

    #[test]
    fn test_font_baked_in() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(0x050, 80).unwrap(), &CHIP8_FONT);
        assert_eq!(m.bytes[..0x50], [0; 0x50]);
    }

    #[test]
    fn test_glyph_addr() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.glyph_addr(0x0), 0x050);
        assert_eq!(m.glyph_addr(0xa), 0x050 + 50);
        assert_eq!(m.glyph_addr(0xf), 0x09b);
        // high nibble ignored
        assert_eq!(m.glyph_addr(0x1a), m.glyph_addr(0x0a));
        let f = m.glyph_addr(0xf);
        assert_eq!(
            m.get_ro_slice(f, 5).unwrap(),
            &[0xF0, 0x80, 0xF0, 0x80, 0x80]
        );
    }

    #[test]
    fn test_write_data_ok() -> Result<(), Fault> {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x208)?;
        assert_eq!(
            dst.bytes[0x200..0x210],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[9, 8, 7], 0x300).unwrap();
        assert_eq!(dst.bytes[0x2ff..0x304], [0, 9, 8, 7, 0]);
    }

    #[test]
    fn test_write_past_end_is_fault() {
        let mut dst = Chip8MemoryMap::new();
        assert_eq!(
            dst.write(&[0; 8], 4092),
            Err(Fault::MemoryOutOfBounds { addr: 4099 })
        );
        // nothing partially written
        assert_eq!(dst.bytes[4092..], [0; 4]);
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x200).unwrap();
        assert_eq!(m.get_word(0x204), Ok(0x0405));
    }

    #[test]
    fn test_fetch_last_word_ok() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0xc3, 0x3c], 4094).unwrap();
        assert_eq!(m.fetch(4094).unwrap(), 0xc33c);
    }

    #[test]
    fn test_fetch_past_end_fails() {
        let m = Chip8MemoryMap::new();
        for pc in [4095u16, 4096, 0xffff] {
            match m.fetch(pc) {
                Err(Chip8Error::PcOutOfBounds { pc: got }) => assert_eq!(got, pc),
                other => panic!("expected PcOutOfBounds, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.load_program(&mut prog)?, 2);
        assert_eq!(dst.get_ro_slice(0x200, 2).unwrap(), &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_fills_memory_exactly() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        let prog = vec![0xaa; 0xe00];
        dst.load_program(&mut prog.as_slice())?;
        assert_eq!(dst.bytes[0xfff], 0xaa);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut dst = Chip8MemoryMap::new();
        let prog = vec![0xaa; 0xe01];
        match dst.load_program(&mut prog.as_slice()) {
            Err(Chip8Error::ProgramTooLarge { size, max }) => {
                assert_eq!(size, 0xe01);
                assert_eq!(max, 0xe00);
            }
            other => panic!("expected ProgramTooLarge, got {:?}", other),
        }
    }
}
