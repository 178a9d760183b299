use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const DISPLAY_ROWS: usize = 32;
pub const DISPLAY_COLS: usize = 64;

/// one monochrome pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pixel {
    #[default]
    Off,
    On,
}

impl Pixel {
    pub fn is_on(self) -> bool {
        self == Pixel::On
    }

    pub fn toggled(self) -> Pixel {
        match self {
            Pixel::Off => Pixel::On,
            Pixel::On => Pixel::Off,
        }
    }
}

/// The grid of pixels the interpreter draws into. Callers always pass
/// coordinates already inside the grid; XOR semantics live in the
/// interpreter, not here.
pub trait DisplayBuffer {
    /// turn every pixel off
    fn clear(&mut self);

    fn get(&self, row: usize, col: usize) -> Pixel;

    fn set(&mut self, pixel: Pixel, row: usize, col: usize);
}

/// Plain 32x64 row-major pixel grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    cells: Box<[Pixel]>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            cells: vec![Pixel::Off; DISPLAY_ROWS * DISPLAY_COLS].into_boxed_slice(),
        }
    }

    /// (row, col) of every lit pixel, top row first
    pub fn lit_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_on())
            .map(|(n, _)| (n / DISPLAY_COLS, n % DISPLAY_COLS))
    }

    /// how many pixels are lit
    pub fn lit(&self) -> usize {
        self.cells.iter().filter(|p| p.is_on()).count()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        FrameBuffer::new()
    }
}

impl DisplayBuffer for FrameBuffer {
    fn clear(&mut self) {
        self.cells.fill(Pixel::Off);
    }

    fn get(&self, row: usize, col: usize) -> Pixel {
        self.cells[row * DISPLAY_COLS + col]
    }

    fn set(&mut self, pixel: Pixel, row: usize, col: usize) {
        self.cells[row * DISPLAY_COLS + col] = pixel;
    }
}

/// A [`FrameBuffer`] the interpreter writes while a renderer on another
/// thread takes snapshots
#[derive(Debug, Clone, Default)]
pub struct SharedFrameBuffer {
    inner: Arc<Mutex<FrameBuffer>>,
}

impl SharedFrameBuffer {
    pub fn new() -> Self {
        SharedFrameBuffer::default()
    }

    // pixel state is plain data, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, FrameBuffer> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// copy of the grid as it stands between instructions
    pub fn snapshot(&self) -> FrameBuffer {
        self.lock().clone()
    }
}

impl DisplayBuffer for SharedFrameBuffer {
    fn clear(&mut self) {
        self.lock().clear()
    }

    fn get(&self, row: usize, col: usize) -> Pixel {
        self.lock().get(row, col)
    }

    fn set(&mut self, pixel: Pixel, row: usize, col: usize) {
        self.lock().set(pixel, row, col)
    }
}

/// Screen puts a frame in front of the user. The front end only ever hands
/// it whole frames, so any kind of output device will do.
pub trait Screen {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error>;
}

/// monochrome display in a terminal, rendered using TUI and crossterm; one
/// terminal cell per CHIP-8 pixel
pub struct TermScreen {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    title: String,
}

impl TermScreen {
    pub fn new(title: &str) -> Result<TermScreen, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(TermScreen {
            terminal,
            title: title.to_owned(),
        })
    }
}

/// canvas coordinates put the origin bottom left, so row 0 sits at the top
fn canvas_point(row: usize, col: usize) -> (f64, f64) {
    (col as f64, (DISPLAY_ROWS - 1 - row) as f64)
}

impl Drop for TermScreen {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl Screen for TermScreen {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        let coords: Vec<(f64, f64)> = frame
            .lit_cells()
            .map(|(row, col)| canvas_point(row, col))
            .collect();
        let title = self.title.as_str();
        self.terminal.draw(|f| {
            // border plus the grid
            let area = Rect::new(0, 0, 2 + DISPLAY_COLS as u16, 2 + DISPLAY_ROWS as u16);
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds([0.0, (DISPLAY_COLS - 1) as f64])
                .y_bounds([0.0, (DISPLAY_ROWS - 1) as f64])
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &coords,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, area);
        })?;
        Ok(())
    }
}

/// useful for running headless
pub struct DummyScreen;

impl Screen for DummyScreen {
    fn draw(&mut self, _frame: &FrameBuffer) -> Result<(), io::Error> {
        Ok(())
    }
}
