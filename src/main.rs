use clap::{value_parser, Parser};
use log::{error, info};
use spin_sleep::LoopHelper;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use chip8vm::config::{DEFAULT_CLOCK_HZ, DEFAULT_TIMER_HZ};
use chip8vm::display::{Screen, SharedFrameBuffer, TermScreen, DISPLAY_ROWS};
use chip8vm::input::{InputEvent, Keymap, SharedKeypad, TermInput};
use chip8vm::sound::{Mute, SimpleBeep, Sound, Speaker};
use chip8vm::{Chip8Config, Chip8Error, Chip8Interpreter};

/// how often the screen is redrawn and the keyboard read
const FRAME_RATE: f64 = 60.0;

/// Run a CHIP-8 program in the terminal
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// path to the ROM
    rom: PathBuf,

    /// instructions per second
    #[arg(
        long,
        default_value_t = DEFAULT_CLOCK_HZ,
        value_parser = value_parser!(u32).range(1..)
    )]
    clock_hz: u32,

    /// timer decrements per second
    #[arg(
        long,
        default_value_t = DEFAULT_TIMER_HZ,
        value_parser = value_parser!(u32).range(1..)
    )]
    timer_hz: u32,

    /// stop after this many instructions
    #[arg(long)]
    cycles: Option<u64>,

    /// seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// don't beep
    #[arg(long)]
    mute: bool,

    /// keyboard layout for the hex keypad
    #[arg(long, value_enum, default_value_t = Keymap::Conventional)]
    keymap: Keymap,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    // initialise
    let rom = fs::read(&args.rom)?;
    let config = Chip8Config {
        clock_hz: args.clock_hz,
        timer_hz: args.timer_hz,
        seed: args.seed,
    };
    let frame = SharedFrameBuffer::new();
    let keypad = Arc::new(SharedKeypad::new());
    let speaker = Arc::new(Speaker::new());

    // the interpreter gets a thread of its own, since FX0A can park it
    // indefinitely
    let cpu = {
        let mut frame = frame.clone();
        let keypad = Arc::clone(&keypad);
        let speaker = Arc::clone(&speaker);
        let cycles = args.cycles;
        thread::Builder::new()
            .name("chip8-cpu".into())
            .spawn(move || -> Result<u64, Chip8Error> {
                let mut interpreter =
                    Chip8Interpreter::new(&mut frame, &*keypad, &*speaker, config);
                interpreter.load_program(&mut rom.as_slice())?;
                interpreter.main_loop(cycles)
            })?
    };
    info!("running {}", args.rom.display());

    let title = args
        .rom
        .file_name()
        .map_or_else(|| "CHIP-8".into(), |name| name.to_string_lossy());
    let mut screen = TermScreen::new(&title)?;
    let mut input = TermInput::new(args.keymap)?;
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };

    let mut loop_helper = LoopHelper::builder().build_with_target_rate(FRAME_RATE);
    loop {
        loop_helper.loop_start();
        if input.poll(&keypad)? == InputEvent::Quit {
            info!("quit requested");
            break;
        }
        screen.draw(&frame.snapshot())?;
        sound.follow(&*speaker)?;
        if cpu.is_finished() {
            break;
        }
        loop_helper.loop_sleep();
    }
    if sound.is_beeping() {
        sound.stop()?;
    }
    drop(input);
    drop(screen);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..(DISPLAY_ROWS / 2) {
        println!();
    }

    // a cpu still blocked on a key is simply abandoned
    if cpu.is_finished() {
        match cpu.join() {
            Ok(Ok(cycles)) => info!("finished after {} cycles", cycles),
            Ok(Err(e)) => {
                error!("{}", e);
                return Err(e.into());
            }
            Err(_) => return Err("interpreter thread panicked".into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_must_be_positive() {
        assert!(Args::try_parse_from(["chip8vm", "rom.ch8", "--clock-hz", "0"]).is_err());
        assert!(Args::try_parse_from(["chip8vm", "rom.ch8", "--timer-hz", "0"]).is_err());
        let args = Args::try_parse_from(["chip8vm", "rom.ch8", "--clock-hz", "1"]).unwrap();
        assert_eq!(args.clock_hz, 1);
        assert_eq!(args.timer_hz, DEFAULT_TIMER_HZ);
    }
}
