use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;

use chip8_rewind::config::Config;
use chip8_rewind::display::MonoTermDisplay;
use chip8_rewind::emulator::Emulator;
use chip8_rewind::input::TermInput;
use chip8_rewind::interpreter::Chip8Interpreter;
use chip8_rewind::savestate::SaveSlots;
use chip8_rewind::sound::SimpleBeep;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// CHIP-8 in a terminal. Esc quits, Backspace rewinds, F5/F8 save/load the
/// selected slot, F6/F7 pick a slot.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// program image to run
    rom: PathBuf,

    /// settings file; written with defaults if missing
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// 64x64 display
    #[arg(long)]
    hi_res: bool,

    #[arg(long)]
    super_chip: bool,

    /// seed the random number generator for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// stop after this many instructions
    #[arg(long)]
    cycles: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::read_or_create(&args.config)?;
    config.hi_res |= args.hi_res;
    config.super_chip |= args.super_chip;

    // initialise
    let mut interpreter = match args.seed {
        Some(seed) => Chip8Interpreter::with_seed(config.mode(), seed),
        None => Chip8Interpreter::new(config.mode()),
    };
    let mut f = File::open(&args.rom)?;
    interpreter.load_program_from(&mut f)?;

    let program = args
        .rom
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "program".to_string());
    let slots = SaveSlots::new(&config.savestate_dir, program, config.savestate_slots);

    let result = {
        let mut display = MonoTermDisplay::new()?;
        let mut input = TermInput::new()?;
        let mut sound = SimpleBeep::new();
        let mut emulator = Emulator::new(
            &config,
            interpreter,
            slots,
            &mut display,
            &mut input,
            &mut sound,
        )?;
        emulator.main_loop(args.cycles)
    };

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..2 {
        println!();
    }
    result
}
