/// # emulator
///
/// Sets everything up and runs the main loop. The interpreter doesn't know
/// about time, so this is where the rates live:
///
///  * one `cycle()` per loop iteration, `cycles_per_second` iterations a second
///  * `update_timers()` at `timer_updates_per_second`, from accumulated time
///  * a rewind snapshot at `rewind_frequency`, unless the rewind key is held,
///    in which case the machine steps backwards through history instead of
///    executing
///
/// Model
///
/// Emulator
///  |-- interpreter, rewind buffer, save slots
///  |-- display, input, sound (devices behind traits)
///  `-- main loop
///       |-- keypad -> interpreter; handle commands
///       |-- rewind or cycle
///       |-- timers / rewind snapshot as time accumulates
///       |-- sound follows the sound timer
///       `-- redraw when the draw flag is up
use crate::config::Config;
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::{Command, Input};
use crate::interpreter::Chip8Interpreter;
use crate::rewind::RewindBuffer;
use crate::savestate::SaveSlots;
use crate::sound::Sound;
use spin_sleep::LoopHelper;
use std::error::Error;
use std::io;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// turns elapsed wallclock time into a whole number of ticks at a fixed rate
struct Cadence {
    period: Duration,
    accumulated: Duration,
}

impl Cadence {
    fn per_second(rate: u32) -> Self {
        Cadence {
            period: Duration::from_secs(1) / rate,
            accumulated: Duration::ZERO,
        }
    }

    /// ticks due after `elapsed` more time has gone by
    fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;
        let mut ticks = 0;
        while self.accumulated >= self.period {
            self.accumulated -= self.period;
            ticks += 1;
        }
        ticks
    }
}

pub struct Emulator<'a> {
    interpreter: Chip8Interpreter,
    rewind: RewindBuffer,
    slots: SaveSlots,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    cycle_period: Duration,
    cycles_per_second: u32,
    timers: Cadence,
    recorder: Cadence,
    message: String,
    cycles: u64,
}

impl<'a> Emulator<'a> {
    pub fn new(
        config: &Config,
        interpreter: Chip8Interpreter,
        slots: SaveSlots,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Result<Self, Chip8Error> {
        config.validate()?;
        Ok(Emulator {
            interpreter,
            rewind: RewindBuffer::new(config.rewind_buffer_size),
            slots,
            display,
            input,
            sound,
            cycle_period: Duration::from_secs(1) / config.cycles_per_second,
            cycles_per_second: config.cycles_per_second,
            timers: Cadence::per_second(config.timer_updates_per_second),
            recorder: Cadence::per_second(config.rewind_frequency),
            message: String::new(),
            cycles: 0,
        })
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn rewind_buffer(&self) -> &RewindBuffer {
        &self.rewind
    }

    pub fn slots(&self) -> &SaveSlots {
        &self.slots
    }

    /// instructions executed so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// run in real time until quit, or until `max_cycles` instructions have run
    pub fn main_loop(&mut self, max_cycles: Option<u64>) -> Result<(), Box<dyn Error>> {
        let mut loop_helper =
            LoopHelper::builder().build_with_target_rate(self.cycles_per_second as f64);
        loop {
            let elapsed = loop_helper.loop_start();
            if !self.step(elapsed)? {
                info!(cycles = self.cycles, "quit");
                break;
            }
            if max_cycles.map_or(false, |max| self.cycles >= max) {
                info!(cycles = self.cycles, "cycle limit reached");
                break;
            }
            loop_helper.loop_sleep();
        }
        self.sound.follow(false)?;
        Ok(())
    }

    /// step as if exactly one cycle period went by; for running flat out
    pub fn step_nominal(&mut self) -> Result<bool, Box<dyn Error>> {
        self.step(self.cycle_period)
    }

    /// One iteration of the main loop. Returns false once the user quits.
    pub fn step(&mut self, elapsed: Duration) -> Result<bool, Box<dyn Error>> {
        let keys = self.input.keypad()?;
        self.interpreter.set_keypad(keys);

        for command in self.input.take_commands() {
            if !self.command(command)? {
                return Ok(false);
            }
        }

        let timer_ticks = self.timers.advance(elapsed);
        let snapshots_due = self.recorder.advance(elapsed);

        if self.input.rewind_held() {
            if snapshots_due > 0 {
                self.rewind_once();
            }
        } else {
            if let Err(e) = self.interpreter.cycle() {
                error!(error = %e, "interpreter halted");
                return Err(e.into());
            }
            self.cycles += 1;
            for _ in 0..timer_ticks {
                self.interpreter.update_timers();
            }
            if snapshots_due > 0 {
                self.rewind.record(self.interpreter.snapshot());
            }
        }

        self.sound.follow(self.interpreter.sound_active())?;

        if self.interpreter.draw_flag() {
            self.redraw()?;
        }
        Ok(true)
    }

    fn rewind_once(&mut self) {
        match self.rewind.rewind() {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                self.interpreter.restore(snapshot);
                self.interpreter.request_redraw();
                debug!(remaining = self.rewind.len(), "rewind");
            }
            None => self.message = "nothing to rewind".to_string(),
        }
    }

    fn command(&mut self, command: Command) -> Result<bool, Box<dyn Error>> {
        let slot = self.slots.selected();
        match command {
            Command::Quit => return Ok(false),
            // slot failures go on the status line; the machine carries on
            Command::SaveState => match self.slots.save(slot, &self.interpreter) {
                Ok(()) => self.message = format!("saved slot {}", slot),
                Err(e) => {
                    warn!(slot, error = %e, "save failed");
                    self.message = format!("save failed: {}", e);
                }
            },
            Command::LoadState => match self.slots.restore_into(slot, &mut self.interpreter) {
                Ok(()) => {
                    self.interpreter.request_redraw();
                    self.message = format!("loaded slot {}", slot);
                }
                Err(e) if e.is_recoverable() => self.message = e.to_string(),
                Err(e) => {
                    warn!(slot, error = %e, "load failed");
                    self.message = format!("load failed: {}", e);
                }
            },
            Command::NextSlot => {
                self.slots.select_next();
                self.message.clear();
            }
            Command::PreviousSlot => {
                self.slots.select_previous();
                self.message.clear();
            }
        }
        // slot changes show up straight away
        self.redraw()?;
        Ok(true)
    }

    pub fn status(&self) -> String {
        let slot = self.slots.selected();
        let empty = if self.slots.is_empty(slot) { " (empty)" } else { "" };
        format!("slot {}{}  {}", slot, empty, self.message)
    }

    fn redraw(&mut self) -> Result<(), io::Error> {
        let status = self.status();
        self.display.draw(self.interpreter.framebuffer(), &status)?;
        self.interpreter.clear_draw_flag();
        Ok(())
    }
}
