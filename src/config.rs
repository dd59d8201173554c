use crate::error::Chip8Error;
use crate::interpreter::Mode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Emulator settings, stored as JSON. Missing fields fall back to defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// instructions executed per second
    pub cycles_per_second: u32,
    /// delay/sound timer ticks per second
    pub timer_updates_per_second: u32,
    /// snapshots recorded for rewinding per second
    pub rewind_frequency: u32,
    /// how many snapshots the rewind history holds
    pub rewind_buffer_size: usize,
    pub savestate_slots: usize,
    pub savestate_dir: PathBuf,
    pub hi_res: bool,
    pub super_chip: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycles_per_second: 500,
            timer_updates_per_second: 60,
            rewind_frequency: 60,
            rewind_buffer_size: 600,
            savestate_slots: 6,
            savestate_dir: PathBuf::from("Savestates"),
            hi_res: false,
            super_chip: false,
        }
    }
}

impl Config {
    pub fn read(path: impl AsRef<Path>) -> Result<Config, Chip8Error> {
        let text = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Chip8Error> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// read the config, writing out the defaults first if there isn't one
    pub fn read_or_create(path: impl AsRef<Path>) -> Result<Config, Chip8Error> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "writing default config");
            Config::default().save(path)?;
        }
        Config::read(path)
    }

    pub fn validate(&self) -> Result<(), Chip8Error> {
        let zero = [
            ("cycles_per_second", self.cycles_per_second as usize),
            ("timer_updates_per_second", self.timer_updates_per_second as usize),
            ("rewind_frequency", self.rewind_frequency as usize),
            ("rewind_buffer_size", self.rewind_buffer_size),
            ("savestate_slots", self.savestate_slots),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);
        match zero {
            Some((name, _)) => Err(Chip8Error::Config(format!("{} must be above zero", name))),
            None => Ok(()),
        }
    }

    pub fn mode(&self) -> Mode {
        Mode {
            hi_res: self.hi_res,
            super_chip: self.super_chip,
        }
    }
}
