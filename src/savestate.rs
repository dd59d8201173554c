//! Save slots that survive restarts.
//!
//! Each slot is one file, `<dir>/<program>_<slot>.sav`, holding a
//! serialised [`Snapshot`]. Slots are independent of each other; loading a
//! slot nobody has saved to is an ordinary, reportable condition.

use crate::error::Chip8Error;
use crate::interpreter::Chip8Interpreter;
use crate::snapshot::Snapshot;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct SaveSlots {
    dir: PathBuf,
    program: String,
    slots: usize,
    selected: usize,
}

impl SaveSlots {
    /// `program` keys the files, so different programs don't share slots
    pub fn new(dir: impl Into<PathBuf>, program: impl Into<String>, slots: usize) -> Self {
        assert!(slots > 0, "need at least one save slot");
        SaveSlots {
            dir: dir.into(),
            program: program.into(),
            slots,
            selected: 0,
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) -> usize {
        self.selected = (self.selected + 1) % self.slots;
        self.selected
    }

    pub fn select_previous(&mut self) -> usize {
        self.selected = (self.selected + self.slots - 1) % self.slots;
        self.selected
    }

    pub fn path(&self, slot: usize) -> PathBuf {
        self.dir.join(format!("{}_{}.sav", self.program, slot))
    }

    fn check(&self, slot: usize) -> Result<(), Chip8Error> {
        if slot >= self.slots {
            return Err(Chip8Error::SlotOutOfRange {
                slot,
                slots: self.slots,
            });
        }
        Ok(())
    }

    pub fn is_empty(&self, slot: usize) -> bool {
        !self.path(slot).is_file()
    }

    /// Snapshot the machine into a slot, replacing whatever was there.
    ///
    /// The file is written next to the slot and renamed over it, so a failed
    /// save leaves the previous one loadable.
    pub fn save(&self, slot: usize, interpreter: &Chip8Interpreter) -> Result<(), Chip8Error> {
        self.check(slot)?;
        fs::create_dir_all(&self.dir)?;
        let path = self.path(slot);
        let staging = path.with_extension("sav.tmp");
        if let Err(e) = Self::write_snapshot(&staging, interpreter, &self.program) {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
        fs::rename(&staging, &path)?;
        info!(slot, path = %path.display(), "state saved");
        Ok(())
    }

    fn write_snapshot(
        path: &Path,
        interpreter: &Chip8Interpreter,
        program: &str,
    ) -> Result<(), Chip8Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        interpreter.snapshot().write_to(&mut writer, program)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    /// the snapshot saved in a slot
    pub fn load(&self, slot: usize) -> Result<Snapshot, Chip8Error> {
        self.check(slot)?;
        let path = self.path(slot);
        if !path.is_file() {
            warn!(slot, "save slot is empty");
            return Err(Chip8Error::SlotEmpty { slot });
        }
        let (snapshot, program) = Snapshot::read_from(BufReader::new(File::open(&path)?))?;
        if program != self.program {
            warn!(slot, saved = %program, expected = %self.program, "save file from another program");
        }
        info!(slot, path = %path.display(), "state loaded");
        Ok(snapshot)
    }

    /// load a slot straight into the machine; the machine is untouched on error
    pub fn restore_into(
        &self,
        slot: usize,
        interpreter: &mut Chip8Interpreter,
    ) -> Result<(), Chip8Error> {
        let snapshot = self.load(slot)?;
        interpreter.restore(snapshot);
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
