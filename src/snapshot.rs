//! Point-in-time copies of the whole machine, for rewind and save slots.
//!
//! A [`Snapshot`] owns its own copy of every array in the machine, so the
//! live interpreter and any number of snapshots can change independently.
//! Snapshots also know how to write themselves out as JSON and read
//! themselves back; the random number generator goes along for the ride, so a
//! restored machine replays exactly the same random numbers.

use crate::error::Chip8Error;
use crate::interpreter::Chip8State;
use serde::{Deserialize, Serialize};
use std::io;

/// bump when `Chip8State` changes shape
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    state: Chip8State,
}

/// what actually goes on disk
#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    program: String,
    snapshot: Snapshot,
}

impl Snapshot {
    pub fn capture(state: &Chip8State) -> Self {
        Snapshot {
            state: state.clone(),
        }
    }

    pub fn state(&self) -> &Chip8State {
        &self.state
    }

    pub fn into_state(self) -> Chip8State {
        self.state
    }

    /// serialise, tagged with the program it was taken from
    pub fn write_to(&self, writer: impl io::Write, program: &str) -> Result<(), Chip8Error> {
        let file = SnapshotFile {
            version: SNAPSHOT_FORMAT_VERSION,
            program: program.to_string(),
            snapshot: self.clone(),
        };
        serde_json::to_writer(writer, &file)?;
        Ok(())
    }

    /// deserialise; returns the program name alongside
    pub fn read_from(reader: impl io::Read) -> Result<(Snapshot, String), Chip8Error> {
        let file: SnapshotFile = serde_json::from_reader(reader)?;
        if file.version != SNAPSHOT_FORMAT_VERSION {
            return Err(Chip8Error::IncompatibleSave {
                found: file.version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        Ok((file.snapshot, file.program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{Chip8Interpreter, Mode};

    fn busy_machine() -> Chip8Interpreter {
        // draw a glyph, set the timers, pull a random number
        let mut i = Chip8Interpreter::with_seed(Mode::default(), 42);
        i.load_program(&[0xa0, 0x50, 0xd0, 0x05, 0x61, 0x30, 0xf1, 0x15, 0xc2, 0xff])
            .unwrap();
        for _ in 0..5 {
            i.cycle().unwrap();
        }
        i
    }

    #[test]
    fn test_capture_is_deep() {
        let mut i = busy_machine();
        let snap = i.snapshot();
        i.update_timers();
        i.set_keypad([true; 16]);
        assert_eq!(snap.state().timers.delay, 0x30);
        assert_eq!(snap.state().keypad, [false; 16]);
        assert_ne!(snap.state(), i.state());
    }

    #[test]
    fn test_file_round_trip() {
        let i = busy_machine();
        let snap = i.snapshot();
        let mut buf = Vec::new();
        snap.write_to(&mut buf, "pong").unwrap();
        let (back, program) = Snapshot::read_from(buf.as_slice()).unwrap();
        assert_eq!(program, "pong");
        assert_eq!(back, snap);
    }

    #[test]
    fn test_restored_rng_replays() {
        let mut i = busy_machine();
        i.load_program(&[0xc2, 0xff, 0xc3, 0xff, 0xc4, 0xff]).unwrap();
        let mut rewound = i.snapshot().into_state();
        rewound.program_counter = 0x200;
        i.restore(Snapshot::capture(&rewound));
        let mut buf = Vec::new();
        i.snapshot().write_to(&mut buf, "rnd").unwrap();

        let mut replay = Chip8Interpreter::with_seed(Mode::default(), 7);
        replay.restore(Snapshot::read_from(buf.as_slice()).unwrap().0);
        for _ in 0..3 {
            i.cycle().unwrap();
            replay.cycle().unwrap();
        }
        assert_eq!(i.state().registers, replay.state().registers);
        assert_eq!(i.state(), replay.state());
    }

    #[test]
    fn test_rejects_other_versions() {
        let i = busy_machine();
        let mut buf = Vec::new();
        i.snapshot().write_to(&mut buf, "x").unwrap();
        let mut json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        json["version"] = serde_json::json!(99);
        let bytes = serde_json::to_vec(&json).unwrap();
        match Snapshot::read_from(bytes.as_slice()) {
            Err(Chip8Error::IncompatibleSave { found, expected }) => {
                assert_eq!(found, 99);
                assert_eq!(expected, SNAPSHOT_FORMAT_VERSION);
            }
            other => panic!("unexpected {:?}", other.map(|(_, p)| p)),
        }
    }
}
