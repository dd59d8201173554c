//! A CHIP-8 interpreter with rewind and save states.
//!
//! ## Design
//!
//! * the interpreter owns the whole machine in one value and runs exactly one
//!   instruction per `cycle()`; it has no notion of wallclock time
//! * timers tick separately, at whatever rate the caller drives them
//! * a snapshot is a deep copy of the machine, random number generator
//!   included, so restoring one replays execution exactly
//! * rewind keeps a fixed ring of recent snapshots; save slots persist
//!   snapshots to disk, one file per (program, slot)
//! * display, input and sound sit behind traits so the terminal versions can
//!   be swapped for dummies in tests
//!
//! Model
//!
//! Emulator
//!  |-- config
//!  |-- interpreter(mode)
//!  |    |-- memory, framebuffer, timers
//!  |    `-- instruction set
//!  |-- rewind buffer, save slots
//!  |-- display, input, sound
//!  `-- main loop
pub mod config;
pub mod display;
pub mod emulator;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod rewind;
pub mod savestate;
pub mod snapshot;
pub mod sound;
pub mod timers;

pub use error::Chip8Error;
pub use interpreter::{Chip8Interpreter, Chip8State, Mode, Step};
pub use rewind::RewindBuffer;
pub use savestate::SaveSlots;
pub use snapshot::Snapshot;
