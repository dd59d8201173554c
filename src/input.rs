use crate::interpreter::CHIP8_KEY_COUNT;
use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::Duration;
use tracing::warn;

/// hex keypad laid over the left-hand side of a qwerty keyboard
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals only report presses (and repeats), never releases, so a press
/// counts as held for this many polls
const HOLD_POLLS: u32 = 8;

/// things the user can ask of the emulator itself
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    SaveState,
    LoadState,
    NextSlot,
    PreviousSlot,
}

/// reads keypresses
pub trait Input {
    /// poll the device; returns which hex keys are currently held
    fn keypad(&mut self) -> Result<[bool; CHIP8_KEY_COUNT], io::Error>;

    /// emulator commands received since the last call
    fn take_commands(&mut self) -> Vec<Command>;

    /// the rewind key is being held
    fn rewind_held(&self) -> bool;
}

/// keyboard input from the terminal, using crossterm in raw mode
pub struct TermInput {
    keymap: HashMap<char, u8>,
    held: [u32; CHIP8_KEY_COUNT],
    rewind: u32,
    commands: Vec<Command>,
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [0; CHIP8_KEY_COUNT],
            rewind: 0,
            commands: Vec::new(),
        })
    }

    fn read_events(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(mapped_key) => self.held[*mapped_key as usize] = HOLD_POLLS,
                        None => warn!("can't map {:?} to a CHIP-8 key", key),
                    },
                    KeyCode::Backspace => self.rewind = HOLD_POLLS,
                    KeyCode::Esc => self.commands.push(Command::Quit),
                    KeyCode::F(5) => self.commands.push(Command::SaveState),
                    KeyCode::F(8) => self.commands.push(Command::LoadState),
                    KeyCode::F(6) => self.commands.push(Command::PreviousSlot),
                    KeyCode::F(7) => self.commands.push(Command::NextSlot),
                    other => warn!("unhandled key {:?}", other),
                }
            }
        }
        Ok(())
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn keypad(&mut self) -> Result<[bool; CHIP8_KEY_COUNT], io::Error> {
        self.read_events()?;
        let mut keys = [false; CHIP8_KEY_COUNT];
        for (key, count) in keys.iter_mut().zip(self.held.iter_mut()) {
            *key = *count > 0;
            *count = count.saturating_sub(1);
        }
        self.rewind = self.rewind.saturating_sub(1);
        Ok(keys)
    }

    fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    fn rewind_held(&self) -> bool {
        self.rewind > 0
    }
}

/// dummy Input implementation for testing
#[derive(Default)]
pub struct DummyInput {
    pub keys: [bool; CHIP8_KEY_COUNT],
    pub commands: Vec<Command>,
    pub rewind: bool,
}

impl DummyInput {
    pub fn new(pressed: &[u8]) -> Self {
        let mut keys = [false; CHIP8_KEY_COUNT];
        for k in pressed {
            keys[(*k & 0xf) as usize] = true;
        }
        DummyInput {
            keys,
            ..DummyInput::default()
        }
    }
}

impl Input for DummyInput {
    fn keypad(&mut self) -> Result<[bool; CHIP8_KEY_COUNT], io::Error> {
        Ok(self.keys)
    }

    fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    fn rewind_held(&self) -> bool {
        self.rewind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_covers_every_key() {
        let mut seen = [false; CHIP8_KEY_COUNT];
        for (_, k) in CHIP8_CONVENTIONAL_KEYMAP {
            seen[k as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_dummy_input() {
        let mut i = DummyInput::new(&[0x1, 0xf]);
        i.commands.push(Command::SaveState);
        let keys = i.keypad().unwrap();
        assert!(keys[1] && keys[0xf] && !keys[0]);
        assert_eq!(i.take_commands(), vec![Command::SaveState]);
        assert!(i.take_commands().is_empty());
    }
}
