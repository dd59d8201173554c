/// # interpreter
///
/// A CHIP-8 machine is small enough that all of it lives in one value,
/// [`Chip8State`]:
///
///  * 4K of RAM, font at 0x050, program at 0x200
///  * V0-VF 8-bit registers; VF doubles as the carry/borrow/collision flag
///  * 12-bit I (index) register and program counter
///  * a 16 deep call stack
///  * delay and sound timers
///  * 64x32 (or 64x64 hi-res) monochrome framebuffer
///  * 16 key hex keypad
///  * the random number generator, so a snapshot replays the same numbers
///
/// [`Chip8Interpreter::cycle`] runs exactly one fetch/decode/execute step and
/// has no idea about wallclock time. Whoever drives it decides how many cycles
/// per second to run and calls [`Chip8Interpreter::update_timers`] at its own
/// (usually 60Hz) cadence.
use crate::error::Chip8Error;
use crate::framebuffer::Framebuffer;
use crate::instruction::Instruction;
use crate::memory::{
    Chip8MemoryMap, MemoryMap, CHIP8_FONT_ADDR, CHIP8_FONT_GLYPH_BYTES, CHIP8_PROGRAM_ADDR,
};
use crate::snapshot::Snapshot;
use crate::timers::Timers;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::io;
use tracing::{info, trace};

pub const CHIP8_STACK_DEPTH: usize = 16;
pub const CHIP8_KEY_COUNT: usize = 16;

/// fixed for the lifetime of a loaded program
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    /// 64x64 screen instead of 64x32
    pub hi_res: bool,
    /// SUPER-CHIP compatibility. Carried with the state; no instruction
    /// currently behaves differently under it.
    pub super_chip: bool,
}

/// The complete machine. Owns every array outright, so a clone is a deep copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chip8State {
    pub memory: Chip8MemoryMap,
    pub registers: [u8; 16],
    pub program_counter: u16,
    pub index_register: u16,
    pub stack: [u16; CHIP8_STACK_DEPTH],
    /// number of return addresses on the stack
    pub stack_pointer: u8,
    pub keypad: [bool; CHIP8_KEY_COUNT],
    pub timers: Timers,
    pub framebuffer: Framebuffer,
    pub mode: Mode,
    /// set whenever the framebuffer changes; cleared by whoever renders it
    pub draw_flag: bool,
    /// last fetched instruction word
    pub opcode: u16,
    pub random: ChaCha8Rng,
}

impl Chip8State {
    fn new(mode: Mode, random: ChaCha8Rng) -> Self {
        Chip8State {
            memory: Chip8MemoryMap::new(),
            registers: [0; 16],
            program_counter: CHIP8_PROGRAM_ADDR,
            index_register: 0,
            stack: [0; CHIP8_STACK_DEPTH],
            stack_pointer: 0,
            keypad: [false; CHIP8_KEY_COUNT],
            timers: Timers::default(),
            framebuffer: Framebuffer::new(mode.hi_res),
            mode,
            draw_flag: false,
            opcode: 0,
            random,
        }
    }

    /// value of register Vr
    fn v(&self, r: u8) -> u8 {
        self.registers[r as usize]
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = self.program_counter.wrapping_add(2) & 0x0fff;
        }
    }
}

/// What a successful cycle did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Executed,
    /// FX0A found no key held; the same instruction runs again next cycle
    AwaitingKey,
}

pub struct Chip8Interpreter {
    state: Chip8State,
}

impl Chip8Interpreter {
    /// fresh machine with an entropy-seeded random number generator
    pub fn new(mode: Mode) -> Self {
        Chip8Interpreter {
            state: Chip8State::new(mode, ChaCha8Rng::from_entropy()),
        }
    }

    /// fresh machine whose random numbers are reproducible
    pub fn with_seed(mode: Mode, seed: u64) -> Self {
        Chip8Interpreter {
            state: Chip8State::new(mode, ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// wipe everything, reload the font and reseed
    pub fn reset(&mut self, mode: Mode) {
        self.state = Chip8State::new(mode, ChaCha8Rng::from_entropy());
    }

    pub fn reset_with_seed(&mut self, mode: Mode, seed: u64) {
        self.state = Chip8State::new(mode, ChaCha8Rng::seed_from_u64(seed));
    }

    /// load a chip8 program at 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        self.state.memory.load_program(program)?;
        info!(bytes = program.len(), "program loaded");
        Ok(())
    }

    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let len = self.state.memory.load_program_from(reader)?;
        info!(bytes = len, "program loaded");
        Ok(())
    }

    pub fn state(&self) -> &Chip8State {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// latest keypad state, one flag per hex key
    pub fn set_keypad(&mut self, keys: [bool; CHIP8_KEY_COUNT]) {
        self.state.keypad = keys;
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.state.framebuffer
    }

    pub fn draw_flag(&self) -> bool {
        self.state.draw_flag
    }

    pub fn clear_draw_flag(&mut self) {
        self.state.draw_flag = false;
    }

    /// raise the draw flag without touching the screen, e.g. after a restore
    pub fn request_redraw(&mut self) {
        self.state.draw_flag = true;
    }

    /// a tone should be playing
    pub fn sound_active(&self) -> bool {
        self.state.timers.is_sounding()
    }

    /// count both timers down by one; call at 60Hz
    pub fn update_timers(&mut self) {
        self.state.timers.tick();
    }

    /// deep copy of the whole machine
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// replace the whole machine with a snapshot
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.state = snapshot.into_state();
    }

    /// one fetch/decode/execute step. On error nothing but the diagnostic
    /// opcode changes, and the program counter still points at the culprit.
    pub fn cycle(&mut self) -> Result<Step, Chip8Error> {
        let address = self.state.program_counter;
        let opcode = self.state.memory.get_word(address);
        self.state.opcode = opcode;
        // advance before executing so jumps and skips can overwrite/add to it
        self.state.program_counter = address.wrapping_add(2) & 0x0fff;

        let result = match Instruction::decode(opcode) {
            Some(instruction) => {
                trace!(pc = address, "{}", instruction);
                self.execute(instruction, address)
            }
            None => Err(Chip8Error::UnknownOpcode { opcode, address }),
        };
        if result.is_err() {
            self.state.program_counter = address;
        }
        result
    }

    fn execute(&mut self, instruction: Instruction, address: u16) -> Result<Step, Chip8Error> {
        use Instruction::*;

        let s = &mut self.state;

        match instruction {
            Sys(nnn) | Jump(nnn) => s.program_counter = nnn,
            ClearScreen => {
                s.framebuffer.clear();
                s.draw_flag = true;
            }
            Return => {
                if s.stack_pointer == 0 {
                    return Err(Chip8Error::StackUnderflow { address });
                }
                s.stack_pointer -= 1;
                s.program_counter = s.stack[s.stack_pointer as usize];
            }
            Call(nnn) => {
                if s.stack_pointer as usize >= CHIP8_STACK_DEPTH {
                    return Err(Chip8Error::StackOverflow { address });
                }
                s.stack[s.stack_pointer as usize] = s.program_counter;
                s.stack_pointer += 1;
                s.program_counter = nnn;
            }
            SkipEqImm(x, nn) => {
                let c = s.v(x) == nn;
                s.skip_if(c);
            }
            SkipNeImm(x, nn) => {
                let c = s.v(x) != nn;
                s.skip_if(c);
            }
            SkipEqReg(x, y) => {
                let c = s.v(x) == s.v(y);
                s.skip_if(c);
            }
            SkipNeReg(x, y) => {
                let c = s.v(x) != s.v(y);
                s.skip_if(c);
            }
            SetImm(x, nn) => s.registers[x as usize] = nn,
            AddImm(x, nn) => s.registers[x as usize] = s.v(x).wrapping_add(nn),
            SetReg(x, y) => s.registers[x as usize] = s.v(y),
            Or(x, y) => s.registers[x as usize] |= s.v(y),
            And(x, y) => s.registers[x as usize] &= s.v(y),
            Xor(x, y) => s.registers[x as usize] ^= s.v(y),
            AddCarry(x, y) => {
                let sum = s.v(x) as u16 + s.v(y) as u16;
                s.registers[x as usize] = sum as u8;
                s.registers[0xf] = (sum > 0xff) as u8;
            }
            // VF is "no borrow": set when the minuend is strictly bigger
            Sub(x, y) => {
                let (a, b) = (s.v(x), s.v(y));
                s.registers[x as usize] = a.wrapping_sub(b);
                s.registers[0xf] = (a > b) as u8;
            }
            SubReversed(x, y) => {
                let (a, b) = (s.v(x), s.v(y));
                s.registers[x as usize] = b.wrapping_sub(a);
                s.registers[0xf] = (b > a) as u8;
            }
            ShiftRight(x, _) => {
                let a = s.v(x);
                s.registers[x as usize] = a >> 1;
                s.registers[0xf] = a & 0x01;
            }
            ShiftLeft(x, _) => {
                let a = s.v(x);
                s.registers[x as usize] = a << 1;
                s.registers[0xf] = a >> 7;
            }
            SetIndex(nnn) => s.index_register = nnn,
            JumpV0(nnn) => s.program_counter = (nnn + s.v(0) as u16) & 0x0fff,
            Random(x, nn) => {
                let r: u8 = s.random.gen();
                s.registers[x as usize] = r & nn;
            }
            Draw(x, y, n) => {
                let mut rows = vec![0u8; n as usize];
                s.memory.read_into(s.index_register, &mut rows);
                let (px, py) = (s.v(x), s.v(y));
                let collision = s.framebuffer.draw_sprite(px, py, &rows);
                s.registers[0xf] = collision as u8;
                s.draw_flag = true;
            }
            SkipKeyPressed(x) => {
                let c = s.keypad[(s.v(x) & 0xf) as usize];
                s.skip_if(c);
            }
            SkipKeyNotPressed(x) => {
                let c = !s.keypad[(s.v(x) & 0xf) as usize];
                s.skip_if(c);
            }
            GetDelay(x) => s.registers[x as usize] = s.timers.delay,
            WaitKey(x) => match s.keypad.iter().position(|held| *held) {
                Some(key) => s.registers[x as usize] = key as u8,
                None => {
                    // spin on this instruction until something is held
                    s.program_counter = address;
                    return Ok(Step::AwaitingKey);
                }
            },
            SetDelay(x) => s.timers.delay = s.v(x),
            SetSound(x) => s.timers.sound = s.v(x),
            AddIndex(x) => s.index_register = s.index_register.wrapping_add(s.v(x) as u16),
            FontGlyph(x) => {
                s.index_register = CHIP8_FONT_ADDR + CHIP8_FONT_GLYPH_BYTES * (s.v(x) & 0xf) as u16
            }
            StoreBcd(x) => {
                let a = s.v(x);
                let i = s.index_register;
                s.memory.write_byte(i, a / 100);
                s.memory.write_byte(i.wrapping_add(1), (a / 10) % 10);
                s.memory.write_byte(i.wrapping_add(2), a % 10);
            }
            StoreRegisters(x) => {
                for r in 0..=x {
                    let i = s.index_register.wrapping_add(r as u16);
                    s.memory.write_byte(i, s.v(r));
                }
            }
            LoadRegisters(x) => {
                for r in 0..=x {
                    let i = s.index_register.wrapping_add(r as u16);
                    s.registers[r as usize] = s.memory.read_byte(i);
                }
            }
        }
        Ok(Step::Executed)
    }
}
