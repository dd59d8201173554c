use serde::{Deserialize, Serialize};

/// The two CHIP-8 countdown timers. They tick at 60Hz on the original hardware,
/// independently of how fast instructions run, so the caller decides when to
/// call `tick`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timers {
    pub delay: u8,
    /// a tone should be audible while this is non-zero
    pub sound: u8,
}

impl Timers {
    /// count both timers down by one, stopping at zero
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub fn is_sounding(&self) -> bool {
        self.sound > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counts_down_independently() {
        let mut t = Timers { delay: 2, sound: 1 };
        t.tick();
        assert_eq!(t, Timers { delay: 1, sound: 0 });
        assert!(!t.is_sounding());
        t.tick();
        t.tick();
        assert_eq!(t, Timers { delay: 0, sound: 0 });
    }
}
