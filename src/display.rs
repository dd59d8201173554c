use crate::framebuffer::Framebuffer;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;

/// Display renders the interpreter's framebuffer. It should abstract the
/// implementation details, so a variety of kinds of screen would work.
pub trait Display {
    /// draw a frame, plus a line of status text underneath
    fn draw(&mut self, frame: &Framebuffer, status: &str) -> Result<(), io::Error>;
}

// canvas coordinates for a framebuffer; y grows downwards on the chip-8 and
// upwards on the canvas
struct Resolution(usize, usize);

impl Resolution {
    fn of(frame: &Framebuffer) -> Self {
        Resolution(frame.width(), frame.height())
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// Where the screen and its status line go in a terminal of size `area`.
    /// Both are clipped to the terminal; the status line is dropped when it
    /// doesn't fit at all.
    fn layout(&self, area: Rect) -> (Rect, Option<Rect>) {
        let screen = Rect::new(0, 0, 2 + self.0 as u16, 2 + self.1 as u16);
        let status_line = Rect::new(0, screen.height, screen.width, 1);
        let status_line = if status_line.intersects(area) {
            Some(status_line.intersection(area))
        } else {
            None
        };
        (screen.intersection(area), status_line)
    }

    fn lit_points(frame: &Framebuffer) -> Vec<(f64, f64)> {
        frame
            .lit_pixels()
            .map(|(x, y)| (x as f64, -1.0 * y as f64))
            .collect()
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay { terminal })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &Framebuffer, status: &str) -> Result<(), io::Error> {
        let resolution = Resolution::of(frame);
        let points = Resolution::lit_points(frame);

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let (screen, status_line) = resolution.layout(f.size());

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &points,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, screen);
            if let Some(status_line) = status_line {
                f.render_widget(Paragraph::new(status), status_line);
            }
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; counts frames
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: usize,
    pub last_status: String,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _frame: &Framebuffer, status: &str) -> Result<(), io::Error> {
        self.frames += 1;
        self.last_status = status.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_bounds() {
        let r = Resolution::of(&Framebuffer::new(false));
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        assert_eq!(Resolution::of(&Framebuffer::new(false)).y_bounds(), [-31.0, 0.0]);
        assert_eq!(Resolution::of(&Framebuffer::new(true)).y_bounds(), [-63.0, 0.0]);
    }

    #[test]
    fn test_points_flip_y() {
        let mut fb = Framebuffer::new(false);
        fb.draw_sprite(2, 3, &[0x80]);
        assert_eq!(Resolution::lit_points(&fb), vec![(2.0, -3.0)]);
    }

    #[test]
    fn test_layout_fits_roomy_terminal() {
        let r = Resolution::of(&Framebuffer::new(false));
        let (screen, status) = r.layout(Rect::new(0, 0, 100, 50));
        assert_eq!(screen, Rect::new(0, 0, 66, 34));
        assert_eq!(status, Some(Rect::new(0, 34, 66, 1)));
    }

    #[test]
    fn test_layout_clipped_to_small_terminal() {
        let r = Resolution::of(&Framebuffer::new(true));
        let (screen, status) = r.layout(Rect::new(0, 0, 80, 40));
        assert_eq!(screen, Rect::new(0, 0, 66, 40));
        assert_eq!(status, None);

        let (screen, status) = r.layout(Rect::new(0, 0, 40, 20));
        assert_eq!(screen, Rect::new(0, 0, 40, 20));
        assert_eq!(status, None);
    }

    #[test]
    fn test_layout_status_line_just_fits() {
        let r = Resolution::of(&Framebuffer::new(false));
        let (_, status) = r.layout(Rect::new(0, 0, 50, 35));
        assert_eq!(status, Some(Rect::new(0, 34, 50, 1)));
    }

    #[test]
    fn test_dummy_counts_frames() {
        let mut d = DummyDisplay::new();
        d.draw(&Framebuffer::new(false), "slot 0").unwrap();
        assert_eq!(d.frames, 1);
        assert_eq!(d.last_status, "slot 0");
    }
}
