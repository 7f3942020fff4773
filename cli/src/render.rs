use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, PrintStyledContent, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use termsweeper_core::{CellView, Coord, RoundSummary, Snapshot};

const NUMBER_GLYPHS: [&str; 9] = ["  ", "1 ", "2 ", "3 ", "4 ", "5 ", "6 ", "7 ", "8 "];
const LABEL_COLOR: Color = Color::Grey;
const CURSOR_LABEL_COLOR: Color = Color::DarkCyan;
const CURSOR_BACKGROUND: Color = Color::DarkGrey;
const CHEAT_WARNING: &str =
    "⚠️ Warning: Cheat mode was activated at least once while playing this round! ⚠️";
/// Header line plus the blank line below it.
const GRID_TOP: u16 = 2;

/// Text and colour of a cell, two columns wide.
pub fn cell_glyph(view: CellView) -> (&'static str, Color) {
    match view {
        CellView::Covered => ("■ ", Color::White),
        CellView::Flagged => ("⚑ ", Color::DarkRed),
        CellView::Mine => ("💣", Color::White),
        CellView::Uncovered(count) => {
            let color = match count {
                1 => Color::Blue,
                2 => Color::Green,
                3 => Color::Red,
                4 => Color::DarkBlue,
                5 => Color::DarkYellow,
                6 => Color::DarkCyan,
                7 => Color::Magenta,
                8 => Color::Yellow,
                _ => Color::White,
            };
            let glyph = NUMBER_GLYPHS
                .get(usize::from(count))
                .copied()
                .unwrap_or("? ");
            (glyph, color)
        }
    }
}

/// Column header: `A`..`Z`, then the alphabet again with a `'` mark.
pub fn column_label(x: Coord) -> String {
    let letter = char::from(b'A' + x % 26);
    let mark = if x < 26 { ' ' } else { '\'' };
    format!("{letter}{mark}")
}

/// Row header: `1`..`9` repeating, later loops marked with `'`, `"` and `"'`.
///
/// Padded to four columns.
pub fn row_label(y: Coord) -> String {
    let number = y % 9 + 1;
    let mark = match y / 9 {
        0 => "",
        1 => "'",
        2 => "\"",
        _ => "\"'",
    };
    format!("{number}{mark:<3}")
}

pub fn summary_line(summary: &RoundSummary) -> String {
    format!(
        "! ({} cells uncovered, {} flags placed, {} out of {} mines were flagged)",
        summary.manually_uncovered, summary.flags_placed, summary.flagged_mines, summary.total_mines
    )
}

/// How many more confirmations the play-again prompt asks for, `✓` once done.
pub fn confirm_label(presses_left: u8) -> String {
    if presses_left == 0 {
        "✓×ENTER".to_string()
    } else {
        format!("{presses_left}×ENTER")
    }
}

/// Draws engine snapshots, clearing the screen whenever the terminal changed size.
pub struct Renderer<W: Write> {
    out: W,
    terminal_size: Option<(u16, u16)>,
    summary_row: u16,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            terminal_size: None,
            summary_row: GRID_TOP,
        }
    }

    /// Forces a full clear before the next frame.
    pub fn invalidate(&mut self) {
        self.terminal_size = None;
    }

    fn clear_if_resized(&mut self) -> io::Result<()> {
        let size = terminal::size().ok();
        if self.terminal_size.is_none() || size != self.terminal_size {
            log::trace!("Terminal size changed to {:?}, clearing", size);
            queue!(self.out, Clear(ClearType::All))?;
            self.terminal_size = size;
        }
        Ok(())
    }

    pub fn draw(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        self.clear_if_resized()?;
        let (width, height) = snapshot.size;
        let cursor_x = snapshot.cursor.map(|(x, _)| x);
        let cursor_y = snapshot.cursor.map(|(_, y)| y);

        queue!(self.out, MoveTo(0, 0), Print("    "))?;
        for x in 0..width {
            let color = label_color(cursor_x == Some(x));
            queue!(self.out, PrintStyledContent(column_label(x).with(color)))?;
        }
        queue!(self.out, Print("\r\n\r\n"))?;

        for y in 0..height {
            let color = label_color(cursor_y == Some(y));
            queue!(self.out, PrintStyledContent(row_label(y).with(color)))?;
            for x in 0..width {
                let (glyph, color) = cell_glyph(snapshot.cell_at((x, y)));
                let mut styled = glyph.with(color);
                if snapshot.cursor == Some((x, y)) {
                    styled = styled.on(CURSOR_BACKGROUND);
                }
                queue!(self.out, PrintStyledContent(styled))?;
            }
            queue!(self.out, Clear(ClearType::UntilNewLine), Print("\r\n"))?;
        }

        self.summary_row = GRID_TOP + u16::from(height) + 1;
        self.out.flush()
    }

    /// Prints the round result below the grid along with the play-again prompt.
    pub fn draw_summary(&mut self, summary: &RoundSummary, presses_left: u8) -> io::Result<()> {
        queue!(
            self.out,
            MoveTo(0, self.summary_row),
            Clear(ClearType::FromCursorDown),
            PrintStyledContent("You ".with(Color::White))
        )?;
        if summary.won {
            queue!(self.out, PrintStyledContent("WIN".with(Color::Green)))?;
        } else {
            queue!(self.out, PrintStyledContent("LOSE".with(Color::Red)))?;
        }
        queue!(
            self.out,
            PrintStyledContent(summary_line(summary).with(Color::White)),
            Print("\r\n")
        )?;
        if summary.cheated {
            queue!(
                self.out,
                PrintStyledContent(CHEAT_WARNING.with(Color::DarkYellow)),
                Print("\r\n")
            )?;
        }

        queue!(
            self.out,
            Print("\r\nPress "),
            PrintStyledContent(confirm_label(presses_left).with(Color::Blue)),
            Print("/"),
            PrintStyledContent("SPACE ".with(Color::Blue)),
            Print("to "),
            PrintStyledContent("Play ".with(Color::Blue)),
            Print("again.\r\nPress "),
            PrintStyledContent("X ".with(Color::Magenta)),
            Print("to "),
            PrintStyledContent("Exit".with(Color::Magenta)),
            Print(".\r\n")
        )?;
        self.out.flush()
    }
}

fn label_color(on_cursor: bool) -> Color {
    if on_cursor {
        CURSOR_LABEL_COLOR
    } else {
        LABEL_COLOR
    }
}
