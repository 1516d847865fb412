//! Writing laid-out rows to a plain ANSI terminal stream.
//!
//! Used outside the TUI, where there is no ratatui buffer to draw into.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{
    Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor,
};
use ratatui::style::Color;

use super::StyledRow;

/// Map a ratatui colour to the crossterm colour with the same escape code.
pub fn to_crossterm(color: Color) -> TermColor {
    match color {
        Color::Reset => TermColor::Reset,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::LightRed => TermColor::Red,
        Color::LightGreen => TermColor::Green,
        Color::LightYellow => TermColor::Yellow,
        Color::LightBlue => TermColor::Blue,
        Color::LightMagenta => TermColor::Magenta,
        Color::LightCyan => TermColor::Cyan,
        Color::White => TermColor::White,
        Color::Indexed(i) => TermColor::AnsiValue(i),
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
    }
}

/// Write `rows` to `out`, one line each, resetting colours at every line end.
///
/// Colour escapes are only emitted when a cell's colours differ from the
/// previous cell's.
pub fn write_rows<W: Write>(out: &mut W, rows: &[StyledRow]) -> io::Result<()> {
    for row in rows {
        let mut current: Option<(Color, Color)> = None;
        for cell in &row.cells {
            if current != Some((cell.fg, cell.bg)) {
                queue!(
                    out,
                    SetForegroundColor(to_crossterm(cell.fg)),
                    SetBackgroundColor(to_crossterm(cell.bg))
                )?;
                current = Some((cell.fg, cell.bg));
            }
            queue!(out, Print(&cell.symbol))?;
        }
        queue!(out, ResetColor, Print("\n"))?;
    }
    out.flush()
}
