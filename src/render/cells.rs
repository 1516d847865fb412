//! Styled terminal cells and the screen abstraction they are drawn onto.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Upper half block. Foreground paints the top pixel, background the bottom.
pub const UPPER_HALF: &str = "\u{2580}";

/// Lower half block, used when only the bottom pixel is opaque.
pub const LOWER_HALF: &str = "\u{2584}";

/// One terminal cell: a glyph with its foreground and background colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledCell {
    pub symbol: String,
    pub fg: Color,
    pub bg: Color,
}

impl StyledCell {
    pub fn new(symbol: impl Into<String>, fg: Color, bg: Color) -> Self {
        Self {
            symbol: symbol.into(),
            fg,
            bg,
        }
    }

    /// Columns this cell occupies on screen (wide glyphs take two).
    pub fn width(&self) -> usize {
        self.symbol.width()
    }
}

/// An ordered row of cells, drawn left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledRow {
    pub cells: Vec<StyledCell>,
}

impl StyledRow {
    pub fn new(cells: Vec<StyledCell>) -> Self {
        Self { cells }
    }

    /// Build a row from text, one cell per character, all in the same colours.
    ///
    /// Characters are dropped once `max_width` columns are used.
    pub fn from_text(text: &str, fg: Color, bg: Color, max_width: usize) -> Self {
        let mut cells = Vec::new();
        let mut used = 0;
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            let symbol: &str = ch.encode_utf8(&mut buf);
            let w = symbol.width();
            if w == 0 {
                continue;
            }
            if used + w > max_width {
                break;
            }
            used += w;
            cells.push(StyledCell::new(symbol, fg, bg));
        }
        Self { cells }
    }

    /// Visible width in terminal columns.
    pub fn width(&self) -> usize {
        self.cells.iter().map(StyledCell::width).sum()
    }

    /// The row's glyphs concatenated, ignoring colour.
    pub fn text(&self) -> String {
        self.cells.iter().map(|c| c.symbol.as_str()).collect()
    }

    /// Write the row onto a screen starting at `(x, y)`.
    pub fn draw(&self, screen: &mut dyn Screen, x: u16, y: u16) {
        let mut col = x;
        for cell in &self.cells {
            screen.set_cell(col, y, &cell.symbol, cell.fg, cell.bg);
            col = col.saturating_add(cell.width() as u16);
        }
    }
}

impl From<&StyledRow> for Line<'static> {
    fn from(row: &StyledRow) -> Self {
        row.cells
            .iter()
            .map(|c| Span::styled(c.symbol.clone(), Style::default().fg(c.fg).bg(c.bg)))
            .collect::<Vec<_>>()
            .into()
    }
}

/// Anything cells can be written to.
pub trait Screen {
    /// Set the cell at `(x, y)`. Writes outside the screen are ignored.
    fn set_cell(&mut self, x: u16, y: u16, symbol: &str, fg: Color, bg: Color);
}

impl Screen for Buffer {
    fn set_cell(&mut self, x: u16, y: u16, symbol: &str, fg: Color, bg: Color) {
        if let Some(cell) = self.cell_mut((x, y)) {
            cell.set_symbol(symbol).set_fg(fg).set_bg(bg);
        }
    }
}

/// A rectangular window into a [`Buffer`] with its own origin.
///
/// Coordinates are relative to `area`; writes that fall outside it are dropped.
pub struct Region<'a> {
    buf: &'a mut Buffer,
    area: Rect,
}

impl<'a> Region<'a> {
    pub fn new(buf: &'a mut Buffer, area: Rect) -> Self {
        let area = area.intersection(buf.area);
        Self { buf, area }
    }
}

impl Screen for Region<'_> {
    fn set_cell(&mut self, x: u16, y: u16, symbol: &str, fg: Color, bg: Color) {
        if x >= self.area.width || y >= self.area.height {
            return;
        }
        Screen::set_cell(self.buf, self.area.x + x, self.area.y + y, symbol, fg, bg);
    }
}
