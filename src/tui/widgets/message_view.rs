//! Message view widget that draws the stacked message layouts.

use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::render::Region;
use crate::tui::app::App;
use crate::tui::theme::current_theme;

/// Render the message view panel.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = current_theme();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(" Messages ");

    let inner = block.inner(area);
    app.resize(inner.width as usize, inner.height as usize);
    frame.render_widget(block, area);

    if app.messages.is_empty() {
        let empty = Paragraph::new("No messages").style(theme.message_body);
        frame.render_widget(empty, inner);
        return;
    }

    let mut region = Region::new(frame.buffer_mut(), inner);
    app.messages.draw(&mut region, app.scroll);
}
