//! Turning message content into styled terminal cells.
//!
//! Images go through [`decode`] → [`halfblock`] (which uses [`palette`]);
//! text goes through [`wrap`]. Both end up as [`cells::StyledRow`]s, which
//! are drawn onto a [`Screen`] or written out by [`ansi`].

pub mod ansi;
pub mod cells;
pub mod decode;
pub mod halfblock;
pub mod palette;
pub mod wrap;

pub use cells::{Region, Screen, StyledCell, StyledRow};
pub use palette::ColorDepth;

/// Rendering options that change how messages are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderPreferences {
    /// Compact view without inline media.
    pub bare_mode: bool,
    /// Never show inline image previews.
    pub disable_images: bool,
    pub color_depth: ColorDepth,
}

impl RenderPreferences {
    /// `true` if image attachments may be rendered inline.
    pub fn allows_images(&self) -> bool {
        !self.bare_mode && !self.disable_images
    }
}
