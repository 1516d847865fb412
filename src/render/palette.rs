//! Pixel → terminal colour quantisation.
//!
//! Maps an RGBA pixel onto whatever palette the terminal supports. Every
//! function here is pure; the same input always yields the same colour.
//!
//! Mono output is an explicit white/black pair ([`Color::White`] and
//! [`Color::Black`]), not the terminal's own default colours. Only
//! transparency maps to [`Color::Reset`]. Written as escapes these are
//! palette entries 15 and 0, so a light-on-dark image keeps its contrast
//! whatever the terminal theme.

use std::sync::OnceLock;

use image::Rgba;
use ratatui::style::Color;

/// Pixels with alpha below this are treated as transparent.
const ALPHA_THRESHOLD: u8 = 128;

/// Chroma (max − min channel) below which a pixel counts as near-grey.
const GREY_CHROMA_LIMIT: u8 = 8;

/// Distance multiplier applied to grey-ramp candidates for near-grey pixels.
const GREY_BIAS: f32 = 0.75;

/// Channel levels of the xterm 6×6×6 colour cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// The xterm defaults for the 16 base ANSI colours, in index order.
const ANSI16: [(Color, [u8; 3]); 16] = [
    (Color::Black, [0, 0, 0]),
    (Color::Red, [205, 0, 0]),
    (Color::Green, [0, 205, 0]),
    (Color::Yellow, [205, 205, 0]),
    (Color::Blue, [0, 0, 238]),
    (Color::Magenta, [205, 0, 205]),
    (Color::Cyan, [0, 205, 205]),
    (Color::Gray, [229, 229, 229]),
    (Color::DarkGray, [127, 127, 127]),
    (Color::LightRed, [255, 0, 0]),
    (Color::LightGreen, [0, 255, 0]),
    (Color::LightYellow, [255, 255, 0]),
    (Color::LightBlue, [92, 92, 255]),
    (Color::LightMagenta, [255, 0, 255]),
    (Color::LightCyan, [0, 255, 255]),
    (Color::White, [255, 255, 255]),
];

/// Colour capability of the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorDepth {
    /// Two colours: palette white and palette black.
    Mono,
    /// The 16 base ANSI colours.
    Ansi16,
    /// The xterm 256-colour palette.
    Ansi256,
    /// 24-bit RGB.
    #[default]
    TrueColor,
}

impl ColorDepth {
    /// Parse a depth name as used in the config file and on the command line.
    ///
    /// Returns `None` for `"auto"` and unrecognized names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mono" | "monochrome" | "2" => Some(Self::Mono),
            "16" | "ansi16" | "ansi" => Some(Self::Ansi16),
            "256" | "ansi256" | "xterm256" => Some(Self::Ansi256),
            "truecolor" | "truecolour" | "24bit" | "rgb" => Some(Self::TrueColor),
            _ => None,
        }
    }

    /// Short name, the inverse of [`ColorDepth::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Mono => "mono",
            Self::Ansi16 => "16",
            Self::Ansi256 => "256",
            Self::TrueColor => "truecolor",
        }
    }

    /// The next depth in the cycle mono → 16 → 256 → truecolor → mono.
    pub fn next(self) -> Self {
        match self {
            Self::Mono => Self::Ansi16,
            Self::Ansi16 => Self::Ansi256,
            Self::Ansi256 => Self::TrueColor,
            Self::TrueColor => Self::Mono,
        }
    }

    /// Guess the terminal's depth from `COLORTERM` and `TERM`.
    pub fn detect() -> Self {
        let colorterm = std::env::var("COLORTERM").unwrap_or_default();
        let term = std::env::var("TERM").unwrap_or_default();
        Self::from_env_values(&colorterm, &term)
    }

    fn from_env_values(colorterm: &str, term: &str) -> Self {
        let colorterm = colorterm.to_ascii_lowercase();
        if colorterm.contains("truecolor") || colorterm.contains("24bit") {
            return Self::TrueColor;
        }
        let term = term.to_ascii_lowercase();
        if term.contains("256color") {
            Self::Ansi256
        } else if term.is_empty() || term == "dumb" {
            Self::Mono
        } else {
            Self::Ansi16
        }
    }
}

/// `true` if the pixel should show the terminal's default background.
pub fn is_transparent(pixel: Rgba<u8>) -> bool {
    pixel.0[3] < ALPHA_THRESHOLD
}

/// Map a pixel to the nearest colour available at `depth`.
///
/// Transparent pixels map to [`Color::Reset`], the terminal default.
pub fn quantise(pixel: Rgba<u8>, depth: ColorDepth) -> Color {
    if is_transparent(pixel) {
        return Color::Reset;
    }
    let [r, g, b, _] = pixel.0;
    match depth {
        ColorDepth::TrueColor => Color::Rgb(r, g, b),
        ColorDepth::Ansi256 => Color::Indexed(nearest_256([r, g, b])),
        ColorDepth::Ansi16 => nearest_16([r, g, b]),
        ColorDepth::Mono => {
            if luminance([r, g, b]) >= 0.5 {
                Color::White
            } else {
                Color::Black
            }
        }
    }
}

/// Rec. 601 luma in `[0, 1]`.
pub fn luminance([r, g, b]: [u8; 3]) -> f32 {
    (0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)) / 255.0
}

fn nearest_256(rgb: [u8; 3]) -> u8 {
    let target = to_linear(rgb);

    // Squared distance is separable, so the nearest cube entry is the
    // nearest level per channel.
    let mut cube_idx = [0u8; 3];
    for (slot, channel) in cube_idx.iter_mut().zip(target) {
        *slot = nearest_level(channel);
    }
    let cube_rgb = cube_idx.map(|i| CUBE_LEVELS[usize::from(i)]);
    let cube_dist = distance(target, to_linear(cube_rgb));
    let cube_code = 16 + 36 * cube_idx[0] + 6 * cube_idx[1] + cube_idx[2];

    let (grey_step, mut grey_dist) = (0u8..24)
        .map(|step| {
            let level = 8 + 10 * step;
            (step, distance(target, to_linear([level, level, level])))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap_or((0, f32::MAX));

    let chroma = rgb.iter().max().copied().unwrap_or(0) - rgb.iter().min().copied().unwrap_or(0);
    if chroma < GREY_CHROMA_LIMIT {
        grey_dist *= GREY_BIAS;
    }

    if grey_dist < cube_dist {
        232 + grey_step
    } else {
        cube_code
    }
}

fn nearest_level(channel: f32) -> u8 {
    let mut best = 0u8;
    let mut best_dist = f32::MAX;
    for (i, level) in CUBE_LEVELS.iter().enumerate() {
        let d = (linear_table()[usize::from(*level)] - channel).abs();
        if d < best_dist {
            best_dist = d;
            best = i as u8;
        }
    }
    best
}

fn nearest_16(rgb: [u8; 3]) -> Color {
    let target = to_linear(rgb);
    ANSI16
        .iter()
        .map(|(color, entry)| (*color, distance(target, to_linear(*entry))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(color, _)| color)
        .unwrap_or(Color::Reset)
}

fn distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn to_linear(rgb: [u8; 3]) -> [f32; 3] {
    let table = linear_table();
    rgb.map(|c| table[usize::from(c)])
}

/// sRGB → linear lookup for every 8-bit channel value.
fn linear_table() -> &'static [f32; 256] {
    static TABLE: OnceLock<[f32; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0.0f32; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            let c = i as f32 / 255.0;
            *slot = if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            };
        }
        table
    })
}
