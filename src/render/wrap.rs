//! Word wrapping for plain-text message bodies.

use textwrap::{Options, WordSeparator, WrapAlgorithm};

/// Wrap `text` into lines of at most `width` terminal columns.
///
/// Breaks at spaces, splitting words longer than a line. Whitespace inside
/// a line is kept as written and explicit newlines are preserved. A `width`
/// of zero yields no lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    let options = Options::new(width)
        .wrap_algorithm(WrapAlgorithm::FirstFit)
        .word_separator(WordSeparator::AsciiSpace);
    textwrap::wrap(text, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}
