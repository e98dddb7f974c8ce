//! Label box sizing for info nodes.

use crate::{
    InfoConfig,
    graph::{Dimensions, StateData},
};

/// Number of lines `text` takes when greedily wrapped at `max_chars`.
///
/// Lines break between words. A word longer than `max_chars` gets a line of
/// its own instead of being split.
pub fn wrapped_line_count(
    text: &str,
    max_chars: usize,
) -> usize {
    let mut lines = 0;
    let mut current = 0;

    for word in text.split_whitespace() {
        let len = word.chars().count();

        if len > max_chars {
            lines += 1;
            current = 0;
        } else if current == 0 {
            lines += 1;
            current = len;
        } else if current + 1 + len <= max_chars {
            current += 1 + len;
        } else {
            lines += 1;
            current = len;
        }
    }

    lines
}

/// Box size for an info node showing every text value of `state`.
pub fn estimate_info_dimensions(
    state: &StateData,
    config: &InfoConfig,
) -> Dimensions {
    let lines: usize = state.text_values().iter().map(|text| wrapped_line_count(text, config.line_chars)).sum();
    let height = (lines as f64 * config.line_height + config.padding).max(config.min_height);

    Dimensions::new(config.width, height)
}
