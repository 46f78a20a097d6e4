/*
 *  textlayout.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text measurement, fit, centering and word wrap
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{renderer::TextRenderer, Baseline},
};

/// What layout needs to know about a font.
pub trait FontMetrics {
    /// Rendered width of `text` in pixels.
    fn text_width(&self, text: &str) -> u32;

    /// Height of one line in pixels.
    fn line_height(&self) -> u32;

    fn char_width(&self, c: char) -> u32 {
        let mut buf = [0u8; 4];
        self.text_width(c.encode_utf8(&mut buf))
    }
}

impl FontMetrics for MonoFont<'_> {
    fn text_width(&self, text: &str) -> u32 {
        MonoTextStyle::new(self, BinaryColor::On)
            .measure_string(text, Point::zero(), Baseline::Top)
            .bounding_box
            .size
            .width
    }

    fn line_height(&self) -> u32 {
        self.character_size.height
    }
}

impl<T: FontMetrics + ?Sized> FontMetrics for &T {
    fn text_width(&self, text: &str) -> u32 {
        (**self).text_width(text)
    }

    fn line_height(&self) -> u32 {
        (**self).line_height()
    }

    fn char_width(&self, c: char) -> u32 {
        (**self).char_width(c)
    }
}

/// True iff `text` is no wider than `width`.
pub fn fits(text: &str, font: &impl FontMetrics, width: u32) -> bool {
    font.text_width(text) <= width
}

/// Top-left position that centers a single line in `width` x `height`.
/// Goes negative when the text is larger than the area.
pub fn center(text: &str, font: &impl FontMetrics, width: u32, height: u32) -> Point {
    let w = font.text_width(text) as i32;
    let h = font.line_height() as i32;
    Point::new((width as i32 - w) / 2, (height as i32 - h) / 2)
}

/// Horizontal offset that centers `text` on `center_x`.
pub fn center_on(text: &str, font: &impl FontMetrics, center_x: i32) -> i32 {
    center_x - font.text_width(text) as i32 / 2
}

/// Greedy word wrap. Whitespace runs collapse to one space and words are
/// never split, so a word longer than the limit gets a line of its own.
pub fn wrap(text: &str, max_chars_per_line: usize) -> Vec<String> {
    let limit = max_chars_per_line.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= limit {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// How many characters of `font` fit across `width`.
pub fn max_chars_per_line(font: &impl FontMetrics, width: u32) -> usize {
    let w = font.char_width('W').max(1);
    (width / w).max(1) as usize
}

/// Starting y for a block of lines centered vertically. Line heights are
/// taken from the available height while the remainder stays non-negative;
/// half of what is left is the offset. 0 when not even one line fits.
pub fn vertical_block_offset<S: AsRef<str>>(
    lines: &[S],
    font: &impl FontMetrics,
    display_height: u32,
) -> i32 {
    let line_height = font.line_height() as i32;
    let mut remaining = display_height as i32;
    let mut fitted = 0usize;

    for _ in lines {
        let next = remaining - line_height;
        if next < 0 {
            break;
        }
        remaining = next;
        fitted += 1;
    }

    if fitted == 0 {
        return 0;
    }
    remaining / 2
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};

    /// Fixed advance per character, for predictable layout tests.
    pub struct FixedMetrics {
        pub advance: u32,
        pub height: u32,
    }

    impl FontMetrics for FixedMetrics {
        fn text_width(&self, text: &str) -> u32 {
            text.chars().count() as u32 * self.advance
        }

        fn line_height(&self) -> u32 {
            self.height
        }
    }

    #[test]
    fn test_mono_font_metrics() {
        assert_eq!(FONT_6X10.text_width("abc"), 18);
        assert_eq!(FONT_6X10.line_height(), 10);
        assert_eq!(FONT_10X20.char_width('x'), 10);
    }

    #[test]
    fn test_fits() {
        // "Welcome to HOST" at 40px on a 128px panel
        let font = FixedMetrics { advance: 40, height: 16 };
        assert!(fits("W", &font, 128));
        let font = FixedMetrics { advance: 8, height: 16 };
        assert!(fits("Welcome to HOST", &font, 128));
        assert!(!fits("Welcome to HOSTNAME", &font, 128));
    }

    #[test]
    fn test_center() {
        let font = FixedMetrics { advance: 4, height: 10 };
        assert_eq!(center("abcdefghij", &font, 128, 32), Point::new(44, 11));
        // wider than the panel goes negative
        assert_eq!(center(&"x".repeat(40), &font, 128, 32).x, -16);
    }

    #[test]
    fn test_center_on() {
        let font = FixedMetrics { advance: 6, height: 8 };
        assert_eq!(center_on("abcd", &font, 64), 52);
    }

    #[test]
    fn test_wrap_greedy() {
        let lines = wrap("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_wrap_long_word_kept_whole() {
        let lines = wrap("a supercalifragilistic b", 6);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_wrap_round_trip() {
        let samples = [
            "  Hello   brave\tnew \n world ",
            "one",
            "",
            "Home Assistant is running on this host right now",
        ];
        for text in samples {
            for width in 1..20 {
                let joined = wrap(text, width).join(" ");
                let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
                assert_eq!(joined, normalized, "width {}", width);
            }
        }
    }

    #[test]
    fn test_max_chars_per_line() {
        let font = FixedMetrics { advance: 10, height: 20 };
        assert_eq!(max_chars_per_line(&font, 128), 12);
        let wide = FixedMetrics { advance: 200, height: 20 };
        assert_eq!(max_chars_per_line(&wide, 128), 1);
    }

    #[test]
    fn test_vertical_block_offset() {
        let font = FixedMetrics { advance: 8, height: 10 };
        // one line: 32 - 10 = 22, halved
        assert_eq!(vertical_block_offset(&["a"], &font, 32), 11);
        // three lines: 32 - 30 = 2, halved
        assert_eq!(vertical_block_offset(&["a", "b", "c"], &font, 32), 1);
        // a fourth line would go negative, so it stops at three
        assert_eq!(vertical_block_offset(&["a", "b", "c", "d"], &font, 32), 1);
    }

    #[test]
    fn test_vertical_block_offset_clamps_to_zero() {
        let tall = FixedMetrics { advance: 8, height: 40 };
        assert_eq!(vertical_block_offset(&["a"], &tall, 32), 0);
        let font = FixedMetrics { advance: 8, height: 10 };
        let none: [&str; 0] = [];
        assert_eq!(vertical_block_offset(&none, &font, 32), 0);
    }
}
