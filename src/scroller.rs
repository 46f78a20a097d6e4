/*
 *  scroller.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Horizontal text scroller with optional sine-wave bounce
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

use std::f64::consts::PI;

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use log::debug;

use crate::textlayout::FontMetrics;

/// Pixels per frame, leftwards.
pub const DEFAULT_VELOCITY: i32 = -2;
/// Glyphs starting left of this are off screen and not drawn.
const OFFSCREEN_LEFT: i32 = -10;

/// State of one scrolling pass. Lives for a single screen render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollState {
    pub text: String,
    /// x of the first glyph
    pub position: i32,
    pub start_position: i32,
    pub velocity: i32,
    pub amplitude: i32,
    /// measured once when the pass starts
    pub max_text_width: i32,
    pub baseline_y: i32,
    pub display_width: i32,
}

impl ScrollState {
    /// The text has left the panel on the left.
    pub fn is_complete(&self) -> bool {
        self.position < -self.max_text_width
    }

    fn restart(&mut self) {
        self.position = self.start_position;
    }
}

/// Where one character lands in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphPosition {
    pub ch: char,
    pub position: Point,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollFrame {
    pub glyphs: Vec<GlyphPosition>,
    pub completed: bool,
}

pub struct ScrollAnimator {
    state: ScrollState,
    // per-glyph advance, measured with the text width at start
    advances: Vec<i32>,
}

impl ScrollAnimator {
    /// Begin a pass with the text just off the right edge. The font is only
    /// needed to measure the text.
    pub fn start(text: &str, display_width: u32, baseline_y: i32, amplitude: i32, font: impl FontMetrics) -> Self {
        let max_text_width = font.text_width(text) as i32;
        let advances = text.chars().map(|c| font.char_width(c) as i32).collect();
        let display_width = display_width as i32;

        debug!("scroller start: '{}' {}px on {}px", text, max_text_width, display_width);

        Self {
            state: ScrollState {
                text: text.to_string(),
                position: display_width,
                start_position: display_width,
                velocity: DEFAULT_VELOCITY,
                amplitude: amplitude.max(0),
                max_text_width,
                baseline_y,
                display_width,
            },
            advances,
        }
    }

    /// Any speed is accepted; motion is always leftwards, at least 1px.
    pub fn with_velocity(mut self, velocity: i32) -> Self {
        self.state.velocity = -velocity.abs().max(1);
        self
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    /// Glyph placement at the current position, culled to the visible window.
    pub fn layout(&self) -> Vec<GlyphPosition> {
        let s = &self.state;
        let mut glyphs = Vec::new();
        let mut x = s.position;

        for (c, advance) in s.text.chars().zip(self.advances.iter().copied()) {
            if x > s.display_width {
                break;
            }
            if x < OFFSCREEN_LEFT {
                x += advance;
                continue;
            }
            glyphs.push(GlyphPosition { ch: c, position: Point::new(x, self.wave_y(x)) });
            x += advance;
        }
        glyphs
    }

    fn wave_y(&self, x: i32) -> i32 {
        let s = &self.state;
        if s.amplitude == 0 || s.display_width == 0 {
            return s.baseline_y;
        }
        let phase = 2.0 * PI * x as f64 / s.display_width as f64;
        s.baseline_y + (s.amplitude as f64 * phase.sin()).floor() as i32
    }

    /// Produce the frame at the current position, then move. When the text has
    /// scrolled off, restart while `time_remains`, otherwise report completion.
    pub fn step(&mut self, time_remains: bool) -> ScrollFrame {
        let glyphs = self.layout();
        self.state.position += self.state.velocity;

        let mut completed = false;
        if self.state.is_complete() {
            if time_remains {
                self.state.restart();
            } else {
                completed = true;
            }
        }
        ScrollFrame { glyphs, completed }
    }
}

/// Draw a frame's glyphs. The style's font should be the one the animator
/// measured with.
pub fn draw_glyphs<D>(
    glyphs: &[GlyphPosition],
    style: MonoTextStyle<'_, BinaryColor>,
    target: &mut D,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let mut buf = [0u8; 4];
    for g in glyphs {
        let s: &str = g.ch.encode_utf8(&mut buf);
        Text::with_baseline(s, g.position, style, Baseline::Top).draw(target)?;
    }
    Ok(())
}
