/*
 *  screens/statictext.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  User text screen and the farewell message
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

use embedded_graphics::mono_font::{
    ascii::{FONT_10X20, FONT_7X13},
    MonoFont,
};

use super::{draw_block, draw_text, ScreenDeck};
use crate::error::ScreenError;
use crate::exit::Farewell;
use crate::registry::{ScreenDescriptor, ScreenKind};
use crate::textlayout::{center, fits, max_chars_per_line, wrap};

const LARGE: &MonoFont<'static> = &FONT_10X20;
// wrapped blocks drop a size so two lines fit a 32 pixel panel
const BLOCK: &MonoFont<'static> = &FONT_7X13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Centered,
    Wrapped,
    Scrolled,
}

fn choose_layout(fits: bool, noscroll: bool) -> Layout {
    match (fits, noscroll) {
        (true, _) => Layout::Centered,
        (false, true) => Layout::Wrapped,
        (false, false) => Layout::Scrolled,
    }
}

/// Draw `text` without motion: centered when it fits, else as a wrapped block.
fn draw_still(deck: &mut ScreenDeck, text: &str, layout: Layout) {
    let (w, h) = (deck.display.width(), deck.display.height());
    let canvas = deck.display.canvas();
    match layout {
        Layout::Centered => draw_text(canvas, text, center(text, LARGE, w, h), LARGE),
        _ => {
            let lines = wrap(text, max_chars_per_line(BLOCK, w));
            draw_block(canvas, &lines, BLOCK);
        }
    }
}

pub(super) fn render(deck: &mut ScreenDeck, screen: &ScreenDescriptor) -> Result<(), ScreenError> {
    let kind = ScreenKind::Static;
    let text = match &deck.settings.static_text {
        Some(t) => t.clone(),
        None => format!("Welcome to {}", deck.host_hostname(kind)?),
    };

    let shot = screenshot_name(&text);
    let layout = choose_layout(fits(&text, LARGE, deck.display.width()), deck.settings.static_noscroll);
    if layout == Layout::Scrolled {
        deck.play_scroll(kind, &shot, &text, LARGE, screen.duration())?;
        return Ok(());
    }

    draw_still(deck, &text, layout);
    deck.present_named(kind, &shot, screen.duration())
}

/// Lower-case ASCII letters and digits; every other run becomes one '-'.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// `static_<slug>`, or plain `static` when nothing survives the slug.
fn screenshot_name(text: &str) -> String {
    match slugify(text) {
        s if s.is_empty() => "static".to_string(),
        s => format!("static_{}", s),
    }
}

/// Shown once on the way out. Never scrolls and never holds.
pub(super) fn render_farewell(deck: &mut ScreenDeck, farewell: &Farewell) -> Result<(), ScreenError> {
    let kind = farewell.descriptor.kind;
    let layout = choose_layout(fits(&farewell.message, LARGE, deck.display.width()), true);

    draw_still(deck, &farewell.message, layout);
    deck.display.show().map_err(|e| ScreenError::render(kind, e))?;
    deck.screenshot(kind, "farewell");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::screens::tests::{deck_with, quick};
    use crate::screens::ScreenRenderer;
    use embedded_graphics::pixelcolor::BinaryColor;

    #[test]
    fn test_choose_layout() {
        assert_eq!(choose_layout(true, false), Layout::Centered);
        assert_eq!(choose_layout(true, true), Layout::Centered);
        assert_eq!(choose_layout(false, true), Layout::Wrapped);
        assert_eq!(choose_layout(false, false), Layout::Scrolled);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Backups run  nightly "), "backups-run-nightly");
        assert_eq!(slugify("v2.0 -- OK"), "v2-0-ok");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_screenshot_name() {
        assert_eq!(screenshot_name("Hello there"), "static_hello-there");
        assert_eq!(screenshot_name("!!"), "static");
    }

    #[test]
    fn test_screenshot_named_after_text() {
        let dir = tempfile::tempdir().unwrap();
        let shots = dir.path().join("shots");
        let mut settings = Settings { static_text: Some("Hi There".into()), ..Settings::default() };
        settings.display.screenshot_dir = Some(shots.clone());
        let (mut deck, _state, _gate) = deck_with(settings, Some("h"), dir.path());

        deck.render(&quick(ScreenKind::Static)).unwrap();
        assert!(shots.join("static_hi-there.png").exists());
        assert!(!shots.join("static.png").exists());
    }

    #[test]
    fn test_fitting_text_renders_once() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings { static_text: Some("Hello".into()), ..Settings::default() };
        let (mut deck, state, _gate) = deck_with(settings, Some("h"), dir.path());
        deck.render(&quick(ScreenKind::Static)).unwrap();
        assert_eq!(state.lock().unwrap().present_count, 1);
    }

    #[test]
    fn test_noscroll_wraps_into_one_frame() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            static_text: Some("Backups run nightly at two".into()),
            static_noscroll: true,
            ..Settings::default()
        };
        let (mut deck, state, _gate) = deck_with(settings, Some("h"), dir.path());
        deck.render(&quick(ScreenKind::Static)).unwrap();

        assert_eq!(state.lock().unwrap().present_count, 1);
        // 18 chars per line at 7px: two 13px lines, block starts at row 3
        let frame = deck.display().frame();
        let first_lit_row = (0..frame.height())
            .find(|&y| (0..frame.width()).any(|x| frame.pixel(x, y) == Some(BinaryColor::On)))
            .unwrap();
        assert!(first_lit_row >= 3);
    }

    #[test]
    fn test_long_text_scrolls() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            static_text: Some("Backups run nightly at two".into()),
            ..Settings::default()
        };
        let (mut deck, state, _gate) = deck_with(settings, Some("h"), dir.path());
        deck.pacer.set_fps(1000);
        deck.render(&quick(ScreenKind::Static)).unwrap();
        assert!(state.lock().unwrap().present_count > 1);
    }

    #[test]
    fn test_farewell_renders_once_without_hold() {
        let dir = tempfile::tempdir().unwrap();
        let (mut deck, state, gate) = deck_with(Settings::default(), Some("h"), dir.path());
        gate.request_exit();

        let farewell = Farewell::new("Goodbye");
        deck.render_farewell(&farewell).unwrap();

        let state = state.lock().unwrap();
        assert_eq!(state.present_count, 1);
        assert!(state.last_frame.as_ref().unwrap().lit() > 0);
    }

    #[test]
    fn test_long_farewell_is_wrapped_not_scrolled() {
        let dir = tempfile::tempdir().unwrap();
        let (mut deck, state, _gate) = deck_with(Settings::default(), Some("h"), dir.path());
        deck.render_farewell(&Farewell::new("See you again after the update")).unwrap();
        assert_eq!(state.lock().unwrap().present_count, 1);
    }
}
