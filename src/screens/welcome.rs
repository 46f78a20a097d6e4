/*
 *  screens/welcome.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Welcome banner, scrolled when it does not fit
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

use embedded_graphics::mono_font::ascii::FONT_10X20;

use super::{draw_text, ScreenDeck};
use crate::error::ScreenError;
use crate::registry::{ScreenDescriptor, ScreenKind};
use crate::textlayout::{center, fits};

pub(super) fn render(deck: &mut ScreenDeck, screen: &ScreenDescriptor) -> Result<(), ScreenError> {
    let kind = ScreenKind::Welcome;
    let text = match &deck.settings.welcome_text {
        Some(t) => t.clone(),
        None => format!("Welcome to {}", deck.host_hostname(kind)?),
    };

    let font = &FONT_10X20;
    let (w, h) = (deck.display.width(), deck.display.height());

    if fits(&text, font, w) {
        let at = center(&text, font, w, h);
        draw_text(deck.display.canvas(), &text, at, font);
        return deck.present_and_hold(kind, screen.duration());
    }

    deck.play_scroll(kind, kind.as_str(), &text, font, screen.duration())?;
    Ok(())
}
