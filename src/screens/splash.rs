/*
 *  screens/splash.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Home Assistant splash: OS and core versions
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
    mono_font::ascii::{FONT_5X8, FONT_6X13_BOLD},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
};

use super::icons::{draw_icon, Icon};
use super::{draw_text, failure, layout_offset, ScreenDeck};
use crate::error::{RenderFailure, ScreenError};
use crate::hassio::VersionInfo;
use crate::registry::{ScreenDescriptor, ScreenKind};
use crate::textlayout::center_on;

const TITLE: &str = "Home Assistant";

pub(super) fn version_line(os: &VersionInfo, core: &VersionInfo) -> String {
    format!("OS {} - {}", os, core)
}

pub(super) fn render(deck: &mut ScreenDeck, screen: &ScreenDescriptor) -> Result<(), ScreenError> {
    let kind = ScreenKind::Splash;
    let supervisor = deck
        .host
        .supervisor
        .as_ref()
        .ok_or_else(|| RenderFailure::Other("Home Assistant supervisor not available".to_string()))
        .map_err(failure(kind))?;

    let (os, core) = supervisor.block_on(async {
        let client = supervisor.client();
        tokio::try_join!(client.os_version(), client.core_version())
    })
    .map_err(|e| ScreenError::render(kind, e))?;

    let width = deck.display.width() as i32;
    let dy = layout_offset(&deck.display);
    let icons = deck.settings.display.show_icons;
    let canvas = deck.display.canvas();

    // text is centered over the area right of the logo
    let left = if icons {
        let Ok(()) = draw_icon(canvas, Icon::HomeAssistant, Point::new(-2, 3 + dy), 26);
        29
    } else {
        0
    };
    let mid = (left + width) / 2;

    draw_text(canvas, TITLE, Point::new(center_on(TITLE, &FONT_6X13_BOLD, mid), 2 + dy), &FONT_6X13_BOLD);

    let Ok(()) = Line::new(Point::new(left + 5, 16 + dy), Point::new(width - 5, 16 + dy))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(canvas);

    let versions = version_line(&os, &core);
    draw_text(canvas, &versions, Point::new(center_on(&versions, &FONT_5X8, mid), 20 + dy), &FONT_5X8);

    deck.present_and_hold(kind, screen.duration())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line_marks_updates() {
        let os = VersionInfo { version: "10.5".into(), update_available: true };
        let core = VersionInfo { version: "2024.6.1".into(), update_available: false };
        assert_eq!(version_line(&os, &core), "OS 10.5* - 2024.6.1");
    }

    #[test]
    fn test_version_line_fits_small_font() {
        use crate::textlayout::FontMetrics;
        let os = VersionInfo { version: "12.4".into(), update_available: true };
        let core = VersionInfo { version: "2024.6.1".into(), update_available: true };
        // 99px right of the logo
        assert!(FONT_5X8.text_width(&version_line(&os, &core)) <= 99);
    }
}
