/*
 *  screens/stats.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Network, storage, memory and CPU screens
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

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_7X13};
use embedded_graphics::prelude::*;

use super::icons::{draw_icon, Icon};
use super::{draw_text, failure, layout_offset, ScreenDeck};
use crate::error::{RenderFailure, ScreenError};
use crate::registry::{ScreenDescriptor, ScreenKind};

const ICON_SIZE: u32 = 26;
const SMALL_ICON_SIZE: u32 = 13;
const TEXT_X: i32 = 29;
const ROWS: [i32; 3] = [0, 11, 21];

pub(super) fn render_network(deck: &mut ScreenDeck, screen: &ScreenDescriptor) -> Result<(), ScreenError> {
    let kind = ScreenKind::Network;
    let hostname = deck.host.identity.hostname().map_err(failure(kind))?;
    let ipv4 = deck.host.identity.ipv4().map_err(failure(kind))?;

    let dy = layout_offset(&deck.display);
    let icons = deck.settings.display.show_icons;
    let canvas = deck.display.canvas();

    let name_x = if icons {
        let Ok(()) = draw_icon(canvas, Icon::Network, Point::new(-2, dy), SMALL_ICON_SIZE);
        18
    } else {
        0
    };
    draw_text(canvas, &hostname, Point::new(name_x, dy), &FONT_7X13);
    draw_text(canvas, &format!("IP4 {}", ipv4), Point::new(0, 18 + dy), &FONT_7X13);

    deck.present_and_hold(kind, screen.duration())
}

pub(super) fn render_storage(deck: &mut ScreenDeck, screen: &ScreenDescriptor) -> Result<(), ScreenError> {
    let kind = ScreenKind::Storage;
    let usage = deck.host.metrics.storage().map_err(|e| ScreenError::render(kind, e))?;
    three_lines(deck, kind, Icon::Storage, &usage.lines(), screen)
}

pub(super) fn render_memory(deck: &mut ScreenDeck, screen: &ScreenDescriptor) -> Result<(), ScreenError> {
    let kind = ScreenKind::Memory;
    let usage = deck.host.metrics.memory().map_err(|e| ScreenError::render(kind, e))?;
    three_lines(deck, kind, Icon::Memory, &usage.lines(), screen)
}

pub(super) fn render_cpu(deck: &mut ScreenDeck, screen: &ScreenDescriptor) -> Result<(), ScreenError> {
    let kind = ScreenKind::Cpu;
    let cpu = deck
        .host
        .metrics
        .cpu()
        .map_err(|e| ScreenError::render(kind, RenderFailure::from(e)))?;
    let lines = [
        cpu.temp_line(deck.settings.temperature_unit),
        cpu.load_line(),
        cpu.uptime_line(),
    ];
    three_lines(deck, kind, Icon::Cpu, &lines, screen)
}

// icon on the left, three rows of small text beside it
fn three_lines(
    deck: &mut ScreenDeck,
    kind: ScreenKind,
    icon: Icon,
    lines: &[String; 3],
    screen: &ScreenDescriptor,
) -> Result<(), ScreenError> {
    let dy = layout_offset(&deck.display);
    let icons = deck.settings.display.show_icons;
    let canvas = deck.display.canvas();

    let x = if icons {
        let Ok(()) = draw_icon(canvas, icon, Point::new(-2, 3 + dy), ICON_SIZE);
        TEXT_X
    } else {
        0
    };
    for (line, row) in lines.iter().zip(ROWS) {
        draw_text(canvas, line, Point::new(x, row + dy), &FONT_6X10);
    }

    deck.present_and_hold(kind, screen.duration())
}
