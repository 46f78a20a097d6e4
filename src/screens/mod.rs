/*
 *  screens/mod.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screen rendering: dispatch from screen kind to its renderer
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

pub mod icons;
mod splash;
mod stats;
mod statictext;
mod welcome;

use std::time::{Duration, Instant};

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use log::{debug, info};

use crate::config::Settings;
use crate::display::Display;
use crate::error::{RenderFailure, ScreenError};
use crate::exit::{ExitGate, Farewell};
use crate::hassio::SupervisorHost;
use crate::metrics::{HostIdentity, MachineMetrics};
use crate::pacer::{self, Pacer};
use crate::registry::{ScreenDescriptor, ScreenKind};
use crate::scroller::{draw_glyphs, ScrollAnimator};
use crate::textlayout::{self, FontMetrics};
use crate::vframebuf::VarFrameBuf;

/// What the scheduler calls to put a screen on the panel.
pub trait ScreenRenderer {
    /// Render one screen for its full duration, or until the exit gate closes.
    fn render(&mut self, screen: &ScreenDescriptor) -> Result<(), ScreenError>;

    /// One-shot goodbye: no hold, no scrolling.
    fn render_farewell(&mut self, farewell: &Farewell) -> Result<(), ScreenError>;
}

/// Where the screens get their numbers from.
pub struct HostSources {
    pub identity: Box<dyn HostIdentity>,
    pub metrics: MachineMetrics,
    pub supervisor: Option<SupervisorHost>,
}

impl HostSources {
    /// Everything from the local host.
    pub fn local() -> Self {
        Self {
            identity: Box::new(MachineMetrics::new()),
            metrics: MachineMetrics::new(),
            supervisor: None,
        }
    }

    /// Hostname and address from the supervisor, the rest locally.
    pub fn supervised(host: SupervisorHost) -> Self {
        Self {
            identity: Box::new(host.clone()),
            metrics: MachineMetrics::new(),
            supervisor: Some(host),
        }
    }
}

/// The concrete renderer: one display, resolved settings and data sources.
pub struct ScreenDeck {
    pub(crate) display: Display,
    pub(crate) settings: Settings,
    pub(crate) gate: ExitGate,
    pub(crate) host: HostSources,
    pub(crate) pacer: Pacer,
}

impl ScreenDeck {
    pub fn new(display: Display, settings: Settings, gate: ExitGate, host: HostSources) -> Self {
        Self { display, settings, gate, host, pacer: Pacer::default() }
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Display {
        &mut self.display
    }

    pub fn into_display(self) -> Display {
        self.display
    }

    /// Push the canvas, snapshot it, then hold for the screen's duration.
    pub(crate) fn present_and_hold(
        &mut self,
        kind: ScreenKind,
        duration: Duration,
    ) -> Result<(), ScreenError> {
        self.present_named(kind, kind.as_str(), duration)
    }

    /// As `present_and_hold`, with the screenshot saved under `shot`.
    pub(crate) fn present_named(
        &mut self,
        kind: ScreenKind,
        shot: &str,
        duration: Duration,
    ) -> Result<(), ScreenError> {
        self.display.show().map_err(|e| ScreenError::render(kind, e))?;
        self.screenshot(kind, shot);
        if !pacer::hold(duration, &self.gate) {
            debug!("'{}' hold cut short", kind);
        }
        Ok(())
    }

    // a failed screenshot is not worth failing the screen over
    pub(crate) fn screenshot(&self, kind: ScreenKind, name: &str) {
        if let Err(e) = self.display.capture_screenshot(name) {
            log::warn!("'{}' screenshot failed: {}", kind, e);
        }
    }

    /// Scroll `text` across the panel until `duration` has passed and the
    /// text has left the panel, or the gate closes. Returns true when the
    /// pass completed. One screenshot is saved under `shot`.
    pub(crate) fn play_scroll(
        &mut self,
        kind: ScreenKind,
        shot: &str,
        text: &str,
        font: &MonoFont<'_>,
        duration: Duration,
    ) -> Result<bool, ScreenError> {
        let width = self.display.width();
        let baseline_y = (self.display.height() as i32 - font.line_height() as i32) / 2;
        let mut animator = ScrollAnimator::start(text, width, baseline_y, self.settings.scroll_amplitude, font);
        let style = MonoTextStyle::new(font, BinaryColor::On);
        // None: the duration runs past the end of the clock
        let deadline = Instant::now().checked_add(duration);
        let mut captured = false;

        while self.gate.render_allowed() {
            self.display.prepare();
            let frame = animator.step(deadline.is_none_or(|d| Instant::now() < d));
            let Ok(()) = draw_glyphs(&frame.glyphs, style, self.display.canvas());
            self.display.show().map_err(|e| ScreenError::render(kind, e))?;

            // snapshot once the text has fully entered
            if !captured && animator.state().position <= 2 {
                self.screenshot(kind, shot);
                captured = true;
            }

            if frame.completed {
                return Ok(true);
            }
            self.pacer.wait();
        }
        debug!("'{}' scroll interrupted", kind);
        Ok(false)
    }

    fn host_hostname(&self, kind: ScreenKind) -> Result<String, ScreenError> {
        self.host.identity.hostname().map_err(|e| ScreenError::render(kind, e))
    }
}

impl ScreenRenderer for ScreenDeck {
    fn render(&mut self, screen: &ScreenDescriptor) -> Result<(), ScreenError> {
        info!("'{}' rendering", screen.kind);
        self.display.prepare();

        match screen.kind {
            ScreenKind::Welcome => welcome::render(self, screen)?,
            ScreenKind::Splash => splash::render(self, screen)?,
            ScreenKind::Network => stats::render_network(self, screen)?,
            ScreenKind::Storage => stats::render_storage(self, screen)?,
            ScreenKind::Memory => stats::render_memory(self, screen)?,
            ScreenKind::Cpu => stats::render_cpu(self, screen)?,
            ScreenKind::Static => statictext::render(self, screen)?,
        }

        info!("'{}' completed", screen.kind);
        Ok(())
    }

    fn render_farewell(&mut self, farewell: &Farewell) -> Result<(), ScreenError> {
        info!("Rendering farewell '{}'", farewell.message);
        self.display.prepare();
        statictext::render_farewell(self, farewell)
    }
}

/// Draw one line of text with its top-left at `at`.
pub(crate) fn draw_text(canvas: &mut VarFrameBuf<BinaryColor>, text: &str, at: Point, font: &MonoFont<'_>) {
    let style = MonoTextStyle::new(font, BinaryColor::On);
    let Ok(_) = Text::with_baseline(text, at, style, Baseline::Top).draw(canvas);
}

/// Draw lines as a block centered in the canvas.
pub(crate) fn draw_block<S: AsRef<str>>(canvas: &mut VarFrameBuf<BinaryColor>, lines: &[S], font: &MonoFont<'_>) {
    let width = canvas.width() as u32;
    let height = canvas.height() as u32;
    let mut y = textlayout::vertical_block_offset(lines, font, height);
    for line in lines {
        let line = line.as_ref();
        let x = textlayout::center_on(line, font, width as i32 / 2);
        draw_text(canvas, line, Point::new(x, y), font);
        y += font.line_height() as i32;
    }
}

/// Vertical shift that keeps the 32 pixel layouts centered on taller panels.
pub(crate) fn layout_offset(display: &Display) -> i32 {
    (display.height() as i32 - 32).max(0) / 2
}

pub(crate) fn failure(kind: ScreenKind) -> impl Fn(RenderFailure) -> ScreenError {
    move |e| ScreenError::render(kind, e)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::DisplaySettings;
    use crate::display::drivers::mock::{MockDriver, MockDriverState};
    use crate::metrics::MetricSources;
    use std::fs;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    /// Fixed identity for layout tests.
    pub struct FakeHost {
        pub hostname: Option<String>,
    }

    impl HostIdentity for FakeHost {
        fn hostname(&self) -> Result<String, RenderFailure> {
            self.hostname.clone().ok_or_else(|| RenderFailure::Other("no hostname".into()))
        }

        fn ipv4(&self) -> Result<String, RenderFailure> {
            Ok("192.168.1.20".to_string())
        }
    }

    pub fn fake_sources(dir: &Path) -> MetricSources {
        let write = |name: &str, body: &str| {
            let p = dir.join(name);
            fs::write(&p, body).unwrap();
            p
        };
        MetricSources {
            loadavg: write("loadavg", "0.25 0.20 0.10 1/100 42\n"),
            thermal: write("temp", "48312\n"),
            uptime: write("uptime", "90061.5 1000.0\n"),
            meminfo: write("meminfo", "MemTotal: 1000000 kB\nMemAvailable: 400000 kB\n"),
            hostname: write("hostname", "testhost\n"),
            disk: dir.to_path_buf(),
        }
    }

    pub fn deck_with(
        settings: Settings,
        hostname: Option<&str>,
        dir: &Path,
    ) -> (ScreenDeck, Arc<Mutex<MockDriverState>>, ExitGate) {
        let driver = MockDriver::new(settings.display.width, settings.display.height);
        let state = driver.state();
        let display = Display::new(Box::new(driver), &settings.display).unwrap();
        let gate = ExitGate::new();
        let host = HostSources {
            identity: Box::new(FakeHost { hostname: hostname.map(str::to_string) }),
            metrics: MachineMetrics::with_sources(fake_sources(dir)),
            supervisor: None,
        };
        (ScreenDeck::new(display, settings, gate.clone(), host), state, gate)
    }

    pub fn quick(kind: ScreenKind) -> ScreenDescriptor {
        ScreenDescriptor::new(kind, 0)
    }

    #[test]
    fn test_every_local_screen_presents_a_frame() {
        let dir = tempfile::tempdir().unwrap();
        let (mut deck, state, _gate) = deck_with(Settings::default(), Some("testhost"), dir.path());

        for kind in [ScreenKind::Network, ScreenKind::Storage, ScreenKind::Memory, ScreenKind::Cpu] {
            deck.render(&quick(kind)).unwrap();
            let state = state.lock().unwrap();
            assert!(state.last_frame.as_ref().unwrap().lit() > 0, "{} drew nothing", kind);
        }
        assert_eq!(state.lock().unwrap().present_count, 4);
    }

    #[test]
    fn test_splash_without_supervisor_fails_as_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut deck, _state, _gate) = deck_with(Settings::default(), Some("h"), dir.path());
        let err = deck.render(&quick(ScreenKind::Splash)).unwrap_err();
        assert!(matches!(err, ScreenError::Render { screen: ScreenKind::Splash, .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_present_failure_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let (mut deck, state, _gate) = deck_with(Settings::default(), Some("h"), dir.path());
        state.lock().unwrap().simulate_present_failure = true;
        let err = deck.render(&quick(ScreenKind::Memory)).unwrap_err();
        assert!(err.to_string().starts_with("'memory' failed to render"));
    }

    #[test]
    fn test_screenshots_written_per_screen() {
        let dir = tempfile::tempdir().unwrap();
        let shots = dir.path().join("shots");
        let mut settings = Settings::default();
        settings.display = DisplaySettings { screenshot_dir: Some(shots.clone()), ..Default::default() };
        let (mut deck, _state, _gate) = deck_with(settings, Some("h"), dir.path());

        deck.render(&quick(ScreenKind::Cpu)).unwrap();
        assert!(shots.join("cpu.png").exists());
    }

    #[test]
    fn test_hold_is_cut_short_by_exit() {
        let dir = tempfile::tempdir().unwrap();
        let (mut deck, _state, gate) = deck_with(Settings::default(), Some("h"), dir.path());
        gate.request_exit();
        let start = Instant::now();
        deck.render(&ScreenDescriptor::new(ScreenKind::Memory, 30)).unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_draw_block_centers_lines() {
        use embedded_graphics::mono_font::ascii::FONT_6X10;
        let mut fb = VarFrameBuf::new(128, 32, BinaryColor::Off);
        draw_block(&mut fb, &["ab"], &FONT_6X10);
        // one 10px line on 32 rows starts at 11; 12px of text centered on 64
        let lit: Vec<(usize, usize)> = (0..32)
            .flat_map(|y| (0..128).map(move |x| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y) == Some(BinaryColor::On))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| (58..70).contains(&x) && (11..21).contains(&y)));
    }
}
