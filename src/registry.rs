/*
 *  registry.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screen kinds, descriptors and the enabled-screen schedule
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

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use log::{debug, info};

use crate::config::{Options, ScreenSettings, DEFAULT_DURATION_SECS};
use crate::error::ScreenError;

/// The closed set of screens, declared in display priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScreenKind {
    Welcome,
    Splash,
    Network,
    Storage,
    Memory,
    Cpu,
    Static,
}

impl ScreenKind {
    /// Rotation order, independent of the order options were written in.
    pub const ORDER: [ScreenKind; 7] = [
        ScreenKind::Welcome,
        ScreenKind::Splash,
        ScreenKind::Network,
        ScreenKind::Storage,
        ScreenKind::Memory,
        ScreenKind::Cpu,
        ScreenKind::Static,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScreenKind::Welcome => "welcome",
            ScreenKind::Splash => "splash",
            ScreenKind::Network => "network",
            ScreenKind::Storage => "storage",
            ScreenKind::Memory => "memory",
            ScreenKind::Cpu => "cpu",
            ScreenKind::Static => "static",
        }
    }

    /// Screens that only make sense under the Home Assistant supervisor.
    pub fn requires_supervisor(self) -> bool {
        matches!(self, ScreenKind::Splash)
    }

    fn rank(self) -> usize {
        Self::ORDER.iter().position(|k| *k == self).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScreenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ScreenKind::ORDER
            .iter()
            .copied()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| format!("unknown screen '{}'", s))
    }
}

/// One schedulable screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenDescriptor {
    pub kind: ScreenKind,
    pub enabled: bool,
    pub duration_secs: u64,
    /// `None` is unlimited
    pub remaining_iterations: Option<u32>,
}

impl ScreenDescriptor {
    pub fn new(kind: ScreenKind, duration_secs: u64) -> Self {
        Self { kind, enabled: true, duration_secs, remaining_iterations: None }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.remaining_iterations = Some(limit);
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_iterations == Some(0)
    }
}

/// Enabled screens in rotation order. The set only ever shrinks once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleState {
    screens: Vec<ScreenDescriptor>,
}

impl ScheduleState {
    /// Disabled, exhausted and duplicate descriptors are dropped; the rest
    /// are put into rotation order.
    pub fn new(descriptors: impl IntoIterator<Item = ScreenDescriptor>) -> Self {
        let mut screens: Vec<ScreenDescriptor> = Vec::new();
        for d in descriptors {
            if d.enabled && !d.is_exhausted() && !screens.iter().any(|s| s.kind == d.kind) {
                screens.push(d);
            }
        }
        screens.sort_by_key(|s| s.kind.rank());
        Self { screens }
    }

    pub fn screens(&self) -> &[ScreenDescriptor] {
        &self.screens
    }

    pub fn kinds(&self) -> Vec<ScreenKind> {
        self.screens.iter().map(|s| s.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn contains(&self, kind: ScreenKind) -> bool {
        self.screens.iter().any(|s| s.kind == kind)
    }

    /// The descriptor for an enabled screen.
    pub fn descriptor(&self, kind: ScreenKind) -> Result<&ScreenDescriptor, ScreenError> {
        self.screens
            .iter()
            .find(|s| s.kind == kind)
            .ok_or(ScreenError::UnsupportedScreenRequested(kind))
    }

    /// Count one completed render. A limited screen is removed the moment
    /// its count reaches zero. Returns the remaining count, if limited.
    pub fn record_render(&mut self, kind: ScreenKind) -> Option<u32> {
        let screen = self.screens.iter_mut().find(|s| s.kind == kind)?;
        let remaining = screen.remaining_iterations.as_mut()?;
        *remaining = remaining.saturating_sub(1);
        let left = *remaining;
        info!("'{}' limit reduced to {} iterations", kind, left);
        if left == 0 {
            info!("'{}' iteration limit reached", kind);
            self.remove(kind);
        }
        Some(left)
    }

    /// Take a screen out of rotation.
    pub fn remove(&mut self, kind: ScreenKind) -> bool {
        let before = self.screens.len();
        self.screens.retain(|s| s.kind != kind);
        let removed = self.screens.len() != before;
        if removed {
            info!("'{}' removed from enabled screens", kind);
        }
        removed
    }
}

/// Cached platform capability check. The check runs at most once.
pub struct PlatformSupport {
    check: Box<dyn Fn() -> bool + Send + Sync>,
    cached: OnceLock<bool>,
}

impl PlatformSupport {
    pub fn new(check: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self { check: Box::new(check), cached: OnceLock::new() }
    }

    pub fn fixed(supported: bool) -> Self {
        Self::new(move || supported)
    }

    pub fn is_supported(&self) -> bool {
        *self.cached.get_or_init(|| (self.check)())
    }
}

impl fmt::Debug for PlatformSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformSupport").field("cached", &self.cached.get()).finish()
    }
}

/// Resolve the enabled screens from the options.
///
/// A show option that is present and false removes the screen; an absent one
/// enables it. A limit of zero means the screen is never enabled, an absent
/// limit means unlimited. Supervisor-only screens also need `platform` to
/// report support.
pub fn build_schedule(
    options: &Options,
    platform: &PlatformSupport,
) -> Result<ScheduleState, ScreenError> {
    let default_duration = options.get_count("default_duration")?.unwrap_or(DEFAULT_DURATION_SECS);
    let mut descriptors = Vec::new();

    for kind in ScreenKind::ORDER {
        let settings = ScreenSettings::resolve(kind, options, default_duration)?;

        if settings.show == Some(false) {
            debug!("'{}' disabled by configuration", kind);
            continue;
        }

        if kind.requires_supervisor() && !platform.is_supported() {
            info!("'{}' needs Home Assistant, skipping", kind);
            continue;
        }

        let mut descriptor = ScreenDescriptor::new(kind, settings.duration_secs);
        match settings.limit {
            Some(0) => {
                info!("'{}' limited to 0 iterations, never shown", kind);
                continue;
            }
            Some(limit) => {
                info!("'{}' limited to {} iterations", kind, limit);
                descriptor = descriptor.with_limit(limit);
            }
            None => {}
        }
        descriptors.push(descriptor);
    }

    let schedule = ScheduleState::new(descriptors);
    info!("Enabled screens: {:?}", schedule.kinds());
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn opts(v: Value) -> Options {
        let map: BTreeMap<String, Value> = serde_json::from_value(v).unwrap();
        Options::from_map(map)
    }

    #[test]
    fn test_all_screens_fail_open() {
        let s = build_schedule(&Options::default(), &PlatformSupport::fixed(true)).unwrap();
        assert_eq!(s.kinds(), ScreenKind::ORDER.to_vec());
        assert!(s.screens().iter().all(|d| d.duration_secs == 10 && d.remaining_iterations.is_none()));
    }

    #[test]
    fn test_show_false_omits_screen() {
        let s = build_schedule(
            &opts(json!({"show_cpu_screen": false, "show_static_screen": "no"})),
            &PlatformSupport::fixed(true),
        )
        .unwrap();
        assert!(!s.contains(ScreenKind::Cpu));
        assert!(!s.contains(ScreenKind::Static));
        assert!(s.contains(ScreenKind::Memory));
    }

    #[test]
    fn test_splash_needs_platform() {
        let s = build_schedule(
            &opts(json!({"show_splash_screen": true})),
            &PlatformSupport::fixed(false),
        )
        .unwrap();
        assert!(!s.contains(ScreenKind::Splash));
    }

    #[test]
    fn test_platform_check_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let platform = PlatformSupport::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            true
        });
        assert!(platform.is_supported());
        assert!(platform.is_supported());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_limit_and_duration() {
        let s = build_schedule(
            &opts(json!({"show_cpu_screen": true, "cpu_screen_limit": 2, "cpu_screen_duration": 5})),
            &PlatformSupport::fixed(false),
        )
        .unwrap();
        let cpu = s.descriptor(ScreenKind::Cpu).unwrap();
        assert_eq!(cpu.remaining_iterations, Some(2));
        assert_eq!(cpu.duration_secs, 5);
    }

    #[test]
    fn test_zero_limit_never_enabled() {
        let s = build_schedule(
            &opts(json!({"memory_screen_limit": 0})),
            &PlatformSupport::fixed(false),
        )
        .unwrap();
        assert!(!s.contains(ScreenKind::Memory));
    }

    #[test]
    fn test_default_duration_override() {
        let s = build_schedule(
            &opts(json!({"default_duration": 3, "network_screen_duration": 8})),
            &PlatformSupport::fixed(false),
        )
        .unwrap();
        assert_eq!(s.descriptor(ScreenKind::Network).unwrap().duration_secs, 8);
        assert_eq!(s.descriptor(ScreenKind::Storage).unwrap().duration_secs, 3);
    }

    #[test]
    fn test_malformed_limit_fails_fast() {
        let err = build_schedule(
            &opts(json!({"cpu_screen_limit": "twice"})),
            &PlatformSupport::fixed(false),
        )
        .unwrap_err();
        assert!(matches!(err, ScreenError::Configuration(_)));
    }

    #[test]
    fn test_malformed_duration_fails_fast() {
        let err = build_schedule(
            &opts(json!({"default_duration": [1, 2]})),
            &PlatformSupport::fixed(false),
        )
        .unwrap_err();
        assert!(matches!(err, ScreenError::Configuration(_)));
    }

    #[test]
    fn test_schedule_orders_and_dedups() {
        let s = ScheduleState::new(vec![
            ScreenDescriptor::new(ScreenKind::Static, 1),
            ScreenDescriptor::new(ScreenKind::Welcome, 1),
            ScreenDescriptor::new(ScreenKind::Static, 2),
            ScreenDescriptor::new(ScreenKind::Cpu, 1).with_limit(0),
        ]);
        assert_eq!(s.kinds(), vec![ScreenKind::Welcome, ScreenKind::Static]);
        assert_eq!(s.descriptor(ScreenKind::Static).unwrap().duration_secs, 1);
    }

    #[test]
    fn test_record_render_removes_at_zero() {
        let mut s = ScheduleState::new(vec![
            ScreenDescriptor::new(ScreenKind::Cpu, 0).with_limit(2),
            ScreenDescriptor::new(ScreenKind::Memory, 0),
        ]);
        assert_eq!(s.record_render(ScreenKind::Cpu), Some(1));
        assert!(s.contains(ScreenKind::Cpu));
        assert_eq!(s.record_render(ScreenKind::Cpu), Some(0));
        assert!(!s.contains(ScreenKind::Cpu));
        assert_eq!(s.record_render(ScreenKind::Memory), None);
        assert!(s.contains(ScreenKind::Memory));
    }

    #[test]
    fn test_descriptor_for_disabled_screen() {
        let s = ScheduleState::new(vec![ScreenDescriptor::new(ScreenKind::Cpu, 0)]);
        assert!(matches!(
            s.descriptor(ScreenKind::Splash),
            Err(ScreenError::UnsupportedScreenRequested(ScreenKind::Splash))
        ));
    }

    #[test]
    fn test_huge_duration_holds_until_exit() {
        let s = build_schedule(
            &opts(json!({"cpu_screen_duration": i64::MAX})),
            &PlatformSupport::fixed(false),
        )
        .unwrap();
        let cpu = s.descriptor(ScreenKind::Cpu).unwrap();
        assert_eq!(cpu.duration_secs, i64::MAX as u64);

        let gate = crate::exit::ExitGate::new();
        gate.request_exit();
        assert!(!crate::pacer::hold(cpu.duration(), &gate));
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("CPU".parse::<ScreenKind>().unwrap(), ScreenKind::Cpu);
        assert!("clock".parse::<ScreenKind>().is_err());
    }
}
