/*
 *  scheduler.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  The screen rotation loop
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

use std::time::Duration;

use log::{error, info, warn};

use crate::error::ScreenError;
use crate::exit::GracefulExit;
use crate::pacer;
use crate::registry::{ScheduleState, ScreenKind};
use crate::screens::ScreenRenderer;

/// Pause after a pass in which every screen failed.
const FAILED_PASS_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub passes: usize,
    pub renders: usize,
    pub failures: usize,
    pub farewell_shown: bool,
}

/// Cycle the enabled screens until the exit gate closes or every screen has
/// used up its limit, then give the farewell its one render.
///
/// Only an empty schedule is an error, and it is reported before anything
/// renders. Render failures are logged and the rotation moves on.
pub fn run<R>(
    schedule: &mut ScheduleState,
    exit: &GracefulExit,
    renderer: &mut R,
) -> Result<RunSummary, ScreenError>
where
    R: ScreenRenderer + ?Sized,
{
    if schedule.is_empty() {
        return Err(ScreenError::NoScreensAvailable);
    }

    let gate = exit.gate();
    let mut summary = RunSummary::default();

    while gate.render_allowed() {
        if schedule.is_empty() {
            info!("Every screen has reached its limit");
            break;
        }
        summary.passes += 1;
        let mut rendered = 0;

        // walk the live set: a screen removed this pass is not revisited
        for kind in ScreenKind::ORDER {
            if !gate.render_allowed() {
                break;
            }
            let Ok(descriptor) = schedule.descriptor(kind) else {
                continue;
            };
            let descriptor = descriptor.clone();

            match renderer.render(&descriptor) {
                Ok(()) => {
                    rendered += 1;
                    summary.renders += 1;
                    schedule.record_render(kind);
                }
                Err(e) => {
                    summary.failures += 1;
                    error!("{}", e);
                }
            }
        }

        if rendered == 0 && gate.render_allowed() {
            warn!("No screen rendered this pass, backing off");
            pacer::hold(FAILED_PASS_BACKOFF, gate);
        }
    }

    if let Some(farewell) = exit.take_farewell() {
        match renderer.render_farewell(farewell) {
            Ok(()) => summary.farewell_shown = true,
            Err(e) => error!("{}", e),
        }
    }

    info!(
        "Rotation finished: {} passes, {} renders, {} failures",
        summary.passes, summary.renders, summary.failures
    );
    Ok(summary)
}

/// Render one named screen once, outside the rotation. The screen must be
/// enabled and the render counts against its limit. Errors go back to the
/// caller rather than being logged.
pub fn render_once<R>(
    schedule: &mut ScheduleState,
    kind: ScreenKind,
    exit: &GracefulExit,
    renderer: &mut R,
) -> Result<(), ScreenError>
where
    R: ScreenRenderer + ?Sized,
{
    let descriptor = schedule.descriptor(kind)?.clone();

    if exit.gate().render_allowed() {
        renderer.render(&descriptor)?;
        schedule.record_render(kind);
    }

    if let Some(farewell) = exit.take_farewell() {
        renderer.render_farewell(farewell)?;
    }
    Ok(())
}
