/*
 *  pacer.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame pacing and interruptible holds
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

use std::thread;
use std::time::{Duration, Instant};

use crate::exit::ExitGate;

/// I²C panels manage about 30fps
pub const DEFAULT_FPS: u32 = 30;
/// Granularity at which holds notice an exit request.
pub const HOLD_SLICE: Duration = Duration::from_millis(100);

pub struct Pacer {
    next_deadline: Instant,
    frame: Duration,
}

impl Pacer {
    pub fn new(target_fps: u32) -> Self {
        Self { next_deadline: Instant::now(), frame: frame_for(target_fps) }
    }

    #[inline]
    pub fn set_fps(&mut self, fps: u32) {
        self.frame = frame_for(fps);
    }

    pub fn frame(&self) -> Duration {
        self.frame
    }

    /// Block until the next frame is due. A late frame resets the cadence
    /// rather than trying to catch up.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next_deadline {
            thread::sleep(self.next_deadline - now);
            self.next_deadline += self.frame;
        } else {
            self.next_deadline = now + self.frame;
        }
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

fn frame_for(fps: u32) -> Duration {
    Duration::from_micros((1_000_000u32 / fps.max(1)) as u64)
}

/// Sleep for `duration` in short slices, bailing out once the gate closes.
/// Returns true if the full duration elapsed. A duration past the end of
/// the clock holds until the gate closes.
pub fn hold(duration: Duration, gate: &ExitGate) -> bool {
    let deadline = Instant::now().checked_add(duration);
    loop {
        if !gate.render_allowed() {
            return false;
        }
        let slice = match deadline {
            Some(d) => {
                let now = Instant::now();
                if now >= d {
                    return true;
                }
                (d - now).min(HOLD_SLICE)
            }
            None => HOLD_SLICE,
        };
        thread::sleep(slice);
    }
}
