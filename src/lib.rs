/*
 *  lib.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
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

pub mod config;
pub mod deutils;
pub mod display;
pub mod error;
pub mod exit;
pub mod hassio;
pub mod metrics;
pub mod pacer;
pub mod registry;
pub mod scheduler;
pub mod screens;
pub mod scroller;
pub mod textlayout;
pub mod vframebuf;

pub use error::{RenderFailure, ScreenError};
pub use exit::{ExitGate, GracefulExit};
pub use registry::{ScheduleState, ScreenDescriptor, ScreenKind};
pub use screens::{HostSources, ScreenDeck, ScreenRenderer};
