/*
 *  error.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Scheduling and rendering error taxonomy
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

use thiserror::Error;

use crate::config::ConfigError;
use crate::display::DisplayError;
use crate::hassio::HassioError;
use crate::registry::ScreenKind;

/// Only `Configuration` and `NoScreensAvailable` are fatal to the process;
/// `Render` is isolated to the screen that raised it.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("no screens available")]
    NoScreensAvailable,

    #[error("'{screen}' failed to render: {source}")]
    Render {
        screen: ScreenKind,
        #[source]
        source: RenderFailure,
    },

    #[error("'{0}' is not an enabled screen")]
    UnsupportedScreenRequested(ScreenKind),
}

impl ScreenError {
    pub fn render(screen: ScreenKind, source: impl Into<RenderFailure>) -> Self {
        ScreenError::Render { screen, source: source.into() }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ScreenError::Configuration(_) | ScreenError::NoScreensAvailable)
    }
}

/// Causes a screen render can fail with.
#[derive(Debug, Error)]
pub enum RenderFailure {
    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Supervisor(#[from] HassioError),

    #[error("metrics unavailable: {0}")]
    Metrics(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
