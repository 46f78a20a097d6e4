/*
 *  display/mod.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem: a canvas the screens draw into and the driver
 *  that shows it
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

pub mod drivers;
pub mod error;
pub mod traits;

use std::fs;
use std::path::PathBuf;

use embedded_graphics::pixelcolor::BinaryColor;
use image::ImageFormat;
use log::{debug, info};

pub use error::DisplayError;
pub use traits::{DisplayCapabilities, DisplayDriver};

use crate::config::DisplaySettings;
use crate::vframebuf::VarFrameBuf;
use drivers::mock::MockDriver;

/// The panel plus the canvas screens draw into. Nothing reaches the panel
/// until `show`.
pub struct Display {
    driver: Box<dyn DisplayDriver>,
    canvas: VarFrameBuf<BinaryColor>,
    screenshot_dir: Option<PathBuf>,
}

impl Display {
    /// Initialise the driver and apply rotation.
    pub fn new(mut driver: Box<dyn DisplayDriver>, settings: &DisplaySettings) -> Result<Self, DisplayError> {
        driver.init()?;
        if settings.rotate_180 {
            driver.set_rotation(180)?;
        }
        let (w, h) = driver.dimensions();
        Ok(Self {
            driver,
            canvas: VarFrameBuf::new(w, h, BinaryColor::Off),
            screenshot_dir: settings.screenshot_dir.clone(),
        })
    }

    /// Open the configured panel, or a mock one when `headless`.
    pub fn open(settings: &DisplaySettings, headless: bool) -> Result<Self, DisplayError> {
        if headless {
            info!("Headless: rendering to a {}x{} mock panel", settings.width, settings.height);
            return Self::new(Box::new(MockDriver::new(settings.width, settings.height)), settings);
        }
        Self::new(hardware_driver(settings)?, settings)
    }

    pub fn width(&self) -> u32 {
        self.canvas.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.canvas.height() as u32
    }

    pub fn canvas(&mut self) -> &mut VarFrameBuf<BinaryColor> {
        &mut self.canvas
    }

    pub fn frame(&self) -> &VarFrameBuf<BinaryColor> {
        &self.canvas
    }

    /// Start a new frame.
    pub fn prepare(&mut self) {
        self.canvas.clear_color(BinaryColor::Off);
    }

    /// Push the canvas to the panel.
    pub fn show(&mut self) -> Result<(), DisplayError> {
        self.driver.present(&self.canvas)
    }

    /// Blank both the canvas and the panel.
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.prepare();
        self.driver.clear()
    }

    /// Write the current canvas to `<screenshot dir>/<name>.png` when
    /// screenshots are enabled.
    pub fn capture_screenshot(&self, name: &str) -> Result<Option<PathBuf>, DisplayError> {
        let Some(dir) = &self.screenshot_dir else {
            return Ok(None);
        };
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.png", name));
        self.canvas.to_gray_image().save_with_format(&path, ImageFormat::Png)?;
        debug!("Screenshot saved to {}", path.display());
        Ok(Some(path))
    }
}

#[cfg(feature = "driver-ssd1306")]
fn hardware_driver(settings: &DisplaySettings) -> Result<Box<dyn DisplayDriver>, DisplayError> {
    let driver = drivers::ssd1306::Ssd1306Driver::new_i2c(&settings.i2c_path(), settings.address, settings)?;
    Ok(Box::new(driver))
}

#[cfg(not(feature = "driver-ssd1306"))]
fn hardware_driver(_settings: &DisplaySettings) -> Result<Box<dyn DisplayDriver>, DisplayError> {
    Err(DisplayError::InvalidConfiguration(
        "built without a panel driver, run with --headless".to_string(),
    ))
}
