/*
 *  display/drivers/ssd1306.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1306 OLED over I2C, 128x32 and 128x64
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

use embedded_graphics::pixelcolor::BinaryColor;
use linux_embedded_hal::I2cdev;
use log::info;
use ssd1306::{
    mode::BufferedGraphicsMode,
    prelude::*,
    size::{DisplaySize128x32, DisplaySize128x64},
    I2CDisplayInterface, Ssd1306,
};

use crate::config::DisplaySettings;
use crate::display::error::DisplayError;
use crate::display::traits::{check_frame, valid_rotation, DisplayCapabilities, DisplayDriver};
use crate::vframebuf::VarFrameBuf;

type Panel<SIZE> = Ssd1306<I2CInterface<I2cdev>, SIZE, BufferedGraphicsMode<SIZE>>;

enum Ssd1306Variants {
    Size128x64(Panel<DisplaySize128x64>),
    Size128x32(Panel<DisplaySize128x32>),
}

pub struct Ssd1306Driver {
    display: Ssd1306Variants,
    capabilities: DisplayCapabilities,
}

impl Ssd1306Driver {
    /// Open the panel on `i2c_bus_path` (e.g. "/dev/i2c-1") at `address`.
    pub fn new_i2c(
        i2c_bus_path: &str,
        address: u8,
        settings: &DisplaySettings,
    ) -> Result<Self, DisplayError> {
        info!("Initializing SSD1306 on {} at address 0x{:02X}", i2c_bus_path, address);

        let i2c = I2cdev::new(i2c_bus_path)
            .map_err(|e| DisplayError::I2cError(format!("Failed to open {}: {}", i2c_bus_path, e)))?;
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);

        let display = match (settings.width, settings.height) {
            (128, 64) => Ssd1306Variants::Size128x64(
                Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                    .into_buffered_graphics_mode(),
            ),
            (128, 32) => Ssd1306Variants::Size128x32(
                Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
                    .into_buffered_graphics_mode(),
            ),
            (w, h) => {
                return Err(DisplayError::InvalidConfiguration(
                    format!("Unsupported SSD1306 size: {}x{}", w, h)
                ));
            }
        };

        Ok(Self {
            display,
            capabilities: DisplayCapabilities {
                width: settings.width,
                height: settings.height,
                supports_rotation: true,
            },
        })
    }
}

fn blit<SIZE: DisplaySize>(
    panel: &mut Panel<SIZE>,
    frame: &VarFrameBuf<BinaryColor>,
) -> Result<(), DisplayError> {
    panel.clear_buffer();
    let w = frame.width();
    for (i, px) in frame.as_slice().iter().enumerate() {
        if px.is_on() {
            panel.set_pixel((i % w) as u32, (i / w) as u32, true);
        }
    }
    panel.flush()?;
    Ok(())
}

fn blank<SIZE: DisplaySize>(panel: &mut Panel<SIZE>) -> Result<(), DisplayError> {
    panel.clear_buffer();
    panel.flush()?;
    Ok(())
}

impl DisplayDriver for Ssd1306Driver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        match &mut self.display {
            Ssd1306Variants::Size128x64(d) => d.init(),
            Ssd1306Variants::Size128x32(d) => d.init(),
        }
        .map_err(|e| DisplayError::InitializationFailed(format!("{:?}", e)))?;

        info!("SSD1306 initialized ({}x{})", self.capabilities.width, self.capabilities.height);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        match &mut self.display {
            Ssd1306Variants::Size128x64(d) => blank(d),
            Ssd1306Variants::Size128x32(d) => blank(d),
        }
    }

    fn present(&mut self, frame: &VarFrameBuf<BinaryColor>) -> Result<(), DisplayError> {
        check_frame(&self.capabilities, frame)?;
        match &mut self.display {
            Ssd1306Variants::Size128x64(d) => blit(d, frame),
            Ssd1306Variants::Size128x32(d) => blit(d, frame),
        }
    }

    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        let rotation = match valid_rotation(degrees)? {
            90 => DisplayRotation::Rotate90,
            180 => DisplayRotation::Rotate180,
            270 => DisplayRotation::Rotate270,
            _ => DisplayRotation::Rotate0,
        };

        match &mut self.display {
            Ssd1306Variants::Size128x64(d) => d.set_rotation(rotation),
            Ssd1306Variants::Size128x32(d) => d.set_rotation(rotation),
        }
        .map_err(|e| DisplayError::Other(format!("Set rotation failed: {:?}", e)))
    }
}
