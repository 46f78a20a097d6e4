/*
 *  display/traits.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Panel driver abstraction
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

use crate::display::error::DisplayError;
use crate::vframebuf::VarFrameBuf;

/// Display capabilities and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCapabilities {
    pub width: u32,
    pub height: u32,

    /// Whether the display supports hardware rotation
    pub supports_rotation: bool,
}

/// What every monochrome panel must do. Screens never talk to a driver
/// directly; they draw into a canvas that is presented whole.
pub trait DisplayDriver: Send {
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Initialize the display hardware
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Blank the panel.
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Push a full canvas to the panel. The canvas must match the panel size.
    fn present(&mut self, frame: &VarFrameBuf<BinaryColor>) -> Result<(), DisplayError>;

    /// Rotation angle should be 0, 90, 180, or 270 degrees.
    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        if !self.capabilities().supports_rotation {
            return Err(DisplayError::UnsupportedOperation);
        }
        Err(DisplayError::InvalidRotation(degrees))
    }
}

/// Shared size check for `present` implementations.
pub(crate) fn check_frame(
    caps: &DisplayCapabilities,
    frame: &VarFrameBuf<BinaryColor>,
) -> Result<(), DisplayError> {
    let expected = (caps.width * caps.height) as usize;
    let actual = frame.as_slice().len();
    if expected != actual {
        return Err(DisplayError::BufferSizeMismatch { expected, actual });
    }
    Ok(())
}

pub(crate) fn valid_rotation(degrees: u16) -> Result<u16, DisplayError> {
    match degrees {
        0 | 90 | 180 | 270 => Ok(degrees),
        _ => Err(DisplayError::InvalidRotation(degrees)),
    }
}
