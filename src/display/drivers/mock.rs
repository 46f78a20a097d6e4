/*
 *  display/drivers/mock.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock panel for headless runs and tests
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

use std::sync::{Arc, Mutex, MutexGuard};

use embedded_graphics::pixelcolor::BinaryColor;
use log::trace;

use crate::display::error::DisplayError;
use crate::display::traits::{check_frame, valid_rotation, DisplayCapabilities, DisplayDriver};
use crate::vframebuf::VarFrameBuf;

/// Simulates a panel without hardware. Every operation is recorded in a
/// shared state so a test can keep a handle after the driver is boxed.
#[derive(Debug, Clone)]
pub struct MockDriver {
    capabilities: DisplayCapabilities,
    state: Arc<Mutex<MockDriverState>>,
}

#[derive(Debug, Default)]
pub struct MockDriverState {
    pub init_count: usize,
    pub present_count: usize,
    pub clear_count: usize,
    pub last_rotation: Option<u16>,
    pub is_initialized: bool,

    /// Copy of the most recently presented canvas
    pub last_frame: Option<VarFrameBuf<BinaryColor>>,

    /// Simulate failures (for error testing)
    pub simulate_present_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriver {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            capabilities: DisplayCapabilities {
                width,
                height,
                supports_rotation: true,
            },
            state: Arc::new(Mutex::new(MockDriverState::default())),
        }
    }

    /// Handle on the recorded state, valid after the driver is moved.
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockDriverState>, DisplayError> {
        self.state
            .lock()
            .map_err(|_| DisplayError::Other("mock state poisoned".to_string()))
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock()?;
        if state.simulate_init_failure {
            return Err(DisplayError::InitializationFailed("simulated".to_string()));
        }
        state.init_count += 1;
        state.is_initialized = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock()?;
        state.clear_count += 1;
        state.last_frame = None;
        Ok(())
    }

    fn present(&mut self, frame: &VarFrameBuf<BinaryColor>) -> Result<(), DisplayError> {
        check_frame(&self.capabilities, frame)?;
        let mut state = self.lock()?;
        if state.simulate_present_failure {
            return Err(DisplayError::Other("simulated present failure".to_string()));
        }
        state.present_count += 1;
        state.last_frame = Some(frame.clone());
        trace!("mock present #{} ({} lit)", state.present_count, frame.lit());
        Ok(())
    }

    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        let degrees = valid_rotation(degrees)?;
        self.lock()?.last_rotation = Some(degrees);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn test_mock_driver_creation() {
        let driver = MockDriver::new(128, 32);
        assert_eq!(driver.dimensions(), (128, 32));
        assert!(driver.state().lock().unwrap().last_frame.is_none());
    }

    #[test]
    fn test_mock_driver_init() {
        let mut driver = MockDriver::new(128, 32);
        let state = driver.state();
        assert!(!state.lock().unwrap().is_initialized);

        driver.init().unwrap();

        assert_eq!(state.lock().unwrap().init_count, 1);
        assert!(state.lock().unwrap().is_initialized);
    }

    #[test]
    fn test_mock_driver_present_records_frame() {
        let mut driver = MockDriver::new(128, 32);
        let mut fb = VarFrameBuf::new(128, 32, BinaryColor::Off);
        Line::new(Point::new(0, 0), Point::new(10, 10))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut fb)
            .unwrap();

        driver.present(&fb).unwrap();

        let state = driver.state();
        let state = state.lock().unwrap();
        assert_eq!(state.present_count, 1);
        assert_eq!(state.last_frame.as_ref().unwrap().pixel(0, 0), Some(BinaryColor::On));
    }

    #[test]
    fn test_mock_driver_rejects_wrong_size() {
        let mut driver = MockDriver::new(128, 32);
        let fb = VarFrameBuf::new(128, 64, BinaryColor::Off);
        assert!(matches!(
            driver.present(&fb),
            Err(DisplayError::BufferSizeMismatch { expected: 4096, actual: 8192 })
        ));
    }

    #[test]
    fn test_mock_driver_clear() {
        let mut driver = MockDriver::new(128, 32);
        driver.present(&VarFrameBuf::new(128, 32, BinaryColor::On)).unwrap();
        driver.clear().unwrap();

        let state = driver.state();
        let state = state.lock().unwrap();
        assert_eq!(state.clear_count, 1);
        assert!(state.last_frame.is_none());
    }

    #[test]
    fn test_mock_driver_rotation() {
        let mut driver = MockDriver::new(128, 32);
        driver.set_rotation(180).unwrap();
        assert_eq!(driver.state().lock().unwrap().last_rotation, Some(180));
        assert!(driver.set_rotation(45).is_err());
    }

    #[test]
    fn test_mock_driver_simulated_failure() {
        let mut driver = MockDriver::new(128, 32);
        let fb = VarFrameBuf::new(128, 32, BinaryColor::Off);

        driver.state().lock().unwrap().simulate_present_failure = true;
        assert!(driver.present(&fb).is_err());

        driver.state().lock().unwrap().simulate_present_failure = false;
        assert!(driver.present(&fb).is_ok());
    }
}
