/*
 *  exit.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Signal driven graceful exit and the farewell screen
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

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use crate::registry::{ScreenDescriptor, ScreenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    Normal,
    /// terminal
    Exiting,
}

// every flag only ever goes false -> true
#[derive(Debug, Default)]
struct ExitFlags {
    exit_requested: AtomicBool,
    exiting: AtomicBool,
    farewell_taken: AtomicBool,
}

/// Shared master render gate. Cheap to clone; every clone sees the same flags.
#[derive(Debug, Clone, Default)]
pub struct ExitGate {
    flags: Arc<ExitFlags>,
}

impl ExitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// False once an exit has been requested, for good.
    #[inline]
    pub fn render_allowed(&self) -> bool {
        !self.flags.exit_requested.load(Ordering::Acquire)
    }

    /// Safe from the signal path: two atomic stores, nothing else.
    /// Returns true only for the call that moved the gate to `Exiting`.
    pub fn request_exit(&self) -> bool {
        self.flags.exit_requested.store(true, Ordering::Release);
        !self.flags.exiting.swap(true, Ordering::AcqRel)
    }

    pub fn state(&self) -> ExitState {
        if self.flags.exiting.load(Ordering::Acquire) {
            ExitState::Exiting
        } else {
            ExitState::Normal
        }
    }

    /// One-shot: true for the first caller after an exit request.
    fn take_farewell(&self) -> bool {
        !self.render_allowed() && !self.flags.farewell_taken.swap(true, Ordering::AcqRel)
    }
}

/// The one-shot goodbye: a static screen with no duration and no scrolling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Farewell {
    pub descriptor: ScreenDescriptor,
    pub message: String,
}

impl Farewell {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            descriptor: ScreenDescriptor::new(ScreenKind::Static, 0),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GracefulExit {
    gate: ExitGate,
    farewell: Farewell,
}

impl GracefulExit {
    pub fn new(gate: ExitGate, message: impl Into<String>) -> Self {
        let farewell = Farewell::new(message);
        info!("Graceful exit enabled");
        Self { gate, farewell }
    }

    pub fn gate(&self) -> &ExitGate {
        &self.gate
    }

    pub fn farewell(&self) -> &Farewell {
        &self.farewell
    }

    /// Normal -> Exiting. Repeat calls are no-ops.
    pub fn exit_gracefully(&self) -> bool {
        let first = self.gate.request_exit();
        if first {
            info!("Exiting");
        } else {
            debug!("Already exiting");
        }
        first
    }

    /// The farewell to render, handed out once and only after an exit request.
    pub fn take_farewell(&self) -> Option<&Farewell> {
        self.gate.take_farewell().then_some(&self.farewell)
    }
}

/// Waits for SIGINT or SIGTERM and closes the gate. Runs until aborted;
/// signals after the first are logged and otherwise ignored.
#[cfg(unix)]
pub async fn listen_for_signals(gate: ExitGate) -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    loop {
        tokio::select! {
            _ = sigint.recv() => {
                info!("SIGINT received. Initiating graceful shutdown.");
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received. Initiating graceful shutdown.");
            }
        }
        if !gate.request_exit() {
            debug!("Shutdown already in progress");
        }
    }
}
