// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated host and scenario driver for glissade engines.
//!
//! - [`SimHost`]: a deterministic [`Host`] / [`Presenter`] that records
//!   every effect write and counts what could leak (outstanding frame
//!   requests, live listeners, live intersection observations).
//! - [`Simulation`]: steps an [`Engine`] over a `SimHost` through simulated
//!   60 Hz frames.
//! - [`EventLog`]: a [`TraceSink`] keeping the event history scenario tests
//!   assert on.
//!
//! [`Host`]: glissade_core::host::Host
//! [`Presenter`]: glissade_core::host::Presenter
//! [`Engine`]: glissade_core::engine::Engine
//! [`TraceSink`]: glissade_core::trace::TraceSink

#![no_std]

extern crate alloc;

mod host;
mod log;
mod sim;

pub use host::{Capabilities, Observation, SimHost};
pub use log::EventLog;
pub use sim::{FRAME_INTERVAL, Simulation};
