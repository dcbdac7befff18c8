// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PJLink Class 1/2 projector and display control protocol engine.
//!
//! [`PjlinkClient`] owns one device connection: [`PjlinkClient::poll`] runs a
//! full Poll Engine cycle and returns a [`Snapshot`], [`PjlinkClient::control`]
//! dispatches a single property write, and [`PjlinkClient::spawn_supervisor`]
//! starts the background Keep-Alive/Pause Supervisor. All three contend for
//! one internal mutex, so a poll and a control never interleave mid-cycle.

mod capability;
mod catalog;
mod client;
pub mod config;
mod control;
pub mod error;
mod input_catalog;
mod keepalive;
pub mod metadata;
mod parser;
mod poll;
mod session;
pub mod snapshot;
pub mod transport;

#[cfg(test)]
mod mock_transport;

pub use client::PjlinkClient;
pub use config::PjlinkConfig;
pub use error::PjlinkError;
pub use metadata::{MetadataProvider, StaticMetadataProvider};
pub use snapshot::{ControlDescriptor, Snapshot};
