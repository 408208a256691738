// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tfshim-engine: child process supervision for the tfshim wrapper.
//!
//! The three runtime pieces of an invocation: the capture pipe that
//! duplicates the child's combined output into a durable transcript, the
//! supervisor that spawns the child and relays termination signals to it
//! immediately, and the post-processor that derives plan artifacts after
//! a successful plan.

pub mod capture;
pub mod plan;
pub mod supervisor;

pub use capture::CapturePipe;
pub use plan::{PlanContext, PlanError};
pub use supervisor::{Outcome, Supervisor, SuperviseError};
