// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tfshim-core: invocation model and host resolution for the tfshim wrapper.
//!
//! Everything here is synchronous and side-effect free apart from reading
//! the environment; process supervision lives in `tfshim-engine`.

pub mod env;
pub mod invocation;
pub mod locate;
pub mod moduledir;

pub use env::Config;
pub use invocation::{Invocation, PlanOpts, Subcommand};
