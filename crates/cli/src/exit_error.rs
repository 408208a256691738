// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! The run path returns `ExitError` instead of calling
//! `std::process::exit()` directly, allowing `main()` to handle process
//! termination.

use std::fmt;

/// Exit status for a child that could not be spawned at all.
pub const SPAWN_FAILURE_CODE: i32 = 127;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// The binary was missing or not executable; reported immediately,
    /// never retried.
    pub fn spawn_failure(message: impl Into<String>) -> Self {
        Self::new(SPAWN_FAILURE_CODE, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
