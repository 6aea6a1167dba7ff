#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shared utilities for modrive.
//!
//! This crate provides pure helper functions with no logging/async dependencies.
//! Store keys are absolute unix-style path strings, so everything here works on
//! `str`, never `std::path::Path` (platform-specific separators would corrupt
//! store keys).

pub mod path;
