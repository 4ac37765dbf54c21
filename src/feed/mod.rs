// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Live inspection feed

mod pipeline;
mod simulator;

pub use pipeline::*;
pub use simulator::*;
