/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Fatal invariant-violation errors for the simulator core.
//!
//! The simulator is a closed system (§7): no untrusted input ever reaches
//! these paths when the public API is used as intended, so every variant
//! here represents a programming error, not a normal runtime condition.
//! They are `Result`-returned rather than panicking only at the narrow seams
//! where a caller could in principle break the contract (e.g. handing the
//! energy model a landscape that omits a CPU).

use thiserror::Error;

/// A design-time invariant was violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A landscape passed to [`EnergyModel::compute`](crate::energy_model::EnergyModel::compute)
    /// or [`Schedutil::update`](crate::governor::Schedutil::update) is missing
    /// an entry for a CPU present in the scheduler's CPU list.
    #[error("landscape is missing an entry for CPU '{cpu}'")]
    MissingCpuInLandscape { cpu: String },
}
