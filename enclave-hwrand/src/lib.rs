/* Copyright (c) Fortanix, Inc.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Two hardware primitives for code running inside an enclave:
//!
//! * [`get_random_u16`] queries the CPU random number generator (`RDRAND` on
//!   x86, `RNDR` on aarch64) with an optional bounded retry.
//! * [`read_cycle_counter`] reads the time-stamp counter (`RDTSC`) on x86 and
//!   returns `0` on targets where no such counter is accessible.
//!
//! The implementation is selected at compile time from the target
//! architecture. There is no runtime CPU detection and no software fallback:
//! building for an architecture other than x86, x86_64 or aarch64 fails.
//!
//! This crate only exposes the raw instructions. Pooling, mixing and seeding
//! of a software generator are left to the caller.

#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
compile_error!("enclave-hwrand requires RDRAND (x86, x86_64) or RNDR (aarch64)");

mod rand;
#[cfg(feature = "std")]
mod reader;
mod tsc;

#[cfg(test)]
mod test_support;

pub use crate::rand::{get_random_u16, NotReady, RandomRequest, RandomResult, RETRY_LIMIT};
#[cfg(feature = "std")]
pub use crate::reader::RandReader;
pub use crate::tsc::{
    coarse_timestamp, cycle_counter_supported, read_cycle_counter, CycleReading,
    DEFAULT_TSC_FREQ_HZ,
};
