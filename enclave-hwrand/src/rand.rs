/* Copyright (c) Fortanix, Inc.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use core::fmt::{self, Display, Formatter};

use log::{debug, trace};

/// Maximum number of hardware queries made by a retrying request.
///
/// Intel recommends 10 attempts before concluding that `RDRAND` is out of
/// service. The `long_retry` feature raises the budget to 100.
#[cfg(not(feature = "long_retry"))]
pub const RETRY_LIMIT: u32 = 10;
#[cfg(feature = "long_retry")]
pub const RETRY_LIMIT: u32 = 100;

/// Outcome of a hardware random number request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RandomResult {
    Success(u16),
    /// The hardware did not deliver a value within the attempt budget. This
    /// is an ordinary outcome under contention; retrying later is allowed.
    NotReady,
}

impl RandomResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RandomResult::Success(_))
    }

    pub fn into_result(self) -> Result<u16, NotReady> {
        match self {
            RandomResult::Success(value) => Ok(value),
            RandomResult::NotReady => Err(NotReady),
        }
    }
}

impl From<RandomResult> for Option<u16> {
    fn from(result: RandomResult) -> Self {
        result.into_result().ok()
    }
}

/// Error form of [`RandomResult::NotReady`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NotReady;

impl Display for NotReady {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("hardware random number generator not ready")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NotReady {}

#[cfg(feature = "std")]
impl From<NotReady> for std::io::Error {
    fn from(err: NotReady) -> Self {
        std::io::Error::new(std::io::ErrorKind::WouldBlock, err)
    }
}

/// A request for one 16-bit hardware random value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RandomRequest {
    /// Query up to [`RETRY_LIMIT`] times instead of once.
    pub retry: bool,
}

impl RandomRequest {
    /// Width in bits of the value produced.
    pub const WIDTH: u32 = 16;

    pub const fn single() -> Self {
        RandomRequest { retry: false }
    }

    pub const fn with_retry() -> Self {
        RandomRequest { retry: true }
    }

    /// The number of hardware queries this request may issue.
    pub const fn attempts(&self) -> u32 {
        if self.retry {
            RETRY_LIMIT
        } else {
            1
        }
    }

    pub fn execute(&self) -> RandomResult {
        acquire(&mut Hardware, self.attempts())
    }
}

/// Reads a 16-bit value from the CPU random number generator.
///
/// With `retry == false` exactly one query is made. Otherwise up to
/// [`RETRY_LIMIT`] queries are made, stopping at the first success. The
/// value is the low 16 bits of the native word the instruction produced.
///
/// Each call is independent and may be made concurrently from any thread.
pub fn get_random_u16(retry: bool) -> RandomResult {
    RandomRequest { retry }.execute()
}

/// One query of a random number generator, yielding the full native word
/// on success.
pub(crate) trait RandStep {
    fn step(&mut self) -> Option<u64>;
}

pub(crate) struct Hardware;

impl RandStep for Hardware {
    #[inline]
    fn step(&mut self) -> Option<u64> {
        arch::rand_step()
    }
}

pub(crate) fn acquire<S: RandStep>(source: &mut S, attempts: u32) -> RandomResult {
    for attempt in 1..=attempts {
        if let Some(word) = source.step() {
            if attempt > 1 {
                trace!("hardware RNG delivered a value after {} attempts", attempt);
            }
            return RandomResult::Success(word as u16);
        }
    }
    if attempts > 1 {
        debug!("hardware RNG not ready after {} attempts", attempts);
    }
    RandomResult::NotReady
}

#[cfg(target_arch = "x86_64")]
mod arch {
    use core::arch::x86_64::_rdrand64_step;

    #[inline]
    pub(super) fn rand_step() -> Option<u64> {
        let mut val = 0;
        // SAFETY: every supported enclave platform implements RDRAND
        if unsafe { _rdrand64_step(&mut val) } == 1 {
            Some(val)
        } else {
            None
        }
    }
}

#[cfg(target_arch = "x86")]
mod arch {
    use core::arch::x86::_rdrand32_step;

    #[inline]
    pub(super) fn rand_step() -> Option<u64> {
        let mut val = 0;
        // SAFETY: every supported enclave platform implements RDRAND
        if unsafe { _rdrand32_step(&mut val) } == 1 {
            Some(val as u64)
        } else {
            None
        }
    }
}

#[cfg(target_arch = "aarch64")]
mod arch {
    use core::arch::asm;

    #[inline]
    pub(super) fn rand_step() -> Option<u64> {
        let val: u64;
        let ok: u64;
        // RNDR (s3_3_c2_c4_0) clears NZCV on success and sets Z on failure.
        // SAFETY: the target is required to implement FEAT_RNG
        unsafe {
            asm!(
                "mrs {val}, s3_3_c2_c4_0",
                "cset {ok}, ne",
                val = out(reg) val,
                ok = out(reg) ok,
                options(nomem, nostack),
            );
        }
        if ok != 0 {
            Some(val)
        } else {
            None
        }
    }
}
