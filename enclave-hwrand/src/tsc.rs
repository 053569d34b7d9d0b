/* Copyright (c) Fortanix, Inc.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use core::fmt::{self, Display, Formatter};

/// Nominal TSC frequency used to turn cycle counts into coarse seconds.
pub const DEFAULT_TSC_FREQ_HZ: u64 = 2_800_000_000;

/// Whether [`read_cycle_counter`] returns real samples on this target.
pub const fn cycle_counter_supported() -> bool {
    cfg!(any(target_arch = "x86", target_arch = "x86_64"))
}

#[inline]
const fn combine_halves(hi: u32, lo: u32) -> u64 {
    ((hi as u64) << 32) | lo as u64
}

/// Reads the time-stamp counter.
///
/// Inside an enclave `RDTSC` is only permitted on SGX2 hardware. Readings
/// have no epoch and are not comparable across cores.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[inline(never)]
pub fn read_cycle_counter() -> u64 {
    let lo: u32;
    let hi: u32;
    // SAFETY: RDTSC only writes EDX:EAX
    unsafe {
        core::arch::asm!(
            "rdtsc",
            out("eax") lo,
            out("edx") hi,
            options(nomem, nostack, preserves_flags),
        );
    }
    combine_halves(hi, lo)
}

/// No cycle counter is accessible on this target; always `0`.
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
#[inline(never)]
pub fn read_cycle_counter() -> u64 {
    0
}

/// A single cycle counter sample.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleReading(u64);

impl CycleReading {
    pub const fn new(cycles: u64) -> Self {
        CycleReading(cycles)
    }

    pub fn now() -> Self {
        CycleReading(read_cycle_counter())
    }

    pub const fn cycles(&self) -> u64 {
        self.0
    }

    /// `false` when the reading is the `0` placeholder of a target without
    /// an accessible counter.
    pub const fn is_supported(&self) -> bool {
        cycle_counter_supported()
    }

    /// Cycles elapsed since `earlier`, wrapping at the 64-bit boundary.
    pub fn cycles_since(&self, earlier: &CycleReading) -> u64 {
        self.0.wrapping_sub(earlier.0)
    }

    pub fn as_secs(&self, freq_hz: u64) -> Option<u64> {
        if !self.is_supported() || freq_hz == 0 {
            return None;
        }
        Some(self.0 / freq_hz)
    }
}

impl From<CycleReading> for u64 {
    fn from(reading: CycleReading) -> u64 {
        reading.0
    }
}

impl Display for CycleReading {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} cycles", self.0)
    }
}

/// Seconds on the cycle counter at [`DEFAULT_TSC_FREQ_HZ`], or `None` when
/// the target has no counter.
pub fn coarse_timestamp() -> Option<u64> {
    CycleReading::now().as_secs(DEFAULT_TSC_FREQ_HZ)
}

#[cfg(test)]
mod tests {
    use super::{combine_halves, CycleReading, DEFAULT_TSC_FREQ_HZ};

    #[test]
    fn halves_are_concatenated_high_to_low() {
        assert_eq!(combine_halves(0x0123_4567, 0x89ab_cdef), 0x0123_4567_89ab_cdef);
        assert_eq!(combine_halves(0, 0xffff_ffff), 0x0000_0000_ffff_ffff);
        assert_eq!(combine_halves(0xffff_ffff, 0), 0xffff_ffff_0000_0000);
        assert_eq!(combine_halves(1, 0), 1 << 32);
    }

    #[test]
    fn elapsed_cycles_wrap() {
        let later = CycleReading::new(5);
        assert_eq!(later.cycles_since(&CycleReading::new(2)), 3);
        assert_eq!(later.cycles_since(&CycleReading::new(u64::MAX)), 6);
    }

    #[test]
    fn display() {
        use std::string::ToString;

        assert_eq!(CycleReading::new(42).to_string(), "42 cycles");
        assert_eq!(u64::from(CycleReading::new(42)), 42);
    }

    #[test]
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn coarse_seconds() {
        let reading = CycleReading::new(5_600_000_001);
        assert!(reading.is_supported());
        assert_eq!(reading.as_secs(DEFAULT_TSC_FREQ_HZ), Some(2));
        assert_eq!(reading.as_secs(1), Some(5_600_000_001));
        assert_eq!(reading.as_secs(0), None);
    }

    #[test]
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn monotonic_on_one_core() {
        let mut last = CycleReading::now();
        for _ in 0..10_000 {
            let now = CycleReading::now();
            assert!(now >= last, "{} went back to {}", last, now);
            last = now;
        }
    }

    #[test]
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn unsupported_reads_zero() {
        for _ in 0..100 {
            assert_eq!(super::read_cycle_counter(), 0);
        }
        let reading = CycleReading::now();
        assert!(!reading.is_supported());
        assert_eq!(reading.as_secs(DEFAULT_TSC_FREQ_HZ), None);
        assert_eq!(super::coarse_timestamp(), None);
    }
}
