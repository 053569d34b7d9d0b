/* Copyright (c) Fortanix, Inc.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::rand::RandStep;

/// Fails `failures` times, then returns `value` on every query.
pub struct Scripted {
    pub failures: u32,
    pub value: u64,
    pub calls: u32,
}

impl Scripted {
    pub fn failing_then(failures: u32, value: u64) -> Self {
        Scripted { failures, value, calls: 0 }
    }
}

impl RandStep for Scripted {
    fn step(&mut self) -> Option<u64> {
        self.calls += 1;
        if self.calls > self.failures {
            Some(self.value)
        } else {
            None
        }
    }
}

#[derive(Default)]
pub struct AlwaysFails {
    pub calls: u32,
}

impl RandStep for AlwaysFails {
    fn step(&mut self) -> Option<u64> {
        self.calls += 1;
        None
    }
}

/// Hands out `words` in order, then fails forever.
pub struct Sequence<'a> {
    pub words: &'a [u64],
    pub calls: u32,
}

impl<'a> Sequence<'a> {
    pub fn new(words: &'a [u64]) -> Self {
        Sequence { words, calls: 0 }
    }
}

impl RandStep for Sequence<'_> {
    fn step(&mut self) -> Option<u64> {
        let word = self.words.get(self.calls as usize).copied();
        self.calls += 1;
        word
    }
}
