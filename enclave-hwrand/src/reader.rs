/* Copyright (c) Fortanix, Inc.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::io::{self, Read};

use log::debug;

use crate::rand::{acquire, Hardware, NotReady, RandStep, RandomResult, RETRY_LIMIT};

/// Fills buffers from the hardware random number generator.
///
/// Every byte is the low 8 bits of its own retrying 16-bit request. Nothing
/// is retained between reads. When the hardware runs dry part way through a
/// buffer the bytes produced so far are reported as a short read; if not a
/// single byte could be produced the read fails with
/// [`io::ErrorKind::WouldBlock`] wrapping [`NotReady`].
#[derive(Copy, Clone, Debug, Default)]
pub struct RandReader;

impl Read for RandReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        fill(&mut Hardware, buf)
    }
}

fn fill<S: RandStep>(source: &mut S, buf: &mut [u8]) -> io::Result<usize> {
    for (i, byte) in buf.iter_mut().enumerate() {
        match acquire(source, RETRY_LIMIT) {
            RandomResult::Success(value) => *byte = value as u8,
            RandomResult::NotReady if i == 0 => return Err(NotReady.into()),
            RandomResult::NotReady => {
                debug!("short random read: {} of {} bytes", i, buf.len());
                return Ok(i);
            }
        }
    }
    Ok(buf.len())
}
