//! # Output — Decimal Formatting and the Ordered Print Sink
//!
//! Print mode must produce one strictly increasing stream no matter how
//! many workers sieve, so each segment renders its primes into a private
//! byte buffer and hands it to an [`OrderedSink`]: a slot per chunk plus
//! a cursor that only ever moves forward. Whoever submits the chunk the
//! cursor is waiting on also flushes every consecutive ready slot.
//!
//! A worker running far ahead of the cursor parks on a condvar until the
//! gap shrinks, which bounds how much rendered output can pile up while
//! never blocking the worker that owns the cursor chunk.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Condvar, Mutex};

/// Suggested capacity for the stdout writer in print mode.
pub const STDOUT_BUFFER: usize = 64 * 1024;

/// Append `value` in decimal plus a newline. Digits are produced into a
/// stack scratch and copied once; u64::MAX needs 20 of them.
pub fn push_decimal(buf: &mut Vec<u8>, value: u64) {
    let mut scratch = [0u8; 20];
    let mut pos = scratch.len();
    let mut v = value;
    loop {
        pos -= 1;
        scratch[pos] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    buf.extend_from_slice(&scratch[pos..]);
    buf.push(b'\n');
}

struct Slots<W> {
    cursor: u64,
    pending: BTreeMap<u64, Vec<u8>>,
    writer: W,
    failed: bool,
}

/// Order-preserving gather point for per-chunk output buffers.
pub struct OrderedSink<W: Write> {
    shared: Mutex<Slots<W>>,
    turn: Condvar,
    window: u64,
}

impl<W: Write> OrderedSink<W> {
    /// `window` is how many chunks a submitter may run ahead of the
    /// cursor before it parks.
    pub fn new(writer: W, window: u64) -> Self {
        OrderedSink {
            shared: Mutex::new(Slots {
                cursor: 0,
                pending: BTreeMap::new(),
                writer,
                failed: false,
            }),
            turn: Condvar::new(),
            window,
        }
    }

    /// Deposit one chunk's rendered output. Blocks while the chunk is
    /// more than `window` ahead of the cursor; flushes every consecutive
    /// ready chunk before returning. After a write failure (or an
    /// `abort`) all submissions fail fast and buffers are dropped.
    pub fn submit(&self, chunk_id: u64, bytes: Vec<u8>) -> io::Result<()> {
        let mut slots = self.shared.lock().unwrap();
        while !slots.failed && chunk_id > slots.cursor + self.window {
            slots = self.turn.wait(slots).unwrap();
        }
        if slots.failed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "ordered output sink was shut down",
            ));
        }

        slots.pending.insert(chunk_id, bytes);
        let mut advanced = false;
        loop {
            let next = slots.cursor;
            let Some(ready) = slots.pending.remove(&next) else {
                break;
            };
            if let Err(err) = slots.writer.write_all(&ready) {
                slots.failed = true;
                slots.pending.clear();
                self.turn.notify_all();
                return Err(err);
            }
            slots.cursor += 1;
            advanced = true;
        }
        if advanced {
            self.turn.notify_all();
        }
        Ok(())
    }

    /// Poison the sink: pending buffers are dropped and every parked or
    /// future submitter gets an error. Used when a worker dies for a
    /// reason other than a sink write.
    pub fn abort(&self) {
        let mut slots = self.shared.lock().unwrap();
        slots.failed = true;
        slots.pending.clear();
        self.turn.notify_all();
    }

    /// Flush the underlying writer once all chunks are in.
    pub fn finish(self) -> io::Result<()> {
        let mut slots = self.shared.into_inner().unwrap();
        if slots.failed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "ordered output sink was shut down",
            ));
        }
        debug_assert!(slots.pending.is_empty());
        slots.writer.flush()
    }
}
