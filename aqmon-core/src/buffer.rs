//! Fixed-Size Smoothing Buffers Shared Between Cycles
//!
//! ## Overview
//!
//! The sampling cycle appends a fresh CO and PM2.5 reading every 200 ms; the
//! reporting cycle reads the mean of the last few readings once a second.
//! These buffers are the only state the two cycles share, so they are built
//! to be written by one producer and read by any number of readers without a
//! lock.
//!
//! ## Layout
//!
//! ```text
//! SampleBuffer<5>
//! ┌──────┬──────┬──────┬──────┬──────┐
//! │  s0  │  s1  │  s2  │  s3  │  s4  │  AtomicU32 slots holding f32 bits
//! └──────┴──────┴──────┴──────┴──────┘
//! state: AtomicU32 = cursor << 16 | len
//! ```
//!
//! An append stores the slot first and then publishes the new cursor and
//! count in a single `Release` store. A reader loads the state once with
//! `Acquire` and averages exactly `len` slots, so it never includes a slot
//! that was not written yet. A slot overwritten while the average is being
//! summed contributes either its old or its new value, never a mix of the
//! two.
//!
//! Only loads and stores are used, no read-modify-write, so the buffers also
//! work on cores without atomic CAS (ESP32-C3, `riscv32imc`).
//!
//! ## Usage Example
//!
//! ```rust
//! use aqmon_core::buffer::SampleBuffer;
//!
//! let buffer: SampleBuffer<3> = SampleBuffer::new();
//! for value in [1.0, 2.0, 3.0, 4.0] {
//!     buffer.push(value);
//! }
//!
//! // The oldest reading (1.0) was overwritten
//! assert_eq!(buffer.len(), 3);
//! assert_eq!(buffer.average(), 3.0);
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use heapless::Vec;

use crate::constants::buffers::SMOOTHING_WINDOW;

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: AtomicU32 = AtomicU32::new(0);

const LEN_MASK: u32 = 0xFFFF;
const CURSOR_SHIFT: u32 = 16;

fn pack(cursor: usize, len: usize) -> u32 {
    ((cursor as u32) << CURSOR_SHIFT) | (len as u32 & LEN_MASK)
}

fn unpack(state: u32) -> (usize, usize) {
    ((state >> CURSOR_SHIFT) as usize, (state & LEN_MASK) as usize)
}

/// Fixed-capacity circular buffer of `f32` samples with a running mean
///
/// ## Internal Invariants
///
/// - `cursor < N` (next write position is always valid)
/// - `len <= N` (saturates at capacity, never wraps)
/// - while `len < N`, the valid samples are exactly slots `0..len`
///
/// ## Thread Safety
///
/// Any number of readers may call [`average`](Self::average) concurrently
/// with one writer calling [`push`](Self::push). Two concurrent writers do
/// not corrupt memory but may lose samples; the monitor only ever has one.
pub struct SampleBuffer<const N: usize> {
    slots: [AtomicU32; N],
    state: AtomicU32,
}

impl<const N: usize> SampleBuffer<N> {
    const CAPACITY_FITS: () = assert!(N > 0 && N <= LEN_MASK as usize, "capacity must be 1..=65535");

    /// Creates a new empty buffer
    ///
    /// This is a const function, so buffers can live in statics:
    /// ```rust
    /// use aqmon_core::buffer::SampleBuffer;
    /// static CO_WINDOW: SampleBuffer<5> = SampleBuffer::new();
    /// ```
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_FITS;

        Self {
            slots: [EMPTY_SLOT; N],
            state: AtomicU32::new(0),
        }
    }

    /// Appends a sample, overwriting the oldest once full
    pub fn push(&self, value: f32) {
        let (cursor, len) = unpack(self.state.load(Ordering::Relaxed));

        self.slots[cursor].store(value.to_bits(), Ordering::Relaxed);

        let next = (cursor + 1) % N;
        let len = if len < N { len + 1 } else { len };
        self.state.store(pack(next, len), Ordering::Release);
    }

    /// Arithmetic mean of the valid samples, `0.0` when empty
    ///
    /// Callers that make decisions on the mean should check
    /// [`is_empty`](Self::is_empty) first; the zero is only a safe default.
    pub fn average(&self) -> f32 {
        let (_, len) = unpack(self.state.load(Ordering::Acquire));
        if len == 0 {
            return 0.0;
        }

        let sum: f32 = self.slots[..len]
            .iter()
            .map(|slot| f32::from_bits(slot.load(Ordering::Relaxed)))
            .sum();

        sum / len as f32
    }

    /// Number of valid samples
    pub fn len(&self) -> usize {
        unpack(self.state.load(Ordering::Acquire)).1
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Maximum number of samples held
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Snapshot of the valid samples, oldest first
    pub fn values(&self) -> Vec<f32, N> {
        let (cursor, len) = unpack(self.state.load(Ordering::Acquire));
        // Not full yet: data starts at 0. Full: the oldest sits at the cursor.
        let start = if len < N { 0 } else { cursor };

        (0..len)
            .map(|offset| f32::from_bits(self.slots[(start + offset) % N].load(Ordering::Relaxed)))
            .collect()
    }

    /// Forget all samples
    pub fn clear(&self) {
        self.state.store(0, Ordering::Release);
    }
}

impl<const N: usize> Default for SampleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for SampleBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("values", &self.values())
            .finish()
    }
}

/// Single `f32` cell written by one cycle and read by another
#[derive(Debug)]
pub struct LatestValue(AtomicU32);

impl LatestValue {
    /// Cell holding `0.0` (all bits clear)
    pub const fn zero() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Replace the stored value
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }

    /// Most recently stored value
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }
}

impl Default for LatestValue {
    fn default() -> Self {
        Self::zero()
    }
}

/// Everything the sampling cycle hands to the reporting cycle
///
/// Written only by the sampler, read only by the reporter.
#[derive(Debug, Default)]
pub struct Samples {
    /// Recent CO concentrations (ppm)
    pub co: SampleBuffer<SMOOTHING_WINDOW>,
    /// Recent PM2.5 densities (µg/m³)
    pub pm25: SampleBuffer<SMOOTHING_WINDOW>,
    ratio: LatestValue,
}

impl Samples {
    /// Empty windows, ratio 0
    pub const fn new() -> Self {
        Self {
            co: SampleBuffer::new(),
            pm25: SampleBuffer::new(),
            ratio: LatestValue::zero(),
        }
    }

    /// Store the CO reading and the Rs/R0 ratio measured with it
    pub fn record_co(&self, ppm: f32, ratio: f32) {
        self.ratio.set(ratio);
        self.co.push(ppm);
    }

    /// Store a PM2.5 reading
    pub fn record_pm25(&self, density: f32) {
        self.pm25.push(density);
    }

    /// Rs/R0 from the most recent CO measurement
    pub fn latest_ratio(&self) -> f32 {
        self.ratio.get()
    }
}
