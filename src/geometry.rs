//! Sub-aperture window geometry and wrap-around bookkeeping
//!
//! Derives, from (N, L, pitch), the ordered window coordinates, the per-pixel
//! coverage counts used for energy normalization, and the wrap-aware block
//! copies shared by every stage:
//!
//! - `extract` reads an L×L window from the N-periodic spectrum
//! - `write_back` overwrites a window footprint (projection stage)
//! - `accumulate` sums into a window footprint (gradient stage)
//!
//! All three go through one per-axis `wrap_split` so the fits / crosses-x /
//! crosses-y / crosses-both cases never branch separately.

use snafu::prelude::*;

use crate::grid::Grid;

#[derive(Debug, Snafu)]
pub enum GeometryError {
    #[snafu(display("pitch {pitch} does not divide image size {n}"))]
    PitchNotDivisor { n: usize, pitch: usize },

    #[snafu(display("window size {l} exceeds image size {n}"))]
    WindowTooLarge { n: usize, l: usize },

    #[snafu(display("pixel ({row}, {col}) is covered by no window"))]
    UncoveredPixel { row: usize, col: usize },
}

/// One contiguous piece of a wrapped axis range.
///
/// `grid` is the start position on the N-periodic axis, `win` the matching
/// offset inside the window, `len` the piece length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub grid: usize,
    pub win: usize,
    pub len: usize,
}

/// Split `[start, start+len)` taken modulo `modulus` into contiguous pieces.
///
/// `start` must lie in `[0, modulus)` and `len <= modulus`, so at most one
/// wrap occurs and at most two pieces come back.
pub fn wrap_split(start: usize, len: usize, modulus: usize) -> Vec<Span> {
    debug_assert!(start < modulus);
    debug_assert!(len <= modulus);

    let first = len.min(modulus - start);
    let mut spans = vec![Span {
        grid: start,
        win: 0,
        len: first,
    }];
    if first < len {
        spans.push(Span {
            grid: 0,
            win: first,
            len: len - first,
        });
    }
    spans
}

/// Window coordinates and coverage counts for one (N, L, pitch) configuration.
///
/// Immutable after construction; both solver stages and the synthesizer share
/// one instance.
#[derive(Debug, Clone)]
pub struct WindowGeometry {
    n: usize,
    l: usize,
    coords: Vec<(usize, usize)>,
    counts: Vec<u32>,
}

impl WindowGeometry {
    pub fn new(n: usize, l: usize, pitch: usize) -> Result<Self, GeometryError> {
        if pitch == 0 || n % pitch != 0 {
            return PitchNotDivisorSnafu { n, pitch }.fail();
        }
        if l > n {
            return WindowTooLargeSnafu { n, l }.fail();
        }

        let per_axis = n / pitch;
        let mut coords = Vec::with_capacity(per_axis * per_axis);
        for r in 0..per_axis {
            for c in 0..per_axis {
                coords.push((r * pitch, c * pitch));
            }
        }

        let counts = Self::coverage_counts(n, l, &coords);
        for (i, &count) in counts.iter().enumerate() {
            if count == 0 {
                return UncoveredPixelSnafu {
                    row: i / n,
                    col: i % n,
                }
                .fail();
            }
        }

        Ok(Self {
            n,
            l,
            coords,
            counts,
        })
    }

    /// Stamp every footprint onto a virtual 2N×2N grid, then fold the four
    /// N×N quadrants together. Footprints never reach past 2N because L <= N.
    fn coverage_counts(n: usize, l: usize, coords: &[(usize, usize)]) -> Vec<u32> {
        let two_n = 2 * n;
        let mut tiled = vec![0u32; two_n * two_n];
        for &(r0, c0) in coords {
            for r in r0..r0 + l {
                for c in c0..c0 + l {
                    tiled[r * two_n + c] += 1;
                }
            }
        }

        let mut counts = vec![0u32; n * n];
        for r in 0..two_n {
            for c in 0..two_n {
                counts[(r % n) * n + (c % n)] += tiled[r * two_n + c];
            }
        }
        counts
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Window top-left coordinates in row-major default order.
    pub fn coords(&self) -> &[(usize, usize)] {
        &self.coords
    }

    pub fn total_frames(&self) -> usize {
        self.coords.len()
    }

    /// Coverage count at one pixel (always >= 1 for a valid geometry).
    pub fn count_at(&self, row: usize, col: usize) -> u32 {
        self.counts[row * self.n + col]
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Read the L×L window at `coord` from the periodic spectrum.
    pub fn extract(&self, spectrum: &Grid, coord: (usize, usize)) -> Grid {
        debug_assert_eq!(spectrum.side(), self.n);
        let mut window = Grid::zeros(self.l);
        for rs in wrap_split(coord.0, self.l, self.n) {
            for cs in wrap_split(coord.1, self.l, self.n) {
                for i in 0..rs.len {
                    for j in 0..cs.len {
                        window.set(
                            rs.win + i,
                            cs.win + j,
                            spectrum.at(rs.grid + i, cs.grid + j),
                        );
                    }
                }
            }
        }
        window
    }

    /// Overwrite the window footprint at `coord` with `block`.
    pub fn write_back(&self, spectrum: &mut Grid, coord: (usize, usize), block: &Grid) {
        debug_assert_eq!(spectrum.side(), self.n);
        debug_assert_eq!(block.side(), self.l);
        for rs in wrap_split(coord.0, self.l, self.n) {
            for cs in wrap_split(coord.1, self.l, self.n) {
                for i in 0..rs.len {
                    for j in 0..cs.len {
                        spectrum.set(rs.grid + i, cs.grid + j, block.at(rs.win + i, cs.win + j));
                    }
                }
            }
        }
    }

    /// Sum `block` into the window footprint at `coord`.
    ///
    /// Overlapping windows add their contributions; the caller divides by the
    /// coverage counts afterwards.
    pub fn accumulate(&self, accumulator: &mut Grid, coord: (usize, usize), block: &Grid) {
        debug_assert_eq!(accumulator.side(), self.n);
        debug_assert_eq!(block.side(), self.l);
        for rs in wrap_split(coord.0, self.l, self.n) {
            for cs in wrap_split(coord.1, self.l, self.n) {
                for i in 0..rs.len {
                    for j in 0..cs.len {
                        let prev = accumulator.at(rs.grid + i, cs.grid + j);
                        accumulator.set(
                            rs.grid + i,
                            cs.grid + j,
                            prev + block.at(rs.win + i, cs.win + j),
                        );
                    }
                }
            }
        }
    }
}
