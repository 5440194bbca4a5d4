/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Bin-packing placers compared by the Monte-Carlo study.
//!
//! Grounded in `original_source/bin_packing.py`: a fixed number of [`Bin`]s,
//! each accumulating a running `cap`, and two placement strategies —
//! [`Worstfit`] always places into the least-loaded bin, [`NextfitCond`]
//! advances a remembered cursor and only accepts a bin whose cap is not
//! lower than the one the cursor started at. Shares no code with the
//! scheduler core; load here is a continuous `f64`, not a cycle count.

/// A single bin accumulating placed load.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bin {
    pub cap: f64,
}

impl Bin {
    fn place(&mut self, item: f64) {
        self.cap += item;
    }
}

/// A bin-packing placement strategy under comparison.
///
/// `total_step` counts however many bins the strategy inspected while
/// deciding where to place an item — `Worstfit` always scans every bin,
/// `NextfitCond` scans however many the cursor walks past before accepting.
pub trait Placer {
    fn place(&mut self, item: f64);
    fn bins(&self) -> &[Bin];
    fn total_step(&self) -> u64;
}

/// Always places into the bin with the lowest current `cap`, scanning every
/// bin on every placement.
#[derive(Debug, Clone)]
pub struct Worstfit {
    bins: Vec<Bin>,
    total_step: u64,
}

impl Worstfit {
    pub fn new(nbr_bin: usize) -> Self {
        Self {
            bins: vec![Bin::default(); nbr_bin],
            total_step: 0,
        }
    }
}

impl Placer for Worstfit {
    fn place(&mut self, item: f64) {
        let (idx, _) = self
            .bins
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cap.partial_cmp(&b.cap).expect("load is never NaN"))
            .expect("at least one bin");
        self.total_step += self.bins.len() as u64;
        self.bins[idx].place(item);
    }

    fn bins(&self) -> &[Bin] {
        &self.bins
    }

    fn total_step(&self) -> u64 {
        self.total_step
    }
}

/// Next-fit with a conditional acceptance test: starting just past a
/// remembered cursor, keeps advancing circularly while the visited bin is
/// more loaded than the cursor's bin was, then places into the first bin
/// that is not (and updates the cursor to it).
#[derive(Debug, Clone)]
pub struct NextfitCond {
    bins: Vec<Bin>,
    total_step: u64,
    prev_bin_i: usize,
}

impl NextfitCond {
    pub fn new(nbr_bin: usize) -> Self {
        Self {
            bins: vec![Bin::default(); nbr_bin],
            total_step: 0,
            prev_bin_i: 0,
        }
    }
}

impl Placer for NextfitCond {
    fn place(&mut self, item: f64) {
        let n = self.bins.len();
        let mut bin_i = (self.prev_bin_i + 1) % n;
        self.total_step += 1;

        while self.bins[self.prev_bin_i].cap < self.bins[bin_i].cap {
            bin_i = (bin_i + 1) % n;
            self.total_step += 1;
        }

        self.prev_bin_i = bin_i;
        self.bins[bin_i].place(item);
    }

    fn bins(&self) -> &[Bin] {
        &self.bins
    }

    fn total_step(&self) -> u64 {
        self.total_step
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worstfit_always_targets_the_least_loaded_bin() {
        let mut p = Worstfit::new(3);
        p.place(10.0); // bin0 = 10
        p.place(1.0); // bin1 is tied-lowest (0.0 vs bin2 0.0): picks first, bin1 = 1
        p.place(5.0); // lowest is bin2 (0.0)
        assert_eq!(p.bins()[2].cap, 5.0);
        assert_eq!(p.total_step(), 9); // 3 bins scanned per placement, 3 placements
    }

    #[test]
    fn nextfitcond_accepts_first_bin_not_lower_than_cursor() {
        let mut p = NextfitCond::new(4);
        // all bins start at 0.0: cursor=0, candidate bin1 (0.0) is not < bin0
        // (0.0), so it's accepted immediately.
        p.place(1.0);
        assert_eq!(p.bins()[1].cap, 1.0);
        assert_eq!(p.total_step(), 1);
    }

    #[test]
    fn nextfitcond_skips_bins_more_loaded_than_the_cursor() {
        let mut p = NextfitCond::new(3);
        p.bins = vec![Bin { cap: 1.0 }, Bin { cap: 5.0 }, Bin { cap: 1.0 }];
        // cursor at bin0 (1.0): bin1 (5.0) is more loaded, skip; bin2 (1.0) is
        // not more loaded than the cursor, accept.
        p.place(2.0);
        assert_eq!(p.bins()[2].cap, 3.0);
        assert_eq!(p.total_step(), 2);
    }

    #[test]
    fn cursor_advances_after_each_placement() {
        let mut p = NextfitCond::new(4);
        p.place(1.0); // accepts bin1 (cursor was 0, both caps 0.0): cursor -> 1
        p.place(1.0); // bin1's cap (1.0) < bin2's cap (0.0) is false: accept bin2 immediately
        assert_eq!(p.prev_bin_i, 2);
        assert_eq!(p.bins()[2].cap, 1.0);
    }
}
