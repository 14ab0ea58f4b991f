// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Backward energy seam search
//!
//! The original Avidan & Shamir (2007) accumulation: the cost of a seam
//! is the energy of the pixels it passes through, and nothing else.
//!
//! ```text
//!           ⎧ M(x,y−1)
//! M(x,y)=min⎨ M(x−1,y−1)   + e(x,y)
//!           ⎩ M(x+1,y−1)
//! ```
//!
//! with M(x,0) = e(x,0).  Candidates are tried straight-up, then left,
//! then right, and only a strictly smaller total displaces the one
//! already held, so ties go up first and then left.

use crate::cq;
use crate::twodmap::{CostAndBackPointer, CostGrid, EnergyGrid};

/// The top row of the digraph: each pixel costs its own energy.
#[inline]
pub fn cost_of_first_row(energy: f64) -> CostAndBackPointer {
    CostAndBackPointer::new(energy, 0)
}

/// Given a pixel *not* in the first row, its energy and the
/// accumulated costs of the (up to) three pixels above it, return the
/// cheapest way of reaching it and which parent that was.
#[inline]
pub fn cost_candidate(
    energy: f64,
    above_left: Option<f64>,
    above: f64,
    above_right: Option<f64>,
) -> CostAndBackPointer {
    let mut current = CostAndBackPointer::new(above + energy, 0);
    for (parent, cost) in [(-1i8, above_left), (1i8, above_right)].iter() {
        if let Some(cost) = cost {
            let candidate = cost + energy;
            if candidate < current.cost {
                current = CostAndBackPointer::new(candidate, *parent);
            }
        }
    }
    current
}

/// Build the whole cost digraph for an energy grid, top to bottom.
pub fn calculate_cost(energy: &EnergyGrid) -> CostGrid {
    let (width, height) = energy.dimensions();
    let mut target = CostGrid::new(width, height);

    for x in 0..width {
        target[(x, 0)] = cost_of_first_row(energy[(x, 0)]);
    }

    let maxwidth = width - 1;
    for y in 1..height {
        for x in 0..width {
            target[(x, y)] = cost_candidate(
                energy[(x, y)],
                cq!(x == 0, None, Some(target[(x - 1, y - 1)].cost)),
                target[(x, y - 1)].cost,
                cq!(x == maxwidth, None, Some(target[(x + 1, y - 1)].cost)),
            );
        }
    }
    target
}
