// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Forward energy seam search
//!
//! Avidan & Shamir's "forward energy" variant: rather than charging a
//! seam for the energy it removes, charge it for the energy it
//! *introduces* when the gap closes and two pixels that were never
//! neighbours become neighbours.
//!
//! Seen from the pixel (x, y) above, the three ways down are:
//!
//!   to (x−1,y+1): D[(x+1,y), (x−1,y+1)]     (x must be interior)
//!   to (x,  y+1): e(x,y+1)
//!   to (x+1,y+1): D[(x−1,y), (x+1,y+1)]     (x must be interior)
//!
//! where D is the squared RGB distance.  A diagonal step out of an
//! edge pixel would need a neighbour that isn't there, so it is never
//! taken.  The top row costs nothing.
//!
//! The search is naturally written as a push from each pixel into the
//! row below.  Here it is written as the equivalent pull, so that any
//! one cell can be recomputed on its own: the target (x, y) hears from
//! x−1 (stepping right), then x (straight), then x+1 (stepping left),
//! and only a strictly cheaper offer displaces the one it holds.

use crate::cq;
use crate::pixelpairs::difference_squared;
use crate::twodmap::{CostAndBackPointer, CostGrid, EnergyGrid};
use image::{GenericImageView, Rgba};

/// An offer from a pixel in the row above: its accumulated cost, and
/// the cost of the step down.
pub type Offer = (f64, f64);

#[inline]
pub fn cost_of_first_row() -> CostAndBackPointer {
    CostAndBackPointer::new(0.0, 0)
}

/// The step from the pixel above-left into this one.  `far_left` is
/// the pixel two columns to the left in the row above, which becomes
/// this pixel's neighbour once the above-left pixel is gone.
#[inline]
pub fn step_right(far_left: &Rgba<u8>, here: &Rgba<u8>) -> f64 {
    difference_squared(far_left, here)
}

/// The mirror of `step_right`.
#[inline]
pub fn step_left(far_right: &Rgba<u8>, here: &Rgba<u8>) -> f64 {
    difference_squared(far_right, here)
}

/// Given a pixel *not* in the first row, and the offers from the up to
/// three pixels above it, return the cheapest and which parent made it.
#[inline]
pub fn cost_candidate(
    from_above_left: Option<Offer>,
    from_above: Offer,
    from_above_right: Option<Offer>,
) -> CostAndBackPointer {
    let offers = [
        (-1i8, from_above_left),
        (0i8, Some(from_above)),
        (1i8, from_above_right),
    ];
    let mut current: Option<CostAndBackPointer> = None;
    for (parent, offer) in offers.iter() {
        if let Some((cost, step)) = offer {
            let candidate = cost + step;
            if current.map_or(true, |c| candidate < c.cost) {
                current = Some(CostAndBackPointer::new(candidate, *parent));
            }
        }
    }
    // The straight offer is always present.
    current.unwrap_or_else(|| CostAndBackPointer::new(from_above.0 + from_above.1, 0))
}

/// Build the whole forward cost digraph.  The energy grid must be
/// current for the image; it supplies the cost of straight steps.
pub fn calculate_cost<I>(image: &I, energy: &EnergyGrid) -> CostGrid
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    let mut target = CostGrid::new(width, height);

    for x in 0..width {
        target[(x, 0)] = cost_of_first_row();
    }

    for y in 1..height {
        for x in 0..width {
            let here = image.get_pixel(x, y);
            let above = |x: u32| target[(x, y - 1)].cost;
            let cell = cost_candidate(
                cq!(
                    x >= 2,
                    Some((above(x - 1), step_right(&image.get_pixel(x - 2, y - 1), &here))),
                    None
                ),
                (above(x), energy[(x, y)]),
                cq!(
                    x + 2 < width,
                    Some((above(x + 1), step_left(&image.get_pixel(x + 2, y - 1), &here))),
                    None
                ),
            );
            target[(x, y)] = cell;
        }
    }
    target
}
