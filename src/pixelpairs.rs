// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calculate the difference of a pixel pair
//!
//! Given two pixels, the difference between them is the squared
//! distance between the colors that make them up, the classic
//! d(R²) + d(G²) + d(B²).  Alpha never takes part: a transparent
//! pixel is exactly as important as the color underneath it.

use image::Rgba;
use itertools::zip;

/// (Pixel, Pixel) -> squared color distance
///
/// This is the rusty expression of:
///
/// ```text
///        |Δ|² = (Δr)² + (Δg)² + (Δb)²
/// ```
#[inline]
pub fn difference_squared(p1: &Rgba<u8>, p2: &Rgba<u8>) -> f64 {
    zip(&p1.0[..3], &p2.0[..3])
        .map(|(c1, c2)| {
            let d = f64::from(*c1) - f64::from(*c2);
            d * d
        })
        .sum()
}
