// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Choosing seams
//!
//! The two accounting policies, the trait every seam source
//! implements, and the from-scratch grid search that recomputes the
//! energy and cost of the whole image every time it is asked.

use crate::backward;
use crate::energy::calculate_energy;
use crate::error::CarveError;
use crate::forward;
use crate::seam::Seam;
use crate::twodmap::{CostGrid, EnergyGrid};
use image::{GenericImageView, Rgba};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// How a seam is charged for the pixels it takes with it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchPolicy {
    /// Only the energy of the pixels removed.
    Backward,
    /// The energy introduced by the pixels that become neighbours.
    Forward,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        SearchPolicy::Forward
    }
}

impl FromStr for SearchPolicy {
    type Err = CarveError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "backward" => Ok(SearchPolicy::Backward),
            "forward" => Ok(SearchPolicy::Forward),
            _ => Err(CarveError::UnsupportedPolicy {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for SearchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SearchPolicy::Backward => write!(f, "backward"),
            SearchPolicy::Forward => write!(f, "forward"),
        }
    }
}

/// This trait defines how we will get seams out of an image.  It's a
/// primitive interface, just enough to make room for both the
/// from-scratch search and the cached lattice.
pub trait SeamFinder {
    /// The current minimum-cost top-to-bottom seam.
    fn find_vertical_seam(&self) -> Seam;
}

/// The column at which the cheapest seam ends: the first minimum in a
/// left-to-right scan of the bottom row.
pub(crate) fn cheapest_endpoint<I>(costs: I) -> Option<(u32, f64)>
where
    I: IntoIterator<Item = f64>,
{
    costs
        .into_iter()
        .enumerate()
        .map(|(x, c)| (x as u32, c))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
}

/// Given a cost digraph, find the cheapest bottom endpoint and follow
/// its back-pointers to the top.
pub fn cost_to_seam(cost: &CostGrid) -> Seam {
    let height = cost.height();
    let mut seam_col = cheapest_endpoint(cost.row(height - 1).iter().map(|c| c.cost))
        .map_or(0, |(x, _)| x);
    // Working backwards, generate a vec of x coordinates that map to
    // the seam, reverse and return.
    let mut columns: Vec<u32> = (0..height)
        .rev()
        .fold(Vec::with_capacity(height as usize), |mut acc, y| {
            acc.push(seam_col);
            seam_col = cost[(seam_col, y)].parent_of(seam_col);
            acc
        });
    columns.reverse();
    Seam::new(columns)
}

/// Energy and cost for the whole image, from scratch.
pub fn calculate_cost<I>(image: &I, energy: &EnergyGrid, policy: SearchPolicy) -> CostGrid
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    match policy {
        SearchPolicy::Backward => backward::calculate_cost(energy),
        SearchPolicy::Forward => forward::calculate_cost(image, energy),
    }
}

/// The basic seam source: a reference to the image, and the policy.
/// Nothing is cached; every request recomputes the energy grid and
/// the cost digraph.
pub struct GridSearch<'a, I>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    pub image: &'a I,
    pub policy: SearchPolicy,
}

impl<'a, I> GridSearch<'a, I>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    pub fn new(image: &'a I, policy: SearchPolicy) -> Self {
        GridSearch { image, policy }
    }

    pub fn energy(&self) -> EnergyGrid {
        calculate_energy(self.image)
    }

    pub fn cost(&self) -> CostGrid {
        calculate_cost(self.image, &self.energy(), self.policy)
    }
}

impl<'a, I> SeamFinder for GridSearch<'a, I>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    fn find_vertical_seam(&self) -> Seam {
        cost_to_seam(&self.cost())
    }
}
