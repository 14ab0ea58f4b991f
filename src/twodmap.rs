// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::error::{CarveError, Result};
use std::ops::{Index, IndexMut};

/// Defines the basic two-dimensional map: An addressable field
/// containing one of several possible objects during processing: an
/// `f64` for the energy grid, or a cost + back-pointer for the seam
/// digraph.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoDimensionalMap<P: Default + Copy> {
    width: u32,
    height: u32,
    data: Vec<P>,
}

impl<P: Default + Copy> TwoDimensionalMap<P> {
    /// Define a new map filled with the content type's default.
    pub fn new(width: u32, height: u32) -> Self {
        TwoDimensionalMap {
            width,
            height,
            data: vec![P::default(); width as usize * height as usize],
        }
    }

    /// Wrap an existing row-major vector.  Fails if the vector isn't
    /// exactly width × height long.
    pub fn from_vec(width: u32, height: u32, data: Vec<P>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(CarveError::InvalidBuffer {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(TwoDimensionalMap {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    // Absolutely, the number one name of this game is keep the index
    // math in a singular location and never, ever mess with it.  This
    // particular variant is the same one used in image.rs.
    fn get_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// One row, left to right.
    pub fn row(&self, y: u32) -> &[P] {
        let start = self.get_index(0, y);
        &self.data[start..start + self.width as usize]
    }

    /// The whole map, row-major.
    pub fn as_slice(&self) -> &[P] {
        &self.data
    }
}

impl<P: Default + Copy> Index<(u32, u32)> for TwoDimensionalMap<P> {
    type Output = P;

    /// A convenience addressing mode for getting values.
    fn index(&self, (x, y): (u32, u32)) -> &P {
        let index = self.get_index(x, y);
        &self.data[index]
    }
}

impl<P: Default + Copy> IndexMut<(u32, u32)> for TwoDimensionalMap<P> {
    /// A convenience addressing mode for setting values.
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut P {
        let index = self.get_index(x, y);
        &mut self.data[index]
    }
}

/// One cell of the seam digraph: the cheapest accumulated cost of
/// reaching this pixel from the top row, and which of the three
/// pixels above it got us here.  The parent is stored as an offset
/// (-1, 0, +1) from this cell's own column, never as a column number,
/// so it survives the columns to its right being renumbered.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct CostAndBackPointer {
    pub cost: f64,
    pub parent: i8,
}

impl CostAndBackPointer {
    pub fn new(cost: f64, parent: i8) -> Self {
        CostAndBackPointer { cost, parent }
    }

    /// The column of the parent, given this cell's own column.
    pub fn parent_of(&self, x: u32) -> u32 {
        (i64::from(x) + i64::from(self.parent)) as u32
    }
}

pub type EnergyGrid = TwoDimensionalMap<f64>;
pub type CostGrid = TwoDimensionalMap<CostAndBackPointer>;
