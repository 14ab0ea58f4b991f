// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A vertical seam: one column per row, top to bottom.
//!
//! Both storage strategies consume the same value.  The contiguous
//! store uses the columns directly; the lattice uses them only as
//! offsets from the nodes it walks to, never as stored addresses.

use crate::error::{CarveError, Result};
use std::ops::Index;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seam(Vec<u32>);

impl Seam {
    pub fn new(columns: Vec<u32>) -> Self {
        Seam(columns)
    }

    /// The number of rows the seam crosses.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> &[u32] {
        &self.0
    }

    /// (row, column) pairs, top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().enumerate().map(|(y, x)| (y as u32, *x))
    }

    /// Does this seam fit a width × height image, and can it be removed
    /// from it?  One column per row, every column in bounds, no step of
    /// more than one column between rows, and at least one column left
    /// over afterwards.
    pub fn validate(&self, width: u32, height: u32) -> Result<()> {
        if width <= 1 {
            return Err(CarveError::InvalidSeamCount {
                requested: 1,
                width,
            });
        }
        if self.0.len() != height as usize {
            return Err(CarveError::InvalidSeam {
                reason: format!("{} rows in a seam for an image {} high", self.0.len(), height),
            });
        }
        if let Some((y, x)) = self.iter().find(|(_, x)| *x >= width) {
            return Err(CarveError::InvalidSeam {
                reason: format!("column {} in row {} is outside a width of {}", x, y, width),
            });
        }
        if let Some(y) = self
            .0
            .windows(2)
            .position(|pair| (i64::from(pair[0]) - i64::from(pair[1])).abs() > 1)
        {
            return Err(CarveError::InvalidSeam {
                reason: format!("rows {} and {} are not connected", y, y + 1),
            });
        }
        Ok(())
    }
}

impl Index<usize> for Seam {
    type Output = u32;

    fn index(&self, y: usize) -> &u32 {
        &self.0[y]
    }
}
