// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Removing seams
//!
//! Both storage strategies take the same `Seam` and come out one
//! column narrower.  The contiguous one rebuilds the whole buffer; the
//! lattice splices one node out of each row.

use crate::cq;
use crate::error::Result;
use crate::lattice::Lattice;
use crate::seam::Seam;
use image::{ImageBuffer, RgbaImage};

pub trait SeamRemover {
    /// Delete the seam's pixel from every row and close the gap.  On
    /// error the image is untouched.
    fn remove_seam(&mut self, seam: &Seam) -> Result<()>;
}

// Every pixel left of the seam stays put; every pixel right of it
// moves one to the left.  Read the other way: column x of the new
// image comes from column x, or x + 1 once we're past the seam.
fn remove_vertical_seam(image: &RgbaImage, seam: &Seam) -> Result<RgbaImage> {
    let (width, height) = image.dimensions();
    seam.validate(width, height)?;
    Ok(ImageBuffer::from_fn(width - 1, height, |x, y| {
        *image.get_pixel(cq!(x < seam[y as usize], x, x + 1), y)
    }))
}

impl SeamRemover for RgbaImage {
    fn remove_seam(&mut self, seam: &Seam) -> Result<()> {
        *self = remove_vertical_seam(self, seam)?;
        Ok(())
    }
}

impl SeamRemover for Lattice {
    fn remove_seam(&mut self, seam: &Seam) -> Result<()> {
        Lattice::remove_seam(self, seam)
    }
}
