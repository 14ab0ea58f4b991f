// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calculate the energy of an image
//!
//! The energy of a pixel is the Euclidean norm of its horizontal and
//! vertical color gradients:
//!
//! ```text
//!        Δx² = |right - left|²     (0 on the left and right edges)
//!        Δy² = |below - above|²    (0 on the top and bottom edges)
//!     e(x,y) = √(Δx² + Δy²)
//! ```
//!
//! Border pixels lose one of the two terms and are therefore cheaper
//! to remove, unless the other axis has something to say.

use crate::cq;
use crate::pixelpairs::difference_squared;
use crate::twodmap::EnergyGrid;
use image::{GenericImageView, ImageBuffer, Rgba, RgbaImage};
use itertools::iproduct;
use num_traits::clamp;

/// The energy of one pixel, given its two neighbour pairs.  A pair is
/// `None` when the pixel sits on the corresponding border.  This is
/// the single place the formula lives; the grid and the lattice both
/// come through here, which is what keeps their numbers bit-identical.
#[inline]
pub fn pixel_energy(
    horizontal: Option<(Rgba<u8>, Rgba<u8>)>,
    vertical: Option<(Rgba<u8>, Rgba<u8>)>,
) -> f64 {
    let dx = horizontal.map_or(0.0, |(left, right)| difference_squared(&right, &left));
    let dy = vertical.map_or(0.0, |(above, below)| difference_squared(&below, &above));
    (dx + dy).sqrt()
}

/// The energy of the pixel at (x, y).
pub fn energy_at<I>(image: &I, x: u32, y: u32) -> f64
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    let horizontal = cq!(
        x > 0 && x + 1 < width,
        Some((image.get_pixel(x - 1, y), image.get_pixel(x + 1, y))),
        None
    );
    let vertical = cq!(
        y > 0 && y + 1 < height,
        Some((image.get_pixel(x, y - 1), image.get_pixel(x, y + 1))),
        None
    );
    pixel_energy(horizontal, vertical)
}

/// Compute the energy of every pixel in an image.
pub fn calculate_energy<I>(image: &I) -> EnergyGrid
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    let mut emap = EnergyGrid::new(width, height);
    for (y, x) in iproduct!(0..height, 0..width) {
        emap[(x, y)] = energy_at(image, x, y);
    }
    emap
}

/// The energy grid as a picture: each value truncated into 0..=255
/// and replicated across R, G, and B, with the alpha of the pixel it
/// describes.
pub fn energy_to_image<I>(energy: &EnergyGrid, image: &I) -> RgbaImage
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = energy.dimensions();
    ImageBuffer::from_fn(width, height, |x, y| {
        let level = clamp(energy[(x, y)].trunc(), 0.0, 255.0) as u8;
        Rgba([level, level, level, image.get_pixel(x, y)[3]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn red_dot() -> RgbaImage {
        ImageBuffer::from_fn(3, 3, |x, y| cq!(x == 1 && y == 1, RED, BLACK))
    }

    #[test]
    fn uniform_images_have_no_energy() {
        let image: RgbaImage = ImageBuffer::from_pixel(4, 4, Rgba([40, 80, 120, 255]));
        assert!(calculate_energy(&image).as_slice().iter().all(|e| *e == 0.0));
    }

    #[test]
    fn a_lone_dot_is_invisible_to_its_border_neighbours() {
        // The dot only ever shows up as a neighbour along an axis on
        // which the observer sits at the border, so the grid is dark.
        let energy = calculate_energy(&red_dot());
        assert!(energy.as_slice().iter().all(|e| *e == 0.0));
    }

    #[test]
    fn gradients_are_combined_as_a_norm() {
        // A 3x3 whose center sees a horizontal step of 3 and a vertical
        // step of 4 on the red channel.
        let image: RgbaImage = ImageBuffer::from_fn(3, 3, |x, y| match (x, y) {
            (2, 1) => Rgba([3, 0, 0, 255]),
            (1, 2) => Rgba([4, 0, 0, 255]),
            _ => BLACK,
        });
        assert_eq!(energy_at(&image, 1, 1), 5.0);
    }

    #[test]
    fn edge_pixels_drop_a_term() {
        let image: RgbaImage = ImageBuffer::from_fn(3, 3, |x, _| Rgba([(x * 10) as u8, 0, 0, 255]));
        assert_eq!(energy_at(&image, 1, 0), 20.0);
        assert_eq!(energy_at(&image, 0, 1), 0.0);
        assert_eq!(energy_at(&image, 1, 1), 20.0);
    }

    #[test]
    fn the_picture_keeps_alpha_and_saturates() {
        let image: RgbaImage = ImageBuffer::from_fn(3, 1, |x, _| match x {
            0 => Rgba([0, 0, 0, 17]),
            1 => Rgba([9, 9, 9, 99]),
            _ => Rgba([255, 255, 255, 200]),
        });
        let picture = energy_to_image(&calculate_energy(&image), &image);
        assert_eq!(picture.get_pixel(0, 0), &Rgba([0, 0, 0, 17]));
        assert_eq!(picture.get_pixel(1, 0), &Rgba([255, 255, 255, 99]));
    }
}
