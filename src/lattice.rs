// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The seam lattice
//!
//! An image stored as one doubly-linked list of pixels per row, plus
//! vertical links between rows, with each node carrying its own
//! energy and seam cost.  In lieu of pointers every link is a `NodeId`
//! into a single arena that lives exactly as long as the lattice, so
//! no link can outlive what it points at.
//!
//! Removing a seam is a splice per row.  Afterwards only a narrow band
//! around the seam has different neighbours, so only that band's links
//! are repaired and only its energy is recomputed.  Costs are redone
//! top to bottom in a window around the seam, widened by one column
//! on each side for every column whose cost actually changed in the
//! row above; as soon as a row comes out unchanged, nothing below it
//! needs to be looked at.
//!
//! Nodes never record their column.  Columns only exist relative to an
//! anchor node whose column is known at the time: the head of a row
//! (column 0), or the neighbour of a pixel that was just removed.

use crate::backward;
use crate::cq;
use crate::energy::{calculate_energy, pixel_energy};
use crate::error::{CarveError, Result};
use crate::forward::{self, step_left, step_right};
use crate::seam::Seam;
use crate::seamfinder::{calculate_cost, cheapest_endpoint, SearchPolicy, SeamFinder};
use crate::twodmap::{CostAndBackPointer, CostGrid, EnergyGrid, TwoDimensionalMap};
use image::{ImageBuffer, Rgba, RgbaImage};
use log::trace;
use std::cmp::{max, min};

/// The address of a pixel in the lattice's arena.  Stable for the life
/// of the lattice; removed nodes are unlinked, never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Node {
    pixel: Rgba<u8>,
    energy: f64,
    cost: CostAndBackPointer,
    left: Option<NodeId>,
    right: Option<NodeId>,
    up: Option<NodeId>,
    down: Option<NodeId>,
}

/// A node whose column is known right now.
#[derive(Debug, Copy, Clone)]
struct Anchor {
    node: NodeId,
    column: u32,
}

#[derive(Debug, Clone)]
pub struct Lattice {
    nodes: Vec<Node>,
    heads: Vec<NodeId>,
    width: u32,
    height: u32,
    policy: SearchPolicy,
}

impl Lattice {
    /// Build a lattice for an image, computing the energy and cost of
    /// every pixel once.
    pub fn new(image: &RgbaImage, policy: SearchPolicy) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(CarveError::InvalidBuffer {
                width,
                height,
                expected: 0,
                actual: 0,
            });
        }

        let energy = calculate_energy(image);
        let cost = calculate_cost(image, &energy, policy);

        // The only time a node's address and its position agree.
        let at = |x: u32, y: u32| NodeId(y * width + x);
        let nodes = image
            .enumerate_pixels()
            .map(|(x, y, pixel)| Node {
                pixel: *pixel,
                energy: energy[(x, y)],
                cost: cost[(x, y)],
                left: cq!(x == 0, None, Some(at(x - 1, y))),
                right: cq!(x + 1 == width, None, Some(at(x + 1, y))),
                up: cq!(y == 0, None, Some(at(x, y - 1))),
                down: cq!(y + 1 == height, None, Some(at(x, y + 1))),
            })
            .collect();

        Ok(Lattice {
            nodes,
            heads: (0..height).map(|y| at(0, y)).collect(),
            width,
            height,
            policy,
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

    pub fn policy(&self) -> SearchPolicy {
        self.policy
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Walk `offset` nodes to the right (or left, if negative).
    fn step(&self, from: NodeId, offset: i64) -> Option<NodeId> {
        let mut at = from;
        for _ in 0..offset.abs() {
            at = cq!(offset < 0, self.node(at).left, self.node(at).right)?;
        }
        Some(at)
    }

    fn seek(&self, anchor: Anchor, column: u32) -> Option<NodeId> {
        self.step(anchor.node, i64::from(column) - i64::from(anchor.column))
    }

    /// The nodes of one row, left to right.
    fn row(&self, y: u32) -> RowIter<'_> {
        RowIter {
            lattice: self,
            next: Some(self.heads[y as usize]),
        }
    }

    /// Collect one value per pixel, row-major.
    fn collect_map<P, F>(&self, f: F) -> TwoDimensionalMap<P>
    where
        P: Default + Copy,
        F: Fn(&Node) -> P,
    {
        let mut map = TwoDimensionalMap::new(self.width, self.height);
        for y in 0..self.height {
            for (x, id) in self.row(y).enumerate() {
                map[(x as u32, y)] = f(self.node(id));
            }
        }
        map
    }

    /// Materialise the current pixels as an RGBA image.
    pub fn to_image(&self) -> RgbaImage {
        let mut image = ImageBuffer::new(self.width, self.height);
        for y in 0..self.height {
            for (x, id) in self.row(y).enumerate() {
                image.put_pixel(x as u32, y, self.node(id).pixel);
            }
        }
        image
    }

    /// The cached energy of every pixel.
    pub fn energy_grid(&self) -> EnergyGrid {
        self.collect_map(|n| n.energy)
    }

    /// The cached seam digraph.
    pub fn cost_grid(&self) -> CostGrid {
        self.collect_map(|n| n.cost)
    }

    // The energy of a node from its current neighbours.  Having both
    // horizontal neighbours is the same thing as 0 < x < width - 1.
    fn energy_of(&self, id: NodeId) -> f64 {
        let node = self.node(id);
        let pair = |a: Option<NodeId>, b: Option<NodeId>| match (a, b) {
            (Some(a), Some(b)) => Some((self.node(a).pixel, self.node(b).pixel)),
            _ => None,
        };
        pixel_energy(pair(node.left, node.right), pair(node.up, node.down))
    }

    // The seam cost of a node from its current neighbours above.
    fn cost_of(&self, id: NodeId) -> CostAndBackPointer {
        let node = self.node(id);
        let up = match node.up {
            Some(up) => up,
            None => {
                return match self.policy {
                    SearchPolicy::Backward => backward::cost_of_first_row(node.energy),
                    SearchPolicy::Forward => forward::cost_of_first_row(),
                }
            }
        };
        let above = self.node(up);
        let above_left = above.left;
        let above_right = above.right;
        let cost = |id: NodeId| self.node(id).cost.cost;

        match self.policy {
            SearchPolicy::Backward => backward::cost_candidate(
                node.energy,
                above_left.map(cost),
                above.cost.cost,
                above_right.map(cost),
            ),
            SearchPolicy::Forward => {
                // A diagonal step needs the pixel beyond the one stepped
                // from, which only exists if that pixel is interior.
                let from_above_left = above_left.and_then(|al| {
                    self.node(al)
                        .left
                        .map(|far| (cost(al), step_right(&self.node(far).pixel, &node.pixel)))
                });
                let from_above_right = above_right.and_then(|ar| {
                    self.node(ar)
                        .right
                        .map(|far| (cost(ar), step_left(&self.node(far).pixel, &node.pixel)))
                });
                forward::cost_candidate(
                    from_above_left,
                    (above.cost.cost, node.energy),
                    from_above_right,
                )
            }
        }
    }

    /// Find the nodes a seam passes through, top to bottom, following
    /// the vertical links so that only the first row is walked.
    fn locate(&self, seam: &Seam) -> Option<Vec<NodeId>> {
        let mut nodes = Vec::with_capacity(seam.len());
        let mut at = self.step(self.heads[0], i64::from(seam[0]))?;
        nodes.push(at);
        for pair in seam.columns().windows(2) {
            let below = self.node(at).down?;
            at = self.step(below, i64::from(pair[1]) - i64::from(pair[0]))?;
            nodes.push(at);
        }
        Some(nodes)
    }

    /// Remove a seam, then bring the links, energy, and cost of every
    /// remaining pixel up to date.  The seam is checked first; if it
    /// doesn't fit, nothing changes.
    pub fn remove_seam(&mut self, seam: &Seam) -> Result<()> {
        seam.validate(self.width, self.height)?;
        let doomed = self.locate(seam).ok_or_else(|| CarveError::InvalidSeam {
            reason: "seam runs off the lattice".to_string(),
        })?;

        let anchors = self.splice(seam, &doomed);
        self.width -= 1;
        self.relink(seam, &anchors);
        self.refresh_energy(seam, &anchors);
        self.refresh_cost(seam, &anchors);
        Ok(())
    }

    // Unlink one node per row.  Returns, for each row, a surviving
    // neighbour of the removed node together with its new column.
    fn splice(&mut self, seam: &Seam, doomed: &[NodeId]) -> Vec<Anchor> {
        let mut anchors = Vec::with_capacity(doomed.len());
        for (y, id) in doomed.iter().enumerate() {
            let (left, right) = {
                let node = self.node(*id);
                (node.left, node.right)
            };
            if let Some(l) = left {
                self.node_mut(l).right = right;
            }
            if let Some(r) = right {
                self.node_mut(r).left = left;
            }
            if self.heads[y] == *id {
                if let Some(r) = right {
                    self.heads[y] = r;
                }
            }
            // Width was at least two, so one of them survives.
            let anchor = match (left, right) {
                (Some(l), _) => Anchor {
                    node: l,
                    column: seam[y] - 1,
                },
                (None, Some(r)) => Anchor {
                    node: r,
                    column: seam[y],
                },
                (None, None) => Anchor {
                    node: self.heads[y],
                    column: 0,
                },
            };
            anchors.push(anchor);
        }
        anchors
    }

    /// The columns `[lo, hi]` of the current width, clipped.
    fn clip(&self, lo: i64, hi: i64) -> Option<(u32, u32)> {
        let lo = max(lo, 0);
        let hi = min(hi, i64::from(self.width) - 1);
        cq!(lo > hi, None, Some((lo as u32, hi as u32)))
    }

    // Between two rows whose seam columns were a and b, only the
    // columns from min(a, b) to max(a, b) change which pixel sits
    // directly above which.  Re-pair a slightly wider band.
    fn relink(&mut self, seam: &Seam, anchors: &[Anchor]) {
        for y in 1..self.height as usize {
            let (a, b) = (i64::from(seam[y - 1]), i64::from(seam[y]));
            let (lo, hi) = match self.clip(min(a, b) - 1, max(a, b) + 1) {
                Some(band) => band,
                None => continue,
            };
            let mut upper = self.seek(anchors[y - 1], lo);
            let mut lower = self.seek(anchors[y], lo);
            for _ in lo..=hi {
                if let (Some(u), Some(l)) = (upper, lower) {
                    self.node_mut(u).down = Some(l);
                    self.node_mut(l).up = Some(u);
                    upper = self.node(u).right;
                    lower = self.node(l).right;
                }
            }
        }
    }

    // Only the two pixels that met across the gap see new neighbours,
    // horizontally and vertically both.
    fn refresh_energy(&mut self, seam: &Seam, anchors: &[Anchor]) {
        for y in 0..self.height as usize {
            let s = i64::from(seam[y]);
            if let Some((lo, hi)) = self.clip(s - 1, s) {
                let mut at = self.seek(anchors[y], lo);
                for _ in lo..=hi {
                    if let Some(id) = at {
                        let energy = self.energy_of(id);
                        self.node_mut(id).energy = energy;
                        at = self.node(id).right;
                    }
                }
            }
        }
    }

    // Recompute costs top to bottom.  A cell needs recomputing if the
    // seam passed near it (in its own row or the row above), or if one
    // of the three cells above it changed.
    fn refresh_cost(&mut self, seam: &Seam, anchors: &[Anchor]) {
        let mut changed: Option<(i64, i64)> = None;
        let mut visited = 0usize;
        for y in 0..self.height as usize {
            let s = i64::from(seam[y]);
            let p = cq!(y == 0, s, i64::from(seam[y - 1]));
            let (mut lo, mut hi) = (min(s, p) - 3, max(s, p) + 2);
            if let Some((clo, chi)) = changed {
                lo = min(lo, clo - 1);
                hi = max(hi, chi + 1);
            }
            changed = None;
            let (lo, hi) = match self.clip(lo, hi) {
                Some(band) => band,
                None => continue,
            };

            let mut at = self.seek(anchors[y], lo);
            for x in lo..=hi {
                let id = match at {
                    Some(id) => id,
                    None => break,
                };
                let cost = self.cost_of(id);
                if cost != self.node(id).cost {
                    self.node_mut(id).cost = cost;
                    let x = i64::from(x);
                    changed = Some(changed.map_or((x, x), |(clo, chi)| (min(clo, x), max(chi, x))));
                }
                visited += 1;
                at = self.node(id).right;
            }
        }
        trace!("refreshed {} seam costs across {} rows", visited, self.height);
    }
}

impl SeamFinder for Lattice {
    /// The cached costs are always current, so this is a scan of the
    /// bottom row and a climb back up the back-pointers.
    fn find_vertical_seam(&self) -> Seam {
        let bottom = self.height - 1;
        let end = cheapest_endpoint(self.row(bottom).map(|id| self.node(id).cost.cost))
            .map_or(0, |(x, _)| x);

        let mut columns = vec![0; self.height as usize];
        let mut column = end;
        let mut at = self.step(self.heads[bottom as usize], i64::from(end));
        for y in (0..self.height as usize).rev() {
            columns[y] = column;
            let node = match at {
                Some(id) => self.node(id),
                None => break,
            };
            column = node.cost.parent_of(column);
            at = node
                .up
                .and_then(|up| self.step(up, i64::from(node.cost.parent)));
        }
        Seam::new(columns)
    }
}

struct RowIter<'a> {
    lattice: &'a Lattice,
    next: Option<NodeId>,
}

impl<'a> Iterator for RowIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.lattice.node(current).right;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seamfinder::GridSearch;

    fn sample(width: u32, height: u32) -> RgbaImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            let v = (x * 53 + y * 31 + x * y * 7) % 251;
            Rgba([v as u8, (v * 3 % 256) as u8, (255 - v) as u8, (x + y) as u8])
        })
    }

    fn assert_matches_full_recomputation(lattice: &Lattice) {
        let image = lattice.to_image();
        let search = GridSearch::new(&image, lattice.policy());
        assert_eq!(lattice.energy_grid(), search.energy());
        assert_eq!(lattice.cost_grid(), search.cost());
    }

    #[test]
    fn a_new_lattice_round_trips_its_image() {
        let image = sample(5, 4);
        let lattice = Lattice::new(&image, SearchPolicy::Forward).unwrap();
        assert_eq!(lattice.to_image(), image);
        assert_matches_full_recomputation(&lattice);
    }

    #[test]
    fn empty_images_are_refused() {
        let image: RgbaImage = ImageBuffer::new(0, 3);
        assert!(Lattice::new(&image, SearchPolicy::Backward).is_err());
    }

    #[test]
    fn splicing_removes_one_pixel_per_row() {
        let image = sample(4, 3);
        let mut lattice = Lattice::new(&image, SearchPolicy::Backward).unwrap();
        lattice.remove_seam(&Seam::new(vec![0, 1, 2])).unwrap();
        let carved = lattice.to_image();
        assert_eq!(carved.dimensions(), (3, 3));
        assert_eq!(carved.get_pixel(0, 0), image.get_pixel(1, 0));
        assert_eq!(carved.get_pixel(0, 1), image.get_pixel(0, 1));
        assert_eq!(carved.get_pixel(1, 1), image.get_pixel(2, 1));
        assert_eq!(carved.get_pixel(2, 2), image.get_pixel(3, 2));
    }

    #[test]
    fn a_bad_seam_leaves_the_lattice_alone() {
        let image = sample(4, 3);
        let mut lattice = Lattice::new(&image, SearchPolicy::Backward).unwrap();
        assert!(lattice.remove_seam(&Seam::new(vec![0, 2, 2])).is_err());
        assert_eq!(lattice.to_image(), image);
    }

    #[test]
    fn cached_seams_match_the_grid_search() {
        for policy in [SearchPolicy::Backward, SearchPolicy::Forward].iter() {
            let image = sample(9, 7);
            let lattice = Lattice::new(&image, *policy).unwrap();
            let expected = GridSearch::new(&image, *policy).find_vertical_seam();
            assert_eq!(lattice.find_vertical_seam(), expected);
        }
    }

    #[test]
    fn incremental_updates_match_full_recomputation() {
        for policy in [SearchPolicy::Backward, SearchPolicy::Forward].iter() {
            let mut lattice = Lattice::new(&sample(12, 9), *policy).unwrap();
            while lattice.width() > 1 {
                let seam = lattice.find_vertical_seam();
                lattice.remove_seam(&seam).unwrap();
                assert_matches_full_recomputation(&lattice);
            }
        }
    }

    #[test]
    fn arbitrary_seams_keep_the_caches_honest() {
        let mut lattice = Lattice::new(&sample(8, 6), SearchPolicy::Forward).unwrap();
        for seam in [
            vec![7, 6, 5, 4, 3, 2],
            vec![0, 0, 1, 1, 0, 0],
            vec![3, 4, 3, 2, 3, 4],
            vec![4, 4, 4, 4, 4, 4],
        ]
        .iter()
        {
            lattice.remove_seam(&Seam::new(seam.clone())).unwrap();
            assert_matches_full_recomputation(&lattice);
        }
        assert_eq!(lattice.width(), 4);
    }

    #[test]
    fn the_last_column_stays() {
        let mut lattice = Lattice::new(&sample(2, 3), SearchPolicy::Backward).unwrap();
        lattice.remove_seam(&Seam::new(vec![1, 1, 0])).unwrap();
        assert_eq!(lattice.width(), 1);
        match lattice.remove_seam(&Seam::new(vec![0, 0, 0])) {
            Err(CarveError::InvalidSeamCount { .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
        assert_matches_full_recomputation(&lattice);
    }
}
