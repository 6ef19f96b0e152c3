// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Choosing the dominant loop

use alpha_boundary_core::BoundaryLoop;

/// Index of the loop with the greatest absolute area.
///
/// Ties go to the loop encountered first.
pub fn dominant_loop_index(loops: &[BoundaryLoop]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, ring) in loops.iter().enumerate() {
        let area = ring.area();
        if best.map_or(true, |(_, best_area)| area > best_area) {
            best = Some((i, area));
        }
    }
    best.map(|(i, _)| i)
}

/// Take the loop with the greatest absolute area, or `None` when there are no loops.
pub fn select_loop(loops: Vec<BoundaryLoop>) -> Option<BoundaryLoop> {
    let index = dominant_loop_index(&loops)?;
    loops.into_iter().nth(index)
}
