//! Uniform hash grid for fixed-radius neighbour queries.

use hashbrown::HashMap;
use nalgebra::Point3;
use smallvec::SmallVec;

type CellKey = [i64; 3];

/// Buckets points into cubic cells whose edge equals the query radius, so
/// every neighbour within the radius lies in the 3×3×3 block of cells around
/// a point. Coincident points simply share a bucket.
#[derive(Debug)]
pub(crate) struct PointGrid {
    cell_size: f64,
    cells: HashMap<CellKey, SmallVec<[usize; 4]>>,
}

impl PointGrid {
    /// Index `points` by position; slots are their positions in the slice.
    ///
    /// `cell_size` must be finite and positive.
    pub(crate) fn new(points: &[Point3<f64>], cell_size: f64) -> Self {
        let mut cells: HashMap<CellKey, SmallVec<[usize; 4]>> = HashMap::new();
        for (slot, p) in points.iter().enumerate() {
            cells.entry(cell_of(p, cell_size)).or_default().push(slot);
        }
        Self { cell_size, cells }
    }

    /// Push every slot in the 27 cells around `point` into `out`.
    pub(crate) fn candidates(&self, point: &Point3<f64>, out: &mut Vec<usize>) {
        let [cx, cy, cz] = cell_of(point, self.cell_size);
        for dx in -1..=1_i64 {
            for dy in -1..=1_i64 {
                for dz in -1..=1_i64 {
                    let key = [
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    ];
                    if let Some(slots) = self.cells.get(&key) {
                        out.extend_from_slice(slots);
                    }
                }
            }
        }
    }

    #[cfg(test)]
    fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Cell coordinates of a point; non-finite coordinates land in cell 0 or
/// the extreme cells and are filtered out by the exact distance check.
#[allow(clippy::cast_possible_truncation)]
fn cell_of(p: &Point3<f64>, cell_size: f64) -> CellKey {
    [
        (p.x / cell_size).floor() as i64,
        (p.y / cell_size).floor() as i64,
        (p.z / cell_size).floor() as i64,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coincident_points_share_a_cell() {
        let points = vec![Point3::new(1.0, 1.0, 1.0); 100];
        let grid = PointGrid::new(&points, 0.5);
        assert_eq!(grid.cell_count(), 1);

        let mut out = Vec::new();
        grid.candidates(&points[0], &mut out);
        assert_eq!(out.len(), 100);
    }

    #[test]
    fn candidates_cover_neighbouring_cells() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.99, 0.0, 0.0),
            Point3::new(-0.5, 0.9, -0.9),
            Point3::new(2.5, 0.0, 0.0),
        ];
        let grid = PointGrid::new(&points, 1.0);
        let mut out = Vec::new();
        grid.candidates(&points[0], &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1, 2]);
    }

    #[test]
    fn negative_coordinates_floor_downwards() {
        assert_eq!(cell_of(&Point3::new(-0.1, 0.1, -1.0), 1.0), [-1, 0, -1]);
    }
}
