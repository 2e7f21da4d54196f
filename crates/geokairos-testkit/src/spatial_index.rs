//! R-tree backing `CREATE RSTREE INDEX`

use geokairos_geometry::Geometry;
use rstar::{RTree, RTreeObject, AABB};

/// One indexed geometry
#[derive(Debug, Clone)]
pub struct SpatialIndexEntry {
    /// Position of the geometry within its column
    pub row_id: usize,
    pub mbr: AABB<[f64; 2]>,
}

impl RTreeObject for SpatialIndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.mbr
    }
}

impl PartialEq for SpatialIndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.row_id == other.row_id
    }
}

/// Spatial index over one geometry column
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    rtree: RTree<SpatialIndexEntry>,
    pub table: String,
    pub column: String,
}

impl SpatialIndex {
    /// Index the column's existing geometries
    pub fn bulk_load<'g>(
        table: &str,
        column: &str,
        geometries: impl IntoIterator<Item = &'g Geometry>,
    ) -> Self {
        let entries = geometries
            .into_iter()
            .enumerate()
            .filter_map(|(row_id, geometry)| mbr_of(geometry).map(|mbr| SpatialIndexEntry { row_id, mbr }))
            .collect();
        SpatialIndex { rtree: RTree::bulk_load(entries), table: table.to_string(), column: column.to_string() }
    }

    pub fn insert(&mut self, row_id: usize, geometry: &Geometry) {
        if let Some(mbr) = mbr_of(geometry) {
            self.rtree.insert(SpatialIndexEntry { row_id, mbr });
        }
    }

    /// Row ids whose envelope intersects the box
    pub fn locate_in_envelope(&self, min: [f64; 2], max: [f64; 2]) -> Vec<usize> {
        let query = AABB::from_corners(min, max);
        let mut ids: Vec<usize> =
            self.rtree.locate_in_envelope_intersecting(&query).map(|entry| entry.row_id).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }
}

fn mbr_of(geometry: &Geometry) -> Option<AABB<[f64; 2]>> {
    let envelope = geometry.envelope();
    if envelope.is_empty() {
        return None;
    }
    Some(AABB::from_corners(
        [envelope.min_x(), envelope.min_y()],
        [envelope.max_x(), envelope.max_y()],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_in_envelope() {
        let geometries = vec![
            Geometry::Point { x: 1.0, y: 1.0 },
            Geometry::LineString { points: vec![(10.0, 10.0), (20.0, 20.0)] },
            Geometry::Point { x: 5.0, y: 5.0 },
        ];
        let mut index = SpatialIndex::bulk_load("t", "geom", &geometries);
        assert_eq!(index.len(), 3);
        assert_eq!(index.locate_in_envelope([0.0, 0.0], [6.0, 6.0]), vec![0, 2]);
        assert_eq!(index.locate_in_envelope([15.0, 15.0], [16.0, 16.0]), vec![1]);

        index.insert(3, &Geometry::Point { x: 15.5, y: 15.5 });
        assert_eq!(index.locate_in_envelope([15.0, 15.0], [16.0, 16.0]), vec![1, 3]);
    }

    #[test]
    fn test_empty_geometries_are_not_indexed() {
        let geometries = vec![Geometry::MultiPoint { points: vec![] }];
        let index = SpatialIndex::bulk_load("t", "geom", &geometries);
        assert!(index.is_empty());
    }
}
