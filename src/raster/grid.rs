use geo::{BoundingRect, Coord, Intersects, MultiPolygon, Point, Rect};
use ndarray::Array2;

/// A north-up raster grid. Row 0 is the top (max y) row.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    values: Array2<f64>,
    origin: Coord<f64>,     // Top-left corner (xmin, ymax)
    cell_size: (f64, f64),  // (dx, dy), both positive
    no_data: Option<f64>,
}

impl Raster {
    pub fn new(values: Array2<f64>, origin: Coord<f64>, cell_size: (f64, f64), no_data: Option<f64>) -> Self {
        debug_assert!(cell_size.0 > 0.0 && cell_size.1 > 0.0, "cell size must be positive");
        Self { values, origin, cell_size, no_data }
    }

    #[inline] pub fn width(&self) -> usize { self.values.ncols() }

    #[inline] pub fn height(&self) -> usize { self.values.nrows() }

    #[inline] pub fn cell_size(&self) -> (f64, f64) { self.cell_size }

    #[inline] pub fn values(&self) -> &Array2<f64> { &self.values }

    /// Extent covered by the grid.
    pub fn bounds(&self) -> Rect<f64> {
        Rect::new(
            Coord { x: self.origin.x, y: self.origin.y - self.height() as f64 * self.cell_size.1 },
            Coord { x: self.origin.x + self.width() as f64 * self.cell_size.0, y: self.origin.y },
        )
    }

    /// Center of cell (row, col).
    #[inline]
    pub fn cell_center(&self, row: usize, col: usize) -> Coord<f64> {
        Coord {
            x: self.origin.x + (col as f64 + 0.5) * self.cell_size.0,
            y: self.origin.y - (row as f64 + 0.5) * self.cell_size.1,
        }
    }

    /// True unless `value` is the no-data marker or not finite.
    #[inline]
    pub fn is_valid(&self, value: f64) -> bool {
        value.is_finite() && self.no_data.is_none_or(|nd| value != nd)
    }

    /// Valid values of the cells whose centers lie in `shape`, row-major.
    pub fn values_within(&self, shape: &MultiPolygon<f64>) -> Vec<f64> {
        let Some(rect) = shape.bounding_rect() else { return Vec::new() };
        let (Some(rows), Some(cols)) = (self.row_span(&rect), self.col_span(&rect)) else { return Vec::new() };

        let mut found = Vec::new();
        for row in rows.0..=rows.1 {
            for col in cols.0..=cols.1 {
                let value = self.values[[row, col]];
                if !self.is_valid(value) { continue }
                if shape.intersects(&Point::from(self.cell_center(row, col))) {
                    found.push(value);
                }
            }
        }
        found
    }

    /// Inclusive row range whose centers may fall within `rect`.
    fn row_span(&self, rect: &Rect<f64>) -> Option<(usize, usize)> {
        let first = ((self.origin.y - rect.max().y) / self.cell_size.1 - 0.5).ceil().max(0.0);
        let last = ((self.origin.y - rect.min().y) / self.cell_size.1 - 0.5).floor();
        clamp_span(first, last, self.height())
    }

    /// Inclusive column range whose centers may fall within `rect`.
    fn col_span(&self, rect: &Rect<f64>) -> Option<(usize, usize)> {
        let first = ((rect.min().x - self.origin.x) / self.cell_size.0 - 0.5).ceil().max(0.0);
        let last = ((rect.max().x - self.origin.x) / self.cell_size.0 - 0.5).floor();
        clamp_span(first, last, self.width())
    }
}

fn clamp_span(first: f64, last: f64, len: usize) -> Option<(usize, usize)> {
    if len == 0 || last < 0.0 || first > last { return None }
    let last = (last as usize).min(len - 1);
    let first = first as usize;
    (first <= last).then_some((first, last))
}

#[cfg(test)]
mod tests {
    use geo::coord;
    use ndarray::array;

    use super::*;

    fn grid() -> Raster {
        // 4x3 grid of 10 m cells, top-left at (0, 30).
        Raster::new(
            array![
                [-1.0, -2.0, -3.0, -4.0],
                [-5.0, -9999.0, -7.0, -8.0],
                [-9.0, -10.0, -11.0, -12.0],
            ],
            coord! { x: 0.0, y: 30.0 },
            (10.0, 10.0),
            Some(-9999.0),
        )
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::from(Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon())
    }

    #[test]
    fn bounds_and_centers() {
        let raster = grid();
        let bounds = raster.bounds();
        assert_eq!((bounds.min().x, bounds.min().y, bounds.max().x, bounds.max().y), (0.0, 0.0, 40.0, 30.0));
        assert_eq!(raster.cell_center(0, 0), coord! { x: 5.0, y: 25.0 });
        assert_eq!(raster.cell_center(2, 3), coord! { x: 35.0, y: 5.0 });
    }

    #[test]
    fn values_within_skips_no_data() {
        let raster = grid();
        // Covers the centers of the left two columns of the top two rows.
        assert_eq!(raster.values_within(&rect(0.0, 10.0, 20.0, 30.0)), vec![-1.0, -2.0, -5.0]);
        assert_eq!(raster.values_within(&rect(0.0, 0.0, 40.0, 30.0)).len(), 11);
    }

    #[test]
    fn shapes_outside_the_grid_see_nothing() {
        assert!(grid().values_within(&rect(100.0, 100.0, 120.0, 120.0)).is_empty());
        assert!(grid().values_within(&rect(1.0, 1.0, 4.0, 4.0)).is_empty());
    }
}
