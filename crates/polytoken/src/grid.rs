//! Grid cells over a bounding box.
//!
//! A geographic range is covered by square cells aligned to a multiple of the
//! current step. The scan starts at the coarsest step and walks down the
//! schedule until some cell touches the range; from there only cells that
//! straddle the boundary are subdivided, so the token count grows with the
//! perimeter of the range rather than its area.

use crate::error::{PolytokenError, Result};
use crate::geometry::{BoundingBox, Point, square_ring};
use crate::precision::{ceil_to_step, floor_to_step, round5};
use crate::step::StepSchedule;
use crate::token::{Token, dedup};

/// Most cells a single scan of a bounding box may enumerate.
pub const MAX_SCAN_CELLS: usize = 1 << 24;

/// Raw longitudes a covered cell can start at. Polygon rings stay within one
/// turn either way; circle rectangles may run east of 180 up to 540.
const RAW_LONGITUDE_MIN: f64 = -360.0;
const RAW_LONGITUDE_MAX: f64 = 540.0;

/// A square grid cell, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub top_left: Point,
    pub size: f64,
}

/// How a cell relates to the range being covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// Fully covered: emit a token at this cell's size.
    Inside,
    /// Straddles the boundary: subdivide, or emit if already at the finest step.
    Partial,
    Outside,
}

/// Decides the [`CellState`] of a candidate cell.
pub trait CellClassifier {
    fn classify(&self, cell: &Cell) -> Result<CellState>;
}

impl Cell {
    #[inline]
    pub fn new(x: f64, y: f64, size: f64) -> Self {
        Self { top_left: Point::new(x, y), size }
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.top_left.x
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.top_left.x + self.size
    }

    #[inline]
    pub fn min_y(&self) -> f64 {
        self.top_left.y - self.size
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.top_left.y
    }

    /// The cell as a closed ring.
    pub fn ring(&self) -> Vec<Point> {
        square_ring(self.top_left, self.size)
    }

    /// Token for this cell, with longitude wrapped into [-180, 180].
    pub fn token(&self) -> Token {
        Token::cell(wrap_longitude(self.top_left.x), self.top_left.y, self.size)
    }

    /// The `factor` x `factor` sub-cells of size `step`, column by column.
    pub fn subdivide(&self, factor: u32, step: f64) -> impl Iterator<Item = Cell> + '_ {
        (0..factor).flat_map(move |i| {
            (0..factor).map(move |j| {
                Cell::new(
                    round5(self.top_left.x + f64::from(i) * step),
                    round5(self.top_left.y - f64::from(j) * step),
                    step,
                )
            })
        })
    }
}

/// Shift a longitude outside [-180, 180] by one full turn.
pub fn wrap_longitude(x: f64) -> f64 {
    if x > 180.0 {
        round5(x - 360.0)
    } else if x < -180.0 {
        round5(x + 360.0)
    } else {
        x
    }
}

/// All cells of size `step` that overlap `bbox`, column by column.
///
/// Fails with `InvalidRange` when that takes more than [`MAX_SCAN_CELLS`].
pub fn covering_cells(bbox: &BoundingBox, step: f64) -> Result<Vec<Cell>> {
    let start_x = floor_to_step(bbox.min_x(), step);
    let top_y = ceil_to_step(bbox.max_y(), step);
    let columns = round5((bbox.max_x() - start_x) / step).ceil().max(0.0) as usize;
    let rows = round5((top_y - bbox.min_y()) / step).ceil().max(0.0) as usize;

    let count = columns
        .checked_mul(rows)
        .filter(|&count| count <= MAX_SCAN_CELLS)
        .ok_or_else(|| {
            PolytokenError::invalid_range(format!(
                "range spans too many cells of size {step} ({columns} x {rows})"
            ))
        })?;

    let mut cells = Vec::with_capacity(count);
    for i in 0..columns {
        let x = round5(start_x + i as f64 * step);
        for j in 0..rows {
            let y = round5(top_y - j as f64 * step);
            cells.push(Cell::new(x, y, step));
        }
    }
    Ok(cells)
}

/// Tokens covering whatever `classifier` describes within `bbox`.
///
/// Scans coarse to fine until a step yields an inside or partial cell, then
/// refines the partial cells one step at a time. Cells still partial at the
/// finest step are emitted at that step.
pub fn cover<C>(classifier: &C, bbox: &BoundingBox, schedule: &StepSchedule) -> Result<Vec<Token>>
where
    C: CellClassifier + ?Sized,
{
    let factor = schedule.multiplier().ok_or_else(|| {
        PolytokenError::invalid_argument("grid refinement needs an exponential step schedule")
    })?;
    let steps = schedule.steps();

    for (level, &step) in steps.iter().enumerate() {
        let mut tokens = Vec::new();
        let mut partial = Vec::new();
        for cell in covering_cells(bbox, step)? {
            match classifier.classify(&cell)? {
                CellState::Inside => tokens.push(cell.token()),
                CellState::Partial => partial.push(cell),
                CellState::Outside => {}
            }
        }

        if tokens.is_empty() && partial.is_empty() {
            continue;
        }
        tracing::trace!(
            step,
            inside = tokens.len(),
            partial = partial.len(),
            "coarse scan hit"
        );
        tokens.extend(refine(classifier, &partial, level + 1, steps, factor)?);
        return Ok(tokens);
    }

    Ok(Vec::new())
}

fn refine<C>(
    classifier: &C,
    partial: &[Cell],
    level: usize,
    steps: &[f64],
    factor: u32,
) -> Result<Vec<Token>>
where
    C: CellClassifier + ?Sized,
{
    if partial.is_empty() {
        return Ok(Vec::new());
    }
    let Some(&step) = steps.get(level) else {
        return Ok(partial.iter().map(Cell::token).collect());
    };

    let mut tokens = Vec::new();
    let mut next = Vec::new();
    for cell in partial {
        for sub in cell.subdivide(factor, step) {
            match classifier.classify(&sub)? {
                CellState::Inside => tokens.push(sub.token()),
                CellState::Partial => next.push(sub),
                CellState::Outside => {}
            }
        }
    }
    tracing::trace!(step, inside = tokens.len(), partial = next.len(), "refined");

    tokens.extend(refine(classifier, &next, level + 1, steps, factor)?);
    Ok(tokens)
}

/// Axis-aligned rectangles classify cells by interval arithmetic.
///
/// Cells that only share an edge or corner with the rectangle are outside;
/// cells inside the rectangle may share its edges.
impl CellClassifier for BoundingBox {
    fn classify(&self, cell: &Cell) -> Result<CellState> {
        let overlap_x = round5(cell.max_x().min(self.max_x()) - cell.min_x().max(self.min_x()));
        let overlap_y = round5(cell.max_y().min(self.max_y()) - cell.min_y().max(self.min_y()));
        if overlap_x <= 0.0 || overlap_y <= 0.0 {
            return Ok(CellState::Outside);
        }

        let within = round5(cell.min_x()) >= round5(self.min_x())
            && round5(cell.max_x()) <= round5(self.max_x())
            && round5(cell.min_y()) >= round5(self.min_y())
            && round5(cell.max_y()) <= round5(self.max_y());
        Ok(if within { CellState::Inside } else { CellState::Partial })
    }
}

/// Tokens of every cell that contains `point`, one step at a time.
///
/// A point on a cell edge belongs to the cells on both sides of it (and to
/// all four cells around a corner), since any of them may be the one a range
/// was tokenized into. The same holds for every longitude the point can be
/// written as: a range east of 180 is gridded at `x + 360` and only then
/// wrapped, and for steps that do not divide 360 that lands on a different
/// cell than gridding at `x` would.
pub fn point_cells(point: Point, steps: &[f64]) -> Vec<Token> {
    let longitudes = longitude_aliases(point.x);
    let mut tokens = Vec::with_capacity(steps.len() * longitudes.len());
    for &step in steps {
        for &x in &longitudes {
            tokens.extend(cells_at(Point::new(x, point.y), step));
        }
    }
    dedup(tokens)
}

/// `x` first, then each shift by whole turns that a covered cell may use.
fn longitude_aliases(x: f64) -> Vec<f64> {
    let mut aliases = vec![x];
    for turns in [-1.0, 1.0, 2.0] {
        let shifted = round5(x + turns * 360.0);
        if (RAW_LONGITUDE_MIN..RAW_LONGITUDE_MAX).contains(&shifted) {
            aliases.push(shifted);
        }
    }
    aliases
}

fn cells_at(point: Point, step: f64) -> Vec<Token> {
    let x = floor_to_step(point.x, step);
    let y = round5(floor_to_step(point.y, step) + step);
    let on_x_edge = round5(point.x / step).fract() == 0.0;
    let on_y_edge = round5(point.y / step).fract() == 0.0;

    let mut tokens = vec![Cell::new(x, y, step).token()];
    if on_x_edge {
        tokens.push(Cell::new(round5(x - step), y, step).token());
    }
    if on_y_edge {
        tokens.push(Cell::new(x, round5(y - step), step).token());
        if on_x_edge {
            tokens.push(Cell::new(round5(x - step), round5(y - step), step).token());
        }
    }
    tokens
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepConfig;

    fn schedule() -> StepSchedule {
        StepSchedule::from_config(&StepConfig::exponential(2.0, 2, 8)).unwrap()
    }

    fn bbox(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            top_left: Point::new(min_x, max_y),
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    fn sorted(tokens: Vec<Token>) -> Vec<String> {
        let mut out: Vec<String> = tokens.into_iter().map(Token::into_string).collect();
        out.sort();
        out
    }

    #[test]
    fn covering_cells_align_to_step() {
        let cells = covering_cells(&bbox(-1.0, 0.0, 1.0, 3.0), 256.0).unwrap();
        assert_eq!(cells, vec![Cell::new(-256.0, 256.0, 256.0), Cell::new(0.0, 256.0, 256.0)]);

        let cells = covering_cells(&bbox(0.0, 0.0, 32.0, 32.0), 32.0).unwrap();
        assert_eq!(cells, vec![Cell::new(0.0, 32.0, 32.0)]);

        let cells = covering_cells(&bbox(1.0, -3.0, 3.0, -1.0), 2.0).unwrap();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0], Cell::new(0.0, 0.0, 2.0));
        assert_eq!(cells[3], Cell::new(2.0, -2.0, 2.0));
    }

    #[test]
    fn oversized_scan_is_an_error() {
        let err = covering_cells(&bbox(0.0, 0.0, 1e12, 1e12), 2.0).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidRange);

        let err = covering_cells(&bbox(-180.0, -90.0, 180.0, 90.0), 0.01).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidRange);
    }

    #[test]
    fn subdivide_column_major() {
        let cell = Cell::new(0.0, 8.0, 8.0);
        let subs: Vec<Cell> = cell.subdivide(2, 4.0).collect();
        assert_eq!(
            subs,
            vec![
                Cell::new(0.0, 8.0, 4.0),
                Cell::new(0.0, 4.0, 4.0),
                Cell::new(4.0, 8.0, 4.0),
                Cell::new(4.0, 4.0, 4.0),
            ]
        );
    }

    #[test]
    fn longitude_wraps() {
        assert_eq!(wrap_longitude(182.0), -178.0);
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(-182.0), 178.0);
        assert_eq!(Cell::new(182.0, 2.0, 2.0).token(), "-178,2^2");
    }

    #[test]
    fn rectangle_cell_states() {
        let rect = bbox(48.0, 0.0, 54.0, 6.0);
        assert_eq!(rect.classify(&Cell::new(48.0, 4.0, 4.0)).unwrap(), CellState::Inside);
        assert_eq!(rect.classify(&Cell::new(52.0, 4.0, 4.0)).unwrap(), CellState::Partial);
        // Shares the edge y = 6 only.
        assert_eq!(rect.classify(&Cell::new(48.0, 8.0, 2.0)).unwrap(), CellState::Outside);
        assert_eq!(rect.classify(&Cell::new(0.0, 256.0, 256.0)).unwrap(), CellState::Partial);
    }

    #[test]
    fn rectangle_cover() {
        let tokens = cover(&bbox(48.0, 0.0, 54.0, 6.0), &bbox(48.0, 0.0, 54.0, 6.0), &schedule())
            .unwrap();
        assert_eq!(
            sorted(tokens),
            vec!["48,4^4", "48,6^2", "50,6^2", "52,2^2", "52,4^2", "52,6^2"]
        );
    }

    #[test]
    fn rectangle_cover_exact_fit() {
        let rect = bbox(0.0, 0.0, 32.0, 32.0);
        let tokens = cover(&rect, &rect, &schedule()).unwrap();
        assert_eq!(sorted(tokens), vec!["0,32^32"]);
    }

    #[test]
    fn rectangle_cover_across_antimeridian() {
        let rect = bbox(178.0, 0.0, 184.0, 2.0);
        let tokens = cover(&rect, &rect, &schedule()).unwrap();
        assert_eq!(sorted(tokens), vec!["-178,2^2", "178,2^2", "180,2^2"]);
    }

    #[test]
    fn cover_needs_exponential_schedule() {
        let custom = StepSchedule::from_config(&StepConfig::customized(vec![4.0, 2.0])).unwrap();
        let rect = bbox(0.0, 0.0, 2.0, 2.0);
        assert!(cover(&rect, &rect, &custom).is_err());
    }

    #[test]
    fn point_cells_off_grid() {
        let tokens = point_cells(Point::new(2.4, 3.0), &[4.0, 2.0]);
        let strs: Vec<&str> = tokens.iter().map(Token::as_str).collect();
        assert_eq!(strs, vec!["0,4^4", "2,4^2"]);
    }

    #[test]
    fn point_cells_on_edges() {
        let steps = [8.0, 4.0, 2.0];
        let tokens = point_cells(Point::new(2.0, 3.0), &steps);
        let strs: Vec<&str> = tokens.iter().map(Token::as_str).collect();
        assert_eq!(strs, vec!["0,8^8", "0,4^4", "2,4^2", "0,4^2"]);

        let tokens = point_cells(Point::new(2.0, 2.0), &steps);
        assert_eq!(tokens.len(), 6);
        for expected in ["2,4^2", "0,4^2", "2,2^2", "0,2^2", "0,4^4", "0,8^8"] {
            assert!(tokens.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[test]
    fn point_cells_match_cells_east_of_180() {
        // The range side grids (180, 182) before wrapping, and keeps "180".
        let rect = bbox(178.0, 0.0, 184.0, 2.0);
        let east = cover(&rect, &rect, &schedule()).unwrap();
        let point = point_cells(Point::new(-179.0, 1.0), schedule().steps());
        assert!(point.iter().any(|t| t == "-180,2^2"));
        assert!(point.iter().any(|t| east.contains(t)));
    }

    #[test]
    fn point_cells_match_wrapped_coarse_cells() {
        // 16 does not divide 360: (176, 192) wraps to "176", but -179
        // floors to -192 and wraps to "168".
        let rect = bbox(176.0, -16.0, 192.0, 0.0);
        let sixteen = StepSchedule::from_config(&StepConfig::exponential(16.0, 2, 1)).unwrap();
        let range = cover(&rect, &rect, &sixteen).unwrap();
        assert_eq!(sorted(range.clone()), vec!["176,0^16"]);
        let point = point_cells(Point::new(-179.0, -1.0), &[16.0]);
        assert!(point.iter().any(|t| range.contains(t)));
        assert!(point.iter().any(|t| t == "168,0^16"));
    }

    #[test]
    fn longitude_aliases_stay_in_raw_span() {
        assert_eq!(longitude_aliases(10.0), vec![10.0, -350.0, 370.0]);
        assert_eq!(longitude_aliases(-300.0), vec![-300.0, 60.0, 420.0]);
        assert_eq!(longitude_aliases(300.0), vec![300.0, -60.0]);
    }
}
