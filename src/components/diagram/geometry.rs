//! Grid cell to viewport coordinate mapping.

use super::config::DiagramConfig;
use super::types::Point;

/// Logical grid dimensions and the viewport they are centred in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
	pub rows: u32,
	pub cols: u32,
	pub width: f64,
	pub height: f64,
}

impl Default for Grid {
	fn default() -> Self {
		Self {
			rows: 1,
			cols: 1,
			width: 800.0,
			height: 600.0,
		}
	}
}

/// Column spacing: `max_h_spacing` up to two columns, falling linearly to
/// `min_h_spacing` at `min_spacing_cols` and staying there.
pub fn horizontal_spacing(cols: u32, config: &DiagramConfig) -> f64 {
	let full = config.min_spacing_cols.max(3);
	if cols <= 2 {
		return config.max_h_spacing;
	}
	if cols >= full {
		return config.min_h_spacing;
	}
	let t = f64::from(cols - 2) / f64::from(full - 2);
	config.max_h_spacing + (config.min_h_spacing - config.max_h_spacing) * t
}

/// Anchor of cell `(row, col)`: the left edge and vertical centre of the box.
pub fn cell_anchor(row: i32, col: i32, grid: &Grid, config: &DiagramConfig) -> Point {
	let h = horizontal_spacing(grid.cols, config);
	let v = config.v_spacing;

	// Even row counts would centre between two rows, shifting everything half a cell.
	let rows = if grid.rows % 2 == 0 {
		grid.rows.saturating_sub(1)
	} else {
		grid.rows
	};
	let grid_w = h * f64::from(grid.cols.saturating_sub(1));
	let grid_h = v * f64::from(rows.saturating_sub(1));

	let origin_x = grid.width / 2.0 - grid_w / 2.0 - config.node_min_width / 2.0;
	let origin_y = grid.height / 2.0 - grid_h / 2.0;

	Point::new(
		origin_x + f64::from(col) * h,
		origin_y + f64::from(row) * v,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn grid(rows: u32, cols: u32) -> Grid {
		Grid {
			rows,
			cols,
			width: 1000.0,
			height: 600.0,
		}
	}

	#[test]
	fn spacing_interpolates_between_bounds() {
		let config = DiagramConfig::default();
		assert_eq!(horizontal_spacing(1, &config), config.max_h_spacing);
		assert_eq!(horizontal_spacing(2, &config), config.max_h_spacing);
		assert_eq!(horizontal_spacing(12, &config), config.min_h_spacing);
		assert_eq!(horizontal_spacing(40, &config), config.min_h_spacing);
		let mid = horizontal_spacing(7, &config);
		assert!((mid - 170.0).abs() < 1e-9, "got {mid}");
	}

	#[test]
	fn single_cell_is_centred() {
		let config = DiagramConfig::default();
		let p = cell_anchor(0, 0, &grid(1, 1), &config);
		assert_eq!(p, Point::new(500.0 - config.node_min_width / 2.0, 300.0));
	}

	#[test]
	fn even_row_count_uses_one_row_less() {
		let config = DiagramConfig::default();
		let two = cell_anchor(0, 0, &grid(2, 1), &config);
		let one = cell_anchor(0, 0, &grid(1, 1), &config);
		assert_eq!(two, one);
		let four = cell_anchor(0, 0, &grid(4, 1), &config);
		let three = cell_anchor(0, 0, &grid(3, 1), &config);
		assert_eq!(four, three);
	}

	#[test]
	fn columns_are_symmetric_around_centre() {
		let config = DiagramConfig::default();
		let g = grid(1, 3);
		let first = cell_anchor(0, 0, &g, &config);
		let last = cell_anchor(0, 2, &g, &config);
		let bias = config.node_min_width / 2.0;
		assert!(((first.x + bias) + (last.x + bias) - 1000.0).abs() < 1e-9);
	}
}
