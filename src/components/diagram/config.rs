/// CSS colours used when painting the diagram.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
	pub background: &'static str,
	pub node_fill: &'static str,
	pub node_text: &'static str,
	pub dimmed: &'static str,
	pub edge: &'static str,
	pub marker: &'static str,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: "#1a1a1a",
			node_fill: "#2b2b2b",
			node_text: "#d4c5a0",
			dimmed: "#4a4a4a",
			edge: "#d4c5a0",
			marker: "#ffffff",
		}
	}
}

/// Layout, routing and timing parameters of a diagram.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagramConfig {
	/// Column spacing for two columns or fewer.
	pub max_h_spacing: f64,
	/// Column spacing once `min_spacing_cols` columns are shown.
	pub min_h_spacing: f64,
	pub min_spacing_cols: u32,
	pub v_spacing: f64,
	pub node_min_width: f64,
	pub node_height: f64,
	/// Horizontal padding on each side of a label.
	pub node_padding: f64,
	/// Approximate advance of one label character.
	pub char_width: f64,
	/// Distance between a node border and the end of an edge.
	pub stand_off: f64,
	/// Vertical offset new nodes slide in from.
	pub enter_offset: f64,
	pub transition_ms: f64,
	pub exit_ms: f64,
	pub fade_in_ms: f64,
	pub marker_ms: f64,
	pub marker_radius: f64,
	pub theme: Theme,
}

impl Default for DiagramConfig {
	fn default() -> Self {
		Self {
			max_h_spacing: 220.0,
			min_h_spacing: 120.0,
			min_spacing_cols: 12,
			v_spacing: 80.0,
			node_min_width: 60.0,
			node_height: 32.0,
			node_padding: 12.0,
			char_width: 9.0,
			stand_off: 6.0,
			enter_offset: 12.0,
			transition_ms: 400.0,
			exit_ms: 250.0,
			fade_in_ms: 800.0,
			marker_ms: 200.0,
			marker_radius: 5.0,
			theme: Theme::default(),
		}
	}
}

impl DiagramConfig {
	/// Box width for a label of the given measured text width.
	pub fn node_width(&self, text_width: f64) -> f64 {
		(text_width + 2.0 * self.node_padding).max(self.node_min_width)
	}
}
