//! Visual theming for the river.
//!
//! Colors for tiers, link kinds, markers, the year grid, and pulse glows.

use super::types::LinkType;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in [0, 1].
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with opacity `a`.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Parse a strict `#RRGGBB` string. Anything else is `None`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let digits = hex.strip_prefix('#')?;
		if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
		Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
	}

	/// Same color with opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Relative luminance in [0, 1], for picking label contrast.
	pub fn luminance(self) -> f64 {
		(0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64) / 255.0
	}

	/// CSS color string, hex when opaque.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fallback node colors, one per tier.
#[derive(Clone, Debug)]
pub struct TierPalette {
	/// Colors for tiers 1, 2, 3, and so on.
	pub colors: Vec<Color>,
}

impl TierPalette {
	/// Muted slate blues, darkest for the top tier.
	pub fn slate() -> Self {
		Self {
			colors: vec![
				Color::rgb(70, 110, 140),  // Deep blue
				Color::rgb(94, 129, 172),  // Steel blue
				Color::rgb(119, 158, 165), // Desaturated cyan
				Color::rgb(143, 163, 180), // Cool gray
			],
		}
	}

	/// Color for a 1-based tier; tiers beyond the palette reuse the last entry.
	pub fn for_tier(&self, tier: u32) -> Color {
		let index = (tier.max(1) as usize - 1).min(self.colors.len().saturating_sub(1));
		self.colors
			.get(index)
			.copied()
			.unwrap_or(Color::rgb(128, 128, 128))
	}
}

/// Background and year-grid style.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Canvas fill.
	pub color: Color,
	/// Year gridlines.
	pub grid_color: Color,
	/// Year labels.
	pub grid_label_color: Color,
}

/// Link stroke colors by transition kind.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	/// Legal transfers.
	pub legal_transfer: Color,
	/// Spiritual successions.
	pub spiritual_succession: Color,
	/// Merges.
	pub merge: Color,
	/// Splits.
	pub split: Color,
	/// Spiritual successions are drawn dashed (dash, gap) in screen pixels.
	pub succession_dash: (f64, f64),
}

impl LinkStyle {
	/// Stroke color for `link_type`.
	pub fn color(&self, link_type: LinkType) -> Color {
		match link_type {
			LinkType::LegalTransfer => self.legal_transfer,
			LinkType::SpiritualSuccession => self.spiritual_succession,
			LinkType::Merge => self.merge,
			LinkType::Split => self.split,
		}
	}
}

/// Node bar style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Bar outline.
	pub border_color: Color,
	/// Label on dark fills.
	pub label_light: Color,
	/// Label on light fills.
	pub label_dark: Color,
	/// Sponsors drawn as stripes at most; the rest merge into the last one.
	pub max_stripes: usize,
}

/// Same-lane marker style.
#[derive(Clone, Debug)]
pub struct MarkerStyle {
	/// Marker fill.
	pub fill: Color,
	/// Marker outline.
	pub stroke: Color,
}

/// Pulse glow style.
#[derive(Clone, Debug)]
pub struct PulseStyle {
	/// Glow and outline color.
	pub color: Color,
	/// Shadow blur in screen pixels at full intensity.
	pub glow_blur: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Display name.
	pub name: &'static str,
	/// Canvas and year grid.
	pub background: BackgroundStyle,
	/// Link strokes.
	pub link: LinkStyle,
	/// Node bars.
	pub node: NodeStyle,
	/// Same-lane markers.
	pub marker: MarkerStyle,
	/// Pulse glow.
	pub pulse: PulseStyle,
	/// Fallback fills when a node has no sponsor colors.
	pub palette: TierPalette,
}

impl Theme {
	/// Dark theme with muted tier colors (default)
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				grid_color: Color::rgba(140, 160, 180, 0.12),
				grid_label_color: Color::rgba(140, 160, 180, 0.6),
			},
			link: LinkStyle {
				legal_transfer: Color::rgba(140, 160, 180, 0.6),
				spiritual_succession: Color::rgba(150, 140, 190, 0.55),
				merge: Color::rgba(110, 170, 140, 0.6),
				split: Color::rgba(200, 150, 110, 0.6),
				succession_dash: (6.0, 4.0),
			},
			node: NodeStyle {
				border_color: Color::rgba(255, 255, 255, 0.15),
				label_light: Color::rgb(235, 238, 242),
				label_dark: Color::rgb(25, 28, 35),
				max_stripes: 4,
			},
			marker: MarkerStyle {
				fill: Color::rgb(230, 200, 120),
				stroke: Color::rgb(22, 27, 34),
			},
			pulse: PulseStyle {
				color: Color::rgb(255, 214, 102),
				glow_blur: 14.0,
			},
			palette: TierPalette::slate(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
