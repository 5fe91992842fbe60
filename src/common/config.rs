use serde::{Deserialize, Serialize};

use crate::layout_engine::CompactKind;

/// Engine configuration as declared by the consumer. All fields have
/// defaults so a partial TOML document (or `GridConfig::default()`) is
/// enough to drive the engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    /// Grid cell size in pixels, `[width, height]`.
    #[serde(default = "default_grid")]
    pub grid: [f64; 2],
    /// Container padding in pixels, `[x, y]`.
    #[serde(default)]
    pub container_padding: [f64; 2],
    /// Container width in pixels. Column count and column width derive
    /// from this and `grid`.
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_max_rows")]
    pub max_rows: f64,
    /// Linear zoom factor folded into pixel positions.
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub compact: CompactKind,
    #[serde(default = "yes")]
    pub draggable: bool,
    #[serde(default = "yes")]
    pub resizable: bool,
}

fn yes() -> bool { true }
fn default_grid() -> [f64; 2] { [10.0, 10.0] }
fn default_width() -> f64 { 1200.0 }
fn default_max_rows() -> f64 { f64::INFINITY }
fn default_scale() -> f64 { 1.0 }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid: default_grid(),
            container_padding: [0.0, 0.0],
            width: default_width(),
            max_rows: default_max_rows(),
            scale: default_scale(),
            compact: CompactKind::default(),
            draggable: true,
            resizable: true,
        }
    }
}

impl GridConfig {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let config: GridConfig = toml::from_str(raw)?;
        if config.grid[0] <= 0.0 || config.grid[1] <= 0.0 {
            anyhow::bail!("grid cell size must be positive: {:?}", config.grid);
        }
        if config.width <= 0.0 {
            anyhow::bail!("container width must be positive: {}", config.width);
        }
        Ok(config)
    }

    /// Column count: `ceil(width / cell_width)`.
    pub fn cols(&self) -> f64 {
        crate::layout_engine::geometry::cols_for_width(self.width, self.grid[0])
    }

    /// Width of one column after padding is taken out of the container.
    pub fn col_width(&self) -> f64 {
        crate::layout_engine::geometry::col_width(self.width, self.grid[0], self.container_padding[0])
    }

    pub fn padding(&self) -> crate::layout_engine::geometry::Padding {
        crate::layout_engine::geometry::Padding {
            x: self.container_padding[0],
            y: self.container_padding[1],
        }
    }
}
