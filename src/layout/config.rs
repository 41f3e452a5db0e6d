//! Configuration for the layout engine

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::SheetError;

use super::types::Size;

/// Configuration options for packing and snapping
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Every packed position is a multiple of this
    pub grid_size: f64,

    /// Free space kept to the right of and below every stacked item.
    /// Must be a multiple of `grid_size`, since padded sizes are rounded
    /// up to the grid.
    pub gap: f64,

    /// Lower bound for the packing container width
    pub min_container_width: f64,

    /// Multiplier applied to the total padded item area before the square root
    pub area_factor: f64,

    /// Height of the bands used to recover reading order (rows)
    pub row_height: f64,

    /// Fallback size for widgets with no measurement, explicit size or kind size
    pub default_size: Size,

    /// Fallback sizes keyed by widget kind
    pub kind_sizes: HashMap<String, Size>,

    /// Maximum edge distance at which two widgets count as touching
    pub snap_tolerance: f64,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            grid_size: 10.0,
            gap: 10.0,
            min_container_width: 800.0,
            area_factor: 1.5,
            row_height: 50.0,
            default_size: Size::new(200.0, 120.0),
            kind_sizes: HashMap::new(),
            snap_tolerance: 15.0,
        }
    }
}

impl StackConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SheetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string. Missing keys keep their defaults.
    pub fn from_str(content: &str) -> Result<Self, SheetError> {
        let config: StackConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the packer cannot work with
    pub fn validate(&self) -> Result<(), SheetError> {
        let positive = [
            ("grid_size", self.grid_size),
            ("row_height", self.row_height),
            ("area_factor", self.area_factor),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SheetError::invalid_config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("gap", self.gap),
            ("min_container_width", self.min_container_width),
            ("snap_tolerance", self.snap_tolerance),
            ("default_size.width", self.default_size.width),
            ("default_size.height", self.default_size.height),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SheetError::invalid_config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let steps = self.gap / self.grid_size;
        if (steps - steps.round()).abs() > 1e-9 {
            return Err(SheetError::invalid_config(format!(
                "gap must be a multiple of grid_size ({}), got {}",
                self.grid_size, self.gap
            )));
        }

        for (kind, size) in &self.kind_sizes {
            if !size.width.is_finite() || !size.height.is_finite() {
                return Err(SheetError::invalid_config(format!(
                    "size for kind '{}' must be finite",
                    kind
                )));
            }
        }
        Ok(())
    }

    /// Fallback size for a widget kind, or the generic default
    pub fn fallback_size(&self, kind: Option<&str>) -> Size {
        kind.and_then(|k| self.kind_sizes.get(k))
            .copied()
            .unwrap_or(self.default_size)
    }

    /// Set the grid size
    pub fn with_grid_size(mut self, grid_size: f64) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Set the gap between stacked items
    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Set the minimum container width
    pub fn with_min_container_width(mut self, width: f64) -> Self {
        self.min_container_width = width;
        self
    }

    /// Set the generic fallback size
    pub fn with_default_size(mut self, width: f64, height: f64) -> Self {
        self.default_size = Size::new(width, height);
        self
    }

    /// Register a fallback size for a widget kind
    pub fn with_kind_size(mut self, kind: impl Into<String>, width: f64, height: f64) -> Self {
        self.kind_sizes.insert(kind.into(), Size::new(width, height));
        self
    }

    /// Set the touching tolerance
    pub fn with_snap_tolerance(mut self, tolerance: f64) -> Self {
        self.snap_tolerance = tolerance;
        self
    }
}
