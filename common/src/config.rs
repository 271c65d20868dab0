use std::{fmt, fs, path::Path, str::FromStr};

use anyhow::{bail, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Parameters for cutting a mesh into cross-sections.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SectionConfig {
    /// Axis the slicing planes are perpendicular to.
    pub axis: Axis,
    /// Number of evenly spaced slicing planes.
    pub sections: u32,
    /// Number of points every emitted section is resampled to.
    pub points_per_section: u32,
    /// Planes whose intersection has fewer points than this are skipped.
    pub min_points: usize,
    /// Fraction of the mesh extent the first and last plane are moved inwards
    /// by, so they don't graze the mesh boundary.
    pub inset_fraction: f64,
    /// Slice planes on the rayon thread pool.
    pub parallel: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl SectionConfig {
    /// Loads a config from a TOML file. Missing fields use their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let file = fs::read(path)?;
        let string = String::from_utf8_lossy(&file);
        let config = toml::from_str(&string)?;
        info!("Loaded section config from `{}`", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let string = toml::to_string(self)?;
        fs::write(path, string)?;
        Ok(())
    }
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index of this axis in a 3D vector.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Indices of the two coordinates left over once this axis is dropped, in
    /// ascending order. For X sections these are the (Y, Z) coordinates.
    pub fn others(self) -> [usize; 2] {
        match self {
            Axis::X => [1, 2],
            Axis::Y => [0, 2],
            Axis::Z => [0, 1],
        }
    }

    pub fn unit(self) -> Vector3<f64> {
        let mut out = Vector3::zeros();
        out[self.index()] = 1.0;
        out
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "x" => Axis::X,
            "y" => Axis::Y,
            "z" => Axis::Z,
            _ => bail!("Unknown axis `{s}`, expected one of x, y or z"),
        })
    }
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            axis: Axis::X,
            sections: 10,
            points_per_section: 30,
            min_points: 10,
            inset_fraction: 0.01,
            parallel: false,
        }
    }
}
