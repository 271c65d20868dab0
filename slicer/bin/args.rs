use std::path::PathBuf;

use anyhow::Result;
use clap::{value_parser, ArgAction, Parser};
use common::config::{Axis, SectionConfig};
use tracing::level_filters::LevelFilter;

#[derive(Debug, Parser)]
/// Cuts a fuselage mesh into cross-sections and writes them as a `.data`
/// section file.
pub struct Args {
    #[arg(long)]
    /// Path to a .stl or .obj file.
    pub mesh: PathBuf,

    /// File to save the sections to. Gets a `.data` extension if it has none.
    pub output: PathBuf,

    #[arg(long, value_parser = value_parser!(u32).range(2..))]
    /// Number of slicing planes [default: 10].
    pub sections: Option<u32>,
    #[arg(long, value_parser = value_parser!(u32).range(10..))]
    /// Number of points every section is resampled to [default: 30].
    pub points: Option<u32>,
    #[arg(long)]
    /// Axis the slicing planes are perpendicular to, one of x, y or z
    /// [default: x].
    pub axis: Option<Axis>,
    #[arg(long)]
    /// Planes crossing the mesh at fewer points than this are skipped
    /// [default: 10].
    pub min_points: Option<usize>,
    #[arg(long)]
    /// Slice planes on all cores.
    pub parallel: bool,

    #[arg(long)]
    /// TOML file with section settings. Options given on the command line
    /// take precedence.
    pub config: Option<PathBuf>,
    #[arg(long)]
    /// Also write an SVG preview of the sections to this path.
    pub preview: Option<PathBuf>,
    #[arg(long)]
    /// Read the written file back and check it matches the sections.
    pub check: bool,

    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    /// Log more, repeat for even more.
    pub verbose: u8,
    #[arg(short, long, action = ArgAction::Count)]
    /// Log less, repeat to only log errors.
    pub quiet: u8,
}

impl Args {
    pub fn section_config(&self) -> Result<SectionConfig> {
        let mut config = match &self.config {
            Some(path) => SectionConfig::load(path)?,
            None => SectionConfig::default(),
        };

        if let Some(sections) = self.sections {
            config.sections = sections;
        }
        if let Some(points) = self.points {
            config.points_per_section = points;
        }
        if let Some(axis) = self.axis {
            config.axis = axis;
        }
        if let Some(min_points) = self.min_points {
            config.min_points = min_points;
        }
        config.parallel |= self.parallel;

        Ok(config)
    }

    pub fn output_path(&self) -> PathBuf {
        let mut output = self.output.clone();
        if output.extension().is_none() {
            output.set_extension("data");
        }
        output
    }

    pub fn log_level(&self) -> LevelFilter {
        match (self.verbose, self.quiet) {
            (0, 0) => LevelFilter::INFO,
            (1, _) => LevelFilter::DEBUG,
            (_, 0) => LevelFilter::TRACE,
            (_, 1) => LevelFilter::WARN,
            _ => LevelFilter::ERROR,
        }
    }
}
