use std::time::Instant;

use anyhow::{bail, ensure, Result};
use clap::Parser;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use args::Args;
use section_format::{svg::SvgPreview, File};
use slicer::{diagnostics::TracingSink, mesh::load_mesh_file, pipeline::SectionPipeline};

mod args;

/// Largest difference between a written and a read back coordinate. The
/// file stores five decimals, so rounding alone can reach half of the last
/// place and parsing adds a little on top.
const CHECK_TOLERANCE: f64 = 1e-5;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = args.log_level();
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("fuselage_slicer", level)
        .with_target("slicer", level)
        .with_target("mesh_format", level)
        .with_target("section_format", level)
        .with_target("common", level);
    let format = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();

    let config = args.section_config()?;
    let output = args.output_path();

    let mesh = load_mesh_file(&args.mesh)?;
    mesh.report().log();

    let now = Instant::now();
    let pipeline = SectionPipeline::new(config);
    let sections = pipeline.run(&mesh, &mut TracingSink)?;
    if sections.is_empty() {
        bail!("No sections produced, check the slicing axis and minimum point count");
    }
    info!("Sliced in {:.2}s", now.elapsed().as_secs_f32());

    let file = File::new(sections);
    file.save(&output)?;

    if let Some(path) = &args.preview {
        SvgPreview::new(&file.sections).save(path)?;
    }

    if args.check {
        check(&file, &File::load(&output)?)?;
        info!("Read back `{}` without differences", output.display());
    }

    Ok(())
}

fn check(written: &File, read: &File) -> Result<()> {
    ensure!(
        written.sections.len() == read.sections.len(),
        "Wrote {} sections but read back {}",
        written.sections.len(),
        read.sections.len()
    );

    for (written, read) in written.sections.iter().zip(&read.sections) {
        ensure!(
            written.points.len() == read.points.len(),
            "Section {} has {} points but {} were read back",
            written.index,
            written.points.len(),
            read.points.len()
        );

        let difference = (written.points.iter().zip(&read.points))
            .map(|(a, b)| (a - b).amax())
            .fold(0.0, f64::max);
        ensure!(
            difference <= CHECK_TOLERANCE,
            "Section {} differs by {difference} after reading it back",
            written.index
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector2;
    use section_format::Section;

    use super::*;

    fn single(point: Vector2<f64>) -> File {
        File::new(vec![Section::new(1, 0.0, vec![point])])
    }

    #[test]
    fn rounding_at_the_last_decimal_passes() {
        let written = single(Vector2::new(12345.678905, -98765.432105));
        let read = File::parse(&written.serialize_to_string().unwrap()).unwrap();
        check(&written, &read).unwrap();
    }

    #[test]
    fn changed_sections_fail() {
        let written = single(Vector2::new(1.0, 2.0));
        assert!(check(&written, &single(Vector2::new(1.0, 2.001))).is_err());
        assert!(check(&written, &File::default()).is_err());
    }
}
