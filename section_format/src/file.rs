use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{bail, ensure, Context, Result};
use nalgebra::Vector2;
use tracing::info;

use crate::{Section, HEADER, SECTION_COLUMNS};

/// A complete section file: the fixed header followed by one point block per
/// section, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct File {
    pub sections: Vec<Section>,
}

impl File {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Writes the file. A failing writer leaves a truncated file behind, which
    /// is fine as exporting can just be repeated.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(HEADER.as_bytes())?;
        for section in &self.sections {
            write_section(writer, section)?;
        }
        writer.flush()
    }

    pub fn serialize_to_string(&self) -> io::Result<String> {
        let mut out = Vec::new();
        self.serialize(&mut out)?;
        String::from_utf8(out).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        info!("Exporting {} sections to `{}`", self.sections.len(), path.display());

        let file = fs::File::create(path)
            .with_context(|| format!("Failed to create `{}`", path.display()))?;
        self.serialize(&mut BufWriter::new(file))
            .with_context(|| format!("Failed to write `{}`", path.display()))?;

        info!("Saved `{}`", path.display());
        Ok(())
    }

    /// Reads a section file back. The format doesn't store the plane positions
    /// or indices, so sections are numbered `1..=n` and their axis position is
    /// `NaN`.
    pub fn parse(text: &str) -> Result<Self> {
        let Some(body) = text.strip_prefix(HEADER) else {
            bail!("Missing or modified section file header");
        };

        let header_lines = HEADER.lines().count();
        let mut sections = Vec::<Section>::new();
        for (idx, line) in body.lines().enumerate() {
            let line_number = header_lines + idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            if line.trim_end() == SECTION_COLUMNS {
                let index = sections.len() as u32 + 1;
                sections.push(Section::new(index, f64::NAN, Vec::new()));
                continue;
            }

            let section = sections
                .last_mut()
                .with_context(|| format!("Point before first section on line {line_number}"))?;
            let point = parse_point(line)
                .with_context(|| format!("Invalid point on line {line_number}"))?;
            section.points.push(point);
        }

        Ok(Self { sections })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read `{}`", path.display()))?;
        Self::parse(&text)
    }
}

fn write_section<W: Write>(writer: &mut W, section: &Section) -> io::Result<()> {
    writeln!(writer, "{SECTION_COLUMNS}")?;
    for point in &section.points {
        writeln!(writer, "  {:8.5}   {:8.5}", point.x, point.y)?;
    }
    Ok(())
}

fn parse_point(line: &str) -> Result<Vector2<f64>> {
    let mut parts = line.split_whitespace();
    let mut next = || -> Result<f64> {
        let part = parts.next().context("Missing coordinate")?;
        Ok(part.parse()?)
    };

    let point = Vector2::new(next()?, next()?);
    ensure!(parts.next().is_none(), "Too many coordinates");
    Ok(point)
}
