//! Events reported while slicing. The pipeline never logs directly; it hands
//! every event to a [`DiagnosticSink`] so callers can log, collect or ignore
//! them.

use std::{fmt, ops::Range};

use common::config::Axis;
use tracing::{info, warn};

use crate::resample::FitError;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    Started {
        sections: u32,
        axis: Axis,
        range: Range<f64>,
    },
    /// The plane doesn't touch the mesh.
    NoIntersection { index: u32, position: f64 },
    /// The plane crosses the mesh at too few points to make a section.
    TooFewPoints {
        index: u32,
        position: f64,
        count: usize,
        required: usize,
    },
    /// The spline fit failed and the section was sampled linearly.
    LinearFallback {
        index: u32,
        position: f64,
        reason: FitError,
    },
    SectionProduced {
        index: u32,
        position: f64,
        raw_points: usize,
    },
    Finished { produced: usize, requested: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
}

pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`, at a level matching their severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::NoIntersection { .. }
            | Diagnostic::TooFewPoints { .. }
            | Diagnostic::LinearFallback { .. } => Severity::Warning,
            Diagnostic::SectionProduced { .. } => Severity::Debug,
            Diagnostic::Started { .. } | Diagnostic::Finished { .. } => Severity::Info,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Started {
                sections,
                axis,
                range,
            } => write!(
                f,
                "Slicing {sections} sections along {axis} from {:.5} to {:.5}",
                range.start, range.end
            ),
            Diagnostic::NoIntersection { index, position } => {
                write!(f, "Section {index} at {position:.5}: plane misses the mesh")
            }
            Diagnostic::TooFewPoints {
                index,
                position,
                count,
                required,
            } => write!(
                f,
                "Section {index} at {position:.5}: only {count} intersection points, need {required}"
            ),
            Diagnostic::LinearFallback {
                index,
                position,
                reason,
            } => write!(
                f,
                "Section {index} at {position:.5}: spline fit failed ({reason}), using linear interpolation"
            ),
            Diagnostic::SectionProduced {
                index,
                position,
                raw_points,
            } => write!(
                f,
                "Section {index} at {position:.5}: {raw_points} intersection points"
            ),
            Diagnostic::Finished {
                produced,
                requested,
            } => write!(f, "Produced {produced} of {requested} sections"),
        }
    }
}

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Debug => tracing::debug!("{diagnostic}"),
            Severity::Info => info!("{diagnostic}"),
            Severity::Warning => warn!("{diagnostic}"),
        }
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic);
    }
}
