//! The fixed-width `.data` section file read by downstream aerodynamic tools,
//! along with an SVG preview of the same sections.

mod file;
mod header;
mod section;
pub mod svg;

pub use file::File;
pub use header::{HEADER, SECTION_COLUMNS};
pub use section::Section;
