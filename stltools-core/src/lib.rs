/// stltools core library - ASCII STL to binary STL conversion
///
/// Conversion runs in two passes over the input: the first counts facets for
/// the binary header, the second streams every normal, vertex and attribute
/// field straight to the output without holding the mesh in memory.

pub mod convert;
pub mod error;
pub mod geometry;
pub mod line;
pub mod stl;

// Re-export commonly used types
pub use convert::{convert_file, derive_output_path, ConversionReport, ConvertOptions};
pub use error::{Error, Result};
pub use geometry::{BoundingBox, Triangle};
pub use stl::{count_triangles, encode, read_binary_stl, BinaryStl, EncodeSummary};
