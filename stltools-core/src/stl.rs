/// Binary STL encoding from ASCII STL lines, and binary STL reading
///
/// ```text
/// UINT8[80]    header
/// UINT32       triangle count
/// foreach triangle
///     REAL32[3] normal
///     REAL32[3] vertex 1
///     REAL32[3] vertex 2
///     REAL32[3] vertex 3
///     UINT16    attribute byte count (0)
/// ```
use std::io::{self, BufRead, Read, Write};

use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::Triangle;
use crate::line::{classify_line, for_each_line, is_facet_normal, StlLine};

pub const HEADER_SIZE: usize = 80;

/// Size of one triangle record (12 floats + attribute byte count).
pub const RECORD_SIZE: usize = 50;

/// Offset of the first record.
pub const DATA_OFFSET: usize = HEADER_SIZE + 4;

/// Count the facet normal declarations in an ASCII STL.
pub fn count_triangles<R: BufRead>(reader: R) -> Result<u32> {
    let mut count: u64 = 0;
    for_each_line(reader, |line| {
        if is_facet_normal(line) {
            count += 1;
        }
        Ok(())
    })?;

    debug!(count, "counted facets");
    u32::try_from(count).map_err(|_| Error::TooManyTriangles { count })
}

/// What the encoding pass actually emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    pub normals: u64,
    pub vertices: u64,
    /// Attribute fields written, one per `endloop`.
    pub records: u64,
    pub bytes_written: u64,
}

/// Write the binary STL for `reader` to `writer`, declaring `triangle_count`
/// in the header.
///
/// Lines are encoded as they are read. Nothing checks that facets are well
/// formed, so a malformed input yields a binary whose records do not line up
/// with the declared count.
pub fn encode<R, W>(
    reader: R,
    writer: &mut W,
    header: &[u8; HEADER_SIZE],
    triangle_count: u32,
) -> Result<EncodeSummary>
where
    R: BufRead,
    W: Write,
{
    let mut out = CountingWriter::new(writer);
    out.write_all(header).map_err(Error::Write)?;
    out.write_all(&triangle_count.to_le_bytes())
        .map_err(Error::Write)?;

    let mut summary = EncodeSummary::default();
    for_each_line(reader, |line| {
        match classify_line(line) {
            StlLine::FacetNormal(normal) => {
                write_floats(&mut out, &normal).map_err(Error::Write)?;
                summary.normals += 1;
            }
            StlLine::Vertex(position) => {
                write_floats(&mut out, &position).map_err(Error::Write)?;
                summary.vertices += 1;
            }
            StlLine::EndLoop => {
                out.write_all(&0u16.to_le_bytes())
                    .map_err(Error::Write)?;
                summary.records += 1;
            }
            StlLine::Other => {}
        }
        Ok(())
    })?;
    out.flush().map_err(Error::Write)?;

    summary.bytes_written = out.written;
    debug!(?summary, "encoded facets");
    Ok(summary)
}

fn write_floats<W: Write>(out: &mut W, values: &[f32; 3]) -> io::Result<()> {
    for value in values {
        out.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Tracks the byte position of the output stream.
struct CountingWriter<'a, W> {
    inner: &'a mut W,
    written: u64,
}

impl<'a, W: Write> CountingWriter<'a, W> {
    fn new(inner: &'a mut W) -> Self {
        Self { inner, written: 0 }
    }
}

impl<W: Write> Write for CountingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A fully read binary STL
#[derive(Debug, Clone)]
pub struct BinaryStl {
    pub header: [u8; HEADER_SIZE],
    pub triangles: Vec<Triangle>,
}

impl BinaryStl {
    /// Header bytes up to the first NUL, as text.
    pub fn header_text(&self) -> String {
        let end = self
            .header
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(HEADER_SIZE);
        String::from_utf8_lossy(&self.header[..end]).into_owned()
    }
}

/// Parse a binary STL stream.
pub fn read_binary_stl<R: Read>(mut reader: R) -> Result<BinaryStl> {
    let mut preamble = [0u8; DATA_OFFSET];
    let got = read_up_to(&mut reader, &mut preamble)?;
    if got < DATA_OFFSET {
        return Err(Error::InvalidHeader {
            expected: DATA_OFFSET,
            got,
        });
    }

    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&preamble[..HEADER_SIZE]);
    let triangle_count = u32::from_le_bytes([
        preamble[HEADER_SIZE],
        preamble[HEADER_SIZE + 1],
        preamble[HEADER_SIZE + 2],
        preamble[HEADER_SIZE + 3],
    ]);

    // The declared count is untrusted; cap the preallocation.
    let mut triangles = Vec::with_capacity(triangle_count.min(1 << 16) as usize);
    let mut record = [0u8; RECORD_SIZE];
    for i in 0..triangle_count {
        read_or_truncated(&mut reader, &mut record, triangle_count, i)?;

        let mut values = [0f32; 12];
        for (value, bytes) in values.iter_mut().zip(record.chunks_exact(4)) {
            *value = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        // Skip attribute byte count (2 bytes)
        triangles.push(Triangle::from_floats(&values));
    }

    Ok(BinaryStl { header, triangles })
}

/// Fill as much of `buf` as the stream holds, returning the bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(filled)
}

fn read_or_truncated<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    expected: u32,
    got: u32,
) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::Truncated { expected, got }
        } else {
            Error::Io(e)
        }
    })
}
