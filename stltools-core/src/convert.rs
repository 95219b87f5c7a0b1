/// File-to-file conversion: counting pass, then encoding pass
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::stl::{count_triangles, encode, EncodeSummary, HEADER_SIZE};

const ASCII_SUFFIX: &str = ".stl";
const BINARY_SUFFIX: &str = "-binary.stl";

/// Conversion settings
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Raw header bytes, zero-filled by default.
    pub header: [u8; HEADER_SIZE],
    /// Write to a temporary file next to the destination and rename it into
    /// place once complete. When off, a failed conversion can leave a
    /// truncated destination behind.
    pub atomic: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            header: [0; HEADER_SIZE],
            atomic: true,
        }
    }
}

impl ConvertOptions {
    /// Use `text` as the header, truncated to 80 bytes and zero padded.
    pub fn with_header_text(mut self, text: &str) -> Self {
        let bytes = text.as_bytes();
        let len = bytes.len().min(HEADER_SIZE);
        self.header = [0; HEADER_SIZE];
        self.header[..len].copy_from_slice(&bytes[..len]);
        self
    }

    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }
}

/// Outcome of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionReport {
    /// Triangle count written to the header (from the counting pass).
    pub declared: u32,
    pub encoded: EncodeSummary,
}

impl ConversionReport {
    /// Whether the records written agree with the declared count, i.e. every
    /// facet had one normal, three vertices and one `endloop`.
    pub fn is_consistent(&self) -> bool {
        let records = self.encoded.records;
        u64::from(self.declared) == records
            && self.encoded.normals == records
            && self.encoded.vertices == records * 3
    }
}

/// Default output path: `name.stl` becomes `name-binary.stl`.
pub fn derive_output_path(input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(ASCII_SUFFIX))
        .ok_or_else(|| Error::FormatMismatch {
            path: input.to_path_buf(),
        })?;
    Ok(input.with_file_name(format!("{stem}{BINARY_SUFFIX}")))
}

/// Convert the ASCII STL at `input` to a binary STL at `output`.
pub fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    let input = input.as_ref();
    let output = output.as_ref();

    let declared = count_triangles(open_input(input)?)?;
    debug!(input = %input.display(), declared, "counting pass complete");

    let encoded = if options.atomic {
        encode_atomic(input, output, options, declared)?
    } else {
        encode_direct(input, output, options, declared)?
    };

    let report = ConversionReport { declared, encoded };
    if !report.is_consistent() {
        warn!(
            declared,
            normals = encoded.normals,
            vertices = encoded.vertices,
            records = encoded.records,
            "triangle records do not match the header count; output may be unreadable"
        );
    }
    info!(
        input = %input.display(),
        output = %output.display(),
        triangles = declared,
        bytes = encoded.bytes_written,
        "converted to binary STL"
    );
    Ok(report)
}

/// Open the ASCII input. Directories and other non-regular files open fine
/// on some platforms but fail on the first read, so they are rejected here.
fn open_input(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| Error::open_input(path, e))?;
    let metadata = file.metadata().map_err(|e| Error::open_input(path, e))?;
    if !metadata.is_file() {
        return Err(Error::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(BufReader::new(file))
}

fn encode_direct(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
    declared: u32,
) -> Result<EncodeSummary> {
    let reader = open_input(input)?;
    let file = File::create(output).map_err(|e| Error::output(output, e))?;
    let mut writer = BufWriter::new(file);
    encode(reader, &mut writer, &options.header, declared).map_err(|e| e.at_output(output))
}

fn encode_atomic(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
    declared: u32,
) -> Result<EncodeSummary> {
    let reader = open_input(input)?;
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Dropping the temporary file on any error path deletes it.
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::output(output, e))?;
    default_permissions(tmp.as_file()).map_err(|e| Error::output(output, e))?;

    let summary = {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        encode(reader, &mut writer, &options.header, declared)
            .map_err(|e| e.at_output(output))?
    };

    tmp.persist(output)
        .map_err(|e| Error::output(output, e.error))?;
    debug!(output = %output.display(), "moved temporary output into place");
    Ok(summary)
}

/// Temporary files are created owner-only; give the result the usual mode.
#[cfg(unix)]
fn default_permissions(file: &File) -> io::Result<()> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}
