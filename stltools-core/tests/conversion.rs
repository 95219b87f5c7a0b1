use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use stltools_core::{
    convert_file, derive_output_path, read_binary_stl, BoundingBox, ConvertOptions, Error,
};

const CUBE_CORNER: &str = "solid corner
  facet normal 0 0 -1
    outer loop
      vertex 0 0 0
      vertex 0 1 0
      vertex 1 0 0
    endloop
  endfacet
  facet normal -1 0 0
    outer loop
      vertex 0 0 0
      vertex 0 0 1
      vertex 0 1 0
    endloop
  endfacet
  facet normal 0 -1 0
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 0 1
    endloop
  endfacet
  facet normal 5.773503e-01 5.773503e-01 5.773503e-01
    outer loop
      vertex 1.0 0.0 0.0
      vertex 0.0 1.0 0.0
      vertex 0.0 0.0 1.0
    endloop
  endfacet
endsolid corner
";

fn write_input(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_count_and_size() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "corner.stl", CUBE_CORNER);
    let output = dir.path().join("corner-binary.stl");

    let report = convert_file(&input, &output, &ConvertOptions::default()).unwrap();
    assert_eq!(report.declared, 4);
    assert!(report.is_consistent());

    let bytes = fs::read(&output).unwrap();
    assert_eq!(bytes.len(), 80 + 4 + 50 * 4);
    assert_eq!(report.encoded.bytes_written, bytes.len() as u64);
    assert_eq!(&bytes[80..84], &4u32.to_le_bytes());
}

#[test]
fn test_read_back_geometry() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "corner.stl", CUBE_CORNER);
    let output = dir.path().join("out.stl");
    convert_file(&input, &output, &ConvertOptions::default()).unwrap();

    let stl = read_binary_stl(fs::File::open(&output).unwrap()).unwrap();
    assert_eq!(stl.triangles.len(), 4);

    let slanted = &stl.triangles[3];
    assert_relative_eq!(slanted.normal.norm(), 1.0, epsilon = 1e-6);
    // Winding order is preserved.
    assert_eq!(slanted.vertices[0].x, 1.0);
    assert_eq!(slanted.vertices[1].y, 1.0);
    assert_eq!(slanted.vertices[2].z, 1.0);

    let bounds = BoundingBox::of(&stl.triangles).unwrap();
    assert_relative_eq!(bounds.size().x, 1.0);
    assert_relative_eq!(bounds.size().y, 1.0);
    assert_relative_eq!(bounds.size().z, 1.0);
}

#[test]
fn test_reencoding_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "corner.stl", CUBE_CORNER);
    let first = dir.path().join("first.stl");
    let second = dir.path().join("second.stl");

    convert_file(&input, &first, &ConvertOptions::default()).unwrap();
    convert_file(&input, &second, &ConvertOptions::default().with_atomic(false)).unwrap();
    assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
}

#[test]
fn test_empty_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "empty.stl", "solid empty\nendsolid empty\n");
    let output = dir.path().join("empty-binary.stl");

    let report = convert_file(&input, &output, &ConvertOptions::default()).unwrap();
    assert_eq!(report.declared, 0);

    let bytes = fs::read(&output).unwrap();
    assert_eq!(bytes.len(), 84);
    assert_eq!(&bytes[80..84], &[0u8; 4]);
}

#[test]
fn test_windows_line_endings() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "crlf.stl", &CUBE_CORNER.replace('\n', "\r\n"));
    let output = dir.path().join("crlf-binary.stl");

    let report = convert_file(&input, &output, &ConvertOptions::default()).unwrap();
    assert_eq!(report.declared, 4);
    assert!(report.is_consistent());
}

#[test]
fn test_header_text() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "corner.stl", CUBE_CORNER);
    let output = dir.path().join("out.stl");
    let options = ConvertOptions::default().with_header_text("corner piece");
    convert_file(&input, &output, &options).unwrap();

    let stl = read_binary_stl(fs::File::open(&output).unwrap()).unwrap();
    assert_eq!(stl.header_text(), "corner piece");
}

#[test]
fn test_incomplete_facet_is_reported() {
    let truncated = "solid broken
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
";
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "broken.stl", truncated);
    let output = dir.path().join("broken-binary.stl");

    let report = convert_file(&input, &output, &ConvertOptions::default()).unwrap();
    assert_eq!(report.declared, 1);
    assert_eq!(report.encoded.records, 0);
    assert!(!report.is_consistent());
    assert_eq!(fs::read(&output).unwrap().len(), 84 + 12 + 24);
}

#[test]
fn test_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.stl");
    let output = dir.path().join("missing-binary.stl");

    let err = convert_file(&input, &output, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InputNotFound { .. }));
    assert!(!output.exists());
}

#[test]
fn test_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "corner.stl", CUBE_CORNER);
    let output = dir.path().join("no-such-dir").join("out.stl");

    for options in [
        ConvertOptions::default(),
        ConvertOptions::default().with_atomic(false),
    ] {
        let err = convert_file(&input, &output, &options).unwrap_err();
        assert!(matches!(err, Error::OutputWrite { .. }), "{err}");
    }
}

#[test]
fn test_atomic_failure_keeps_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.stl");
    fs::write(&output, b"previous").unwrap();

    let err = convert_file(
        dir.path().join("missing.stl"),
        &output,
        &ConvertOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InputNotFound { .. }));
    assert_eq!(fs::read(&output).unwrap(), b"previous");

    // Only the destination remains; no temporary files are left behind.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_missing_suffix_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "corner.txt", CUBE_CORNER);

    let err = derive_output_path(&input).unwrap_err();
    assert!(matches!(err, Error::FormatMismatch { .. }));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_directory_input_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("adir.stl");
    fs::create_dir(&input).unwrap();
    let output = dir.path().join("adir-binary.stl");

    for options in [
        ConvertOptions::default(),
        ConvertOptions::default().with_atomic(false),
    ] {
        let err = convert_file(&input, &output, &options).unwrap_err();
        assert!(matches!(err, Error::InputNotFound { .. }), "{err:?}");
        assert!(!output.exists());
    }
}

#[cfg(unix)]
#[test]
fn test_permission_denied_input_is_unreadable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "locked.stl", CUBE_CORNER);
    fs::set_permissions(&input, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::File::open(&input).is_ok() {
        // Running with privileges that bypass file modes.
        return;
    }

    let output = dir.path().join("locked-binary.stl");
    let err = convert_file(&input, &output, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InputNotFound { .. }), "{err:?}");
    assert!(!output.exists());
}
