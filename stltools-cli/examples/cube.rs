/// Example: Write an ASCII STL cube, convert it and inspect the result
///
/// Usage: cargo run --example cube -- [path/to/cube.stl]

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use stltools_core::{convert_file, derive_output_path, read_binary_stl, ConvertOptions};

/// Corners of each face (counter-clockwise seen from outside) and its normal
const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    ([0.0, 0.0, 1.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
    ([0.0, 0.0, -1.0], [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]]),
    ([0.0, 1.0, 0.0], [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]]),
    ([0.0, -1.0, 0.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]]),
    ([1.0, 0.0, 0.0], [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]]),
    ([-1.0, 0.0, 0.0], [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]]),
];

fn cube_ascii(size: f32) -> String {
    let half = size / 2.0;
    let mut out = String::from("solid cube\n");
    for (normal, [a, b, c, d]) in FACES {
        for triangle in [[a, b, c], [a, c, d]] {
            let _ = writeln!(out, "  facet normal {} {} {}", normal[0], normal[1], normal[2]);
            out.push_str("    outer loop\n");
            for v in triangle {
                let _ = writeln!(out, "      vertex {} {} {}", v[0] * half, v[1] * half, v[2] * half);
            }
            out.push_str("    endloop\n  endfacet\n");
        }
    }
    out.push_str("endsolid cube\n");
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("cube.stl"));

    fs::write(&input, cube_ascii(2.0))?;
    println!("Wrote ASCII cube: {}", input.display());

    let output = derive_output_path(&input)?;
    let report = convert_file(&input, &output, &ConvertOptions::default())?;
    println!(
        "Converted {} triangles ({} bytes) to {}",
        report.declared,
        report.encoded.bytes_written,
        output.display()
    );

    let stl = read_binary_stl(io::BufReader::new(fs::File::open(&output)?))?;
    let color = io::stdout().is_terminal();
    stltools_cli::report::print_summary(&mut io::stdout(), &output, &stl, color)?;
    Ok(())
}
