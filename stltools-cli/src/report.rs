/// Terminal output: binary STL summaries and error diagnostics
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use stltools_core::{BinaryStl, BoundingBox};

/// Print a labelled summary of a binary STL. Labels are coloured only when
/// `color` is set.
pub fn print_summary<W: Write>(
    out: &mut W,
    path: &Path,
    stl: &BinaryStl,
    color: bool,
) -> io::Result<()> {
    let mut field = |label: &str, value: &dyn Display| print_field(out, label, value, color);
    field("file", &path.display())?;
    field("header", &stl.header_text())?;
    field("triangles", &stl.triangles.len())?;

    match BoundingBox::of(&stl.triangles) {
        Some(bounds) => {
            let size = bounds.size();
            field("size", &format!("{} x {} x {}", size.x, size.y, size.z))?;
            field(
                "min",
                &format!("({}, {}, {})", bounds.min.x, bounds.min.y, bounds.min.z),
            )?;
            field(
                "max",
                &format!("({}, {}, {})", bounds.max.x, bounds.max.y, bounds.max.z),
            )?;
        }
        None => field("size", &"empty")?,
    }

    out.flush()
}

fn print_field<W: Write>(
    out: &mut W,
    label: &str,
    value: &dyn Display,
    color: bool,
) -> io::Result<()> {
    let label = format!("{:>10}:", label);
    if color {
        queue!(out, SetForegroundColor(Color::Cyan), Print(label), ResetColor)?;
    } else {
        queue!(out, Print(label))?;
    }
    queue!(out, Print(format!(" {}\n", value)))
}

/// Print an error and its causes to stderr, in red on a terminal.
pub fn print_error(error: &anyhow::Error) {
    let mut stderr = io::stderr();
    let color = stderr.is_terminal();
    // Nothing sensible is left to do if stderr itself fails.
    let _ = write_error(&mut stderr, error, color);
}

fn write_error<W: Write>(out: &mut W, error: &anyhow::Error, color: bool) -> io::Result<()> {
    if color {
        queue!(out, SetForegroundColor(Color::Red), Print("error:"), ResetColor)?;
    } else {
        queue!(out, Print("error:"))?;
    }
    queue!(out, Print(format!(" {:#}\n", error)))?;
    out.flush()
}
