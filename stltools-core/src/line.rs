/// Line-level recognition of the ASCII STL grammar
///
/// Only three line shapes carry meaning for the binary encoding: the facet
/// normal declaration, a vertex and the end of a vertex loop. Each pattern is
/// searched anywhere in the line, so leading indentation, trailing comments
/// and unknown keywords are tolerated.
use std::borrow::Cow;
use std::io::BufRead;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit0, digit1, one_of},
    combinator::{map_res, opt, recognize},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::Result;

/// The meaning of one line of an ASCII STL file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StlLine {
    FacetNormal([f32; 3]),
    Vertex([f32; 3]),
    EndLoop,
    Other,
}

/// Classify a line. Facet normals take priority over vertices, which take
/// priority over `endloop`.
pub fn classify_line(line: &str) -> StlLine {
    if let Some(normal) = find_triple(line, "facet", facet_normal) {
        StlLine::FacetNormal(normal)
    } else if let Some(position) = find_triple(line, "vertex", vertex) {
        StlLine::Vertex(position)
    } else if line.contains("endloop") {
        StlLine::EndLoop
    } else {
        StlLine::Other
    }
}

/// Whether a line declares a new facet. Used by the counting pass.
pub fn is_facet_normal(line: &str) -> bool {
    find_triple(line, "facet", facet_normal).is_some()
}

fn find_triple(
    line: &str,
    keyword: &str,
    parser: fn(&str) -> IResult<&str, [f32; 3]>,
) -> Option<[f32; 3]> {
    line.match_indices(keyword)
        .find_map(|(start, _)| parser(&line[start..]).ok().map(|(_, values)| values))
}

fn facet_normal(input: &str) -> IResult<&str, [f32; 3]> {
    let (input, _) = tag("facet")(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("normal")(input)?;
    parse_vector3(input)
}

fn vertex(input: &str) -> IResult<&str, [f32; 3]> {
    let (input, _) = tag("vertex")(input)?;
    parse_vector3(input)
}

fn parse_vector3(input: &str) -> IResult<&str, [f32; 3]> {
    let (input, x) = preceded(space1, number)(input)?;
    let (input, y) = preceded(space1, number)(input)?;
    let (input, z) = preceded(space1, number)(input)?;
    Ok((input, [x, y, z]))
}

/// `[-+]?(\d*[.])?\d+([eE][-+]?\d+)?`
///
/// A dot must be followed by a digit and an exponent marker must be followed
/// by digits, otherwise they are left unconsumed.
fn number(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            alt((recognize(tuple((digit0, char('.'), digit1))), digit1)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |literal: &str| literal.parse::<f32>(),
    )(input)
}

fn space1(input: &str) -> IResult<&str, &str> {
    take_while1(is_pattern_space)(input)
}

fn is_pattern_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Feed every line of `reader` to `f`.
///
/// Lines end at `\n`, `\r` or `\r\n`. Invalid UTF-8 is replaced rather than
/// rejected, so a stray byte only spoils the line it appears on.
pub fn for_each_line<R, F>(mut reader: R, mut f: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(&str) -> Result<()>,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }

        let mut bytes = buf.as_slice();
        if let Some(rest) = bytes.strip_suffix(b"\n") {
            bytes = rest;
        }
        if let Some(rest) = bytes.strip_suffix(b"\r") {
            bytes = rest;
        }

        let text: Cow<'_, str> = String::from_utf8_lossy(bytes);
        for line in text.split('\r') {
            f(line)?;
        }
    }
}
