//! PLY header parser using nom
//!
//! The header is a sequence of ASCII lines:
//!
//! ```text
//! ply
//! format binary_little_endian 1.0
//! comment generated by a scanner
//! element vertex 1024
//! property float x
//! property float y
//! property float z
//! element face 12
//! property list uchar int vertex_indices
//! end_header
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{digit1, not_line_ending, space0, space1},
    combinator::{all_consuming, map, map_opt, map_res, value},
    sequence::preceded,
    IResult, Parser,
};

use super::PlyError;

/// Body encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

/// Scalar value types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

impl ScalarType {
    /// Accepts both the classic and the sized type names
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "char" | "int8" => ScalarType::Int8,
            "uchar" | "uint8" => ScalarType::UInt8,
            "short" | "int16" => ScalarType::Int16,
            "ushort" | "uint16" => ScalarType::UInt16,
            "int" | "int32" => ScalarType::Int32,
            "uint" | "uint32" => ScalarType::UInt32,
            "float" | "float32" => ScalarType::Float32,
            "double" | "float64" => ScalarType::Float64,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PropertyKind {
    Scalar(ScalarType),
    List { count: ScalarType, item: ScalarType },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ElementDef {
    pub name: String,
    pub count: usize,
    pub properties: Vec<PropertyDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Header {
    pub format: Format,
    pub comments: Vec<String>,
    pub elements: Vec<ElementDef>,
}

/// One parsed header line
#[derive(Debug, Clone, PartialEq)]
enum HeaderLine<'a> {
    Format(Format),
    Comment(&'a str),
    ObjInfo,
    Element(&'a str, usize),
    Property(&'a str, PropertyKind),
    EndHeader,
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace()).parse(input)
}

fn scalar_type(input: &str) -> IResult<&str, ScalarType> {
    map_opt(
        take_while1(|c: char| c.is_ascii_alphanumeric()),
        ScalarType::from_name,
    )
    .parse(input)
}

fn format_line(input: &str) -> IResult<&str, HeaderLine<'_>> {
    let encoding = alt((
        value(Format::Ascii, tag("ascii")),
        value(Format::BinaryLittleEndian, tag("binary_little_endian")),
        value(Format::BinaryBigEndian, tag("binary_big_endian")),
    ));
    map(
        (tag("format"), space1, encoding, space1, tag("1.0"), space0),
        |(_, _, format, _, _, _)| HeaderLine::Format(format),
    )
    .parse(input)
}

fn comment_line(input: &str) -> IResult<&str, HeaderLine<'_>> {
    map(
        preceded((tag("comment"), space0), not_line_ending),
        |text: &str| HeaderLine::Comment(text.trim_end()),
    )
    .parse(input)
}

fn obj_info_line(input: &str) -> IResult<&str, HeaderLine<'_>> {
    value(HeaderLine::ObjInfo, (tag("obj_info"), not_line_ending)).parse(input)
}

fn element_line(input: &str) -> IResult<&str, HeaderLine<'_>> {
    map(
        (
            tag("element"),
            space1,
            word,
            space1,
            map_res(digit1, str::parse::<usize>),
            space0,
        ),
        |(_, _, name, _, count, _)| HeaderLine::Element(name, count),
    )
    .parse(input)
}

fn list_property_line(input: &str) -> IResult<&str, HeaderLine<'_>> {
    map(
        (
            tag("property"),
            space1,
            tag("list"),
            space1,
            scalar_type,
            space1,
            scalar_type,
            space1,
            word,
            space0,
        ),
        |(_, _, _, _, count, _, item, _, name, _)| {
            HeaderLine::Property(name, PropertyKind::List { count, item })
        },
    )
    .parse(input)
}

fn scalar_property_line(input: &str) -> IResult<&str, HeaderLine<'_>> {
    map(
        (tag("property"), space1, scalar_type, space1, word, space0),
        |(_, _, ty, _, name, _)| HeaderLine::Property(name, PropertyKind::Scalar(ty)),
    )
    .parse(input)
}

fn end_header_line(input: &str) -> IResult<&str, HeaderLine<'_>> {
    value(HeaderLine::EndHeader, (tag("end_header"), space0)).parse(input)
}

fn header_line(input: &str) -> IResult<&str, HeaderLine<'_>> {
    alt((
        format_line,
        comment_line,
        obj_info_line,
        element_line,
        list_property_line,
        scalar_property_line,
        end_header_line,
    ))
    .parse(input)
}

/// Split raw file bytes into header lines and the byte offset of the body.
pub(crate) fn split_header(bytes: &[u8]) -> Result<(Vec<&str>, usize), PlyError> {
    let mut lines = Vec::new();
    let mut start = 0;

    while start < bytes.len() {
        let end = bytes[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| start + p)
            .ok_or(PlyError::UnterminatedHeader)?;

        let line = std::str::from_utf8(&bytes[start..end])
            .map_err(|_| PlyError::InvalidHeaderLine {
                line: lines.len() + 1,
                text: String::from_utf8_lossy(&bytes[start..end]).into_owned(),
            })?
            .trim_end_matches('\r');

        lines.push(line);
        start = end + 1;

        if line.trim() == "end_header" {
            return Ok((lines, start));
        }
    }

    Err(PlyError::UnterminatedHeader)
}

/// Parse header lines (including the leading `ply` magic line)
pub(crate) fn parse_header(lines: &[&str]) -> Result<Header, PlyError> {
    let mut iter = lines.iter().enumerate();

    match iter.next() {
        Some((_, line)) if line.trim() == "ply" => {}
        _ => return Err(PlyError::MissingMagic),
    }

    let mut format = None;
    let mut comments = Vec::new();
    let mut elements: Vec<ElementDef> = Vec::new();

    for (index, raw) in iter {
        let line = raw.trim_start();
        if line.is_empty() {
            continue;
        }

        let parsed = all_consuming(header_line)
            .parse(line)
            .map(|(_, parsed)| parsed)
            .map_err(|_| PlyError::InvalidHeaderLine {
                line: index + 1,
                text: line.to_string(),
            })?;

        match parsed {
            HeaderLine::Format(f) => format = Some(f),
            HeaderLine::Comment(text) => comments.push(text.to_string()),
            HeaderLine::ObjInfo => {}
            HeaderLine::Element(name, count) => elements.push(ElementDef {
                name: name.to_string(),
                count,
                properties: Vec::new(),
            }),
            HeaderLine::Property(name, kind) => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| PlyError::OrphanProperty(name.to_string()))?;
                element.properties.push(PropertyDef {
                    name: name.to_string(),
                    kind,
                });
            }
            HeaderLine::EndHeader => break,
        }
    }

    Ok(Header {
        format: format.ok_or(PlyError::MissingFormat)?,
        comments,
        elements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_lines() {
        let lines = [
            "ply",
            "format binary_little_endian 1.0",
            "comment made by hand",
            "obj_info scanner 7",
            "element vertex 3",
            "property float x",
            "property float32 y",
            "property double z",
            "property uchar red",
            "element face 1",
            "property list uchar int vertex_indices",
            "end_header",
        ];
        let header = parse_header(&lines).unwrap();

        assert_eq!(header.format, Format::BinaryLittleEndian);
        assert_eq!(header.comments, vec!["made by hand".to_string()]);
        assert_eq!(header.elements.len(), 2);

        let vertex = &header.elements[0];
        assert_eq!(vertex.name, "vertex");
        assert_eq!(vertex.count, 3);
        assert_eq!(vertex.properties.len(), 4);
        assert_eq!(
            vertex.properties[2].kind,
            PropertyKind::Scalar(ScalarType::Float64)
        );

        assert_eq!(
            header.elements[1].properties[0].kind,
            PropertyKind::List {
                count: ScalarType::UInt8,
                item: ScalarType::Int32
            }
        );
    }

    #[test]
    fn test_missing_magic() {
        let lines = ["format ascii 1.0", "end_header"];
        assert!(matches!(parse_header(&lines), Err(PlyError::MissingMagic)));
    }

    #[test]
    fn test_missing_format() {
        let lines = ["ply", "element vertex 0", "end_header"];
        assert!(matches!(parse_header(&lines), Err(PlyError::MissingFormat)));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let lines = ["ply", "format ascii 1.0", "element vertex 1", "property quad x"];
        assert!(matches!(
            parse_header(&lines),
            Err(PlyError::InvalidHeaderLine { line: 4, .. })
        ));
    }

    #[test]
    fn test_property_before_element() {
        let lines = ["ply", "format ascii 1.0", "property float x", "end_header"];
        assert!(matches!(
            parse_header(&lines),
            Err(PlyError::OrphanProperty(name)) if name == "x"
        ));
    }

    #[test]
    fn test_split_header_handles_crlf() {
        let bytes = b"ply\r\nformat ascii 1.0\r\nend_header\r\n1 2 3";
        let (lines, offset) = split_header(bytes).unwrap();
        assert_eq!(lines, vec!["ply", "format ascii 1.0", "end_header"]);
        assert_eq!(&bytes[offset..], b"1 2 3");
    }

    #[test]
    fn test_split_header_unterminated() {
        assert!(matches!(
            split_header(b"ply\nformat ascii 1.0\n"),
            Err(PlyError::UnterminatedHeader)
        ));
    }
}
