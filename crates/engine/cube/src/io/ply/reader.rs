//! PLY body decoding for ASCII and binary encodings

use super::parser::{ElementDef, Format, Header, PropertyKind, ScalarType};
use super::{PlyError, PointCloud};

/// Sequential source of scalar values
trait ValueSource {
    fn next_value(&mut self, ty: ScalarType, element: &str) -> Result<f64, PlyError>;

    /// Advance to the next element record
    fn end_record(&mut self) {}
}

struct AsciiSource<'a> {
    lines: std::str::Lines<'a>,
    tokens: std::str::SplitAsciiWhitespace<'a>,
}

impl<'a> AsciiSource<'a> {
    fn new(body: &'a str) -> Self {
        Self {
            lines: body.lines(),
            tokens: "".split_ascii_whitespace(),
        }
    }
}

impl ValueSource for AsciiSource<'_> {
    fn next_value(&mut self, _ty: ScalarType, element: &str) -> Result<f64, PlyError> {
        loop {
            if let Some(token) = self.tokens.next() {
                return token.parse::<f64>().map_err(|_| PlyError::InvalidNumber {
                    element: element.to_string(),
                    token: token.to_string(),
                });
            }
            let line = self.lines.next().ok_or_else(|| PlyError::TruncatedBody {
                element: element.to_string(),
            })?;
            self.tokens = line.split_ascii_whitespace();
        }
    }

    fn end_record(&mut self) {
        // Each record occupies one line; drop leftover tokens
        self.tokens = "".split_ascii_whitespace();
    }
}

struct BinarySource<'a> {
    bytes: &'a [u8],
    offset: usize,
    big_endian: bool,
}

impl BinarySource<'_> {
    fn take<const N: usize>(&mut self, element: &str) -> Result<[u8; N], PlyError> {
        let end = self.offset + N;
        let slice = self
            .bytes
            .get(self.offset..end)
            .ok_or_else(|| PlyError::TruncatedBody {
                element: element.to_string(),
            })?;
        self.offset = end;

        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        if self.big_endian {
            out.reverse();
        }
        Ok(out)
    }
}

impl ValueSource for BinarySource<'_> {
    fn next_value(&mut self, ty: ScalarType, element: &str) -> Result<f64, PlyError> {
        // `take` normalises byte order to little endian
        Ok(match ty {
            ScalarType::Int8 => i8::from_le_bytes(self.take(element)?) as f64,
            ScalarType::UInt8 => u8::from_le_bytes(self.take(element)?) as f64,
            ScalarType::Int16 => i16::from_le_bytes(self.take(element)?) as f64,
            ScalarType::UInt16 => u16::from_le_bytes(self.take(element)?) as f64,
            ScalarType::Int32 => i32::from_le_bytes(self.take(element)?) as f64,
            ScalarType::UInt32 => u32::from_le_bytes(self.take(element)?) as f64,
            ScalarType::Float32 => f32::from_le_bytes(self.take(element)?) as f64,
            ScalarType::Float64 => f64::from_le_bytes(self.take(element)?),
        })
    }
}

/// Read the body and keep the scalar properties of the `vertex` element
pub(crate) fn read_vertices(header: &Header, body: &[u8]) -> Result<PointCloud, PlyError> {
    let vertex_index = header
        .elements
        .iter()
        .position(|e| e.name == "vertex")
        .ok_or(PlyError::MissingVertexElement)?;

    match header.format {
        Format::Ascii => {
            let text = std::str::from_utf8(body).map_err(|_| PlyError::InvalidUtf8)?;
            read_with(header, vertex_index, body.len(), &mut AsciiSource::new(text))
        }
        Format::BinaryLittleEndian | Format::BinaryBigEndian => read_with(
            header,
            vertex_index,
            body.len(),
            &mut BinarySource {
                bytes: body,
                offset: 0,
                big_endian: header.format == Format::BinaryBigEndian,
            },
        ),
    }
}

fn read_with(
    header: &Header,
    vertex_index: usize,
    body_len: usize,
    source: &mut impl ValueSource,
) -> Result<PointCloud, PlyError> {
    // Elements preceding the vertex element still have to be consumed
    for element in &header.elements[..vertex_index] {
        if element.properties.is_empty() {
            continue;
        }
        for _ in 0..element.count {
            skip_record(element, source)?;
        }
    }

    let vertex = &header.elements[vertex_index];
    let scalar_names: Vec<String> = vertex
        .properties
        .iter()
        .filter(|p| matches!(p.kind, PropertyKind::Scalar(_)))
        .map(|p| p.name.clone())
        .collect();
    // Every record takes at least one body byte, so a declared count larger
    // than the body fails with TruncatedBody before the columns fill up
    let capacity = vertex.count.min(body_len);
    let mut columns: Vec<Vec<f32>> = scalar_names
        .iter()
        .map(|_| Vec::with_capacity(capacity))
        .collect();

    let records = if vertex.properties.is_empty() {
        0
    } else {
        vertex.count
    };
    for _ in 0..records {
        let mut column = 0;
        for property in &vertex.properties {
            match property.kind {
                PropertyKind::Scalar(ty) => {
                    let value = source.next_value(ty, &vertex.name)?;
                    columns[column].push(value as f32);
                    column += 1;
                }
                PropertyKind::List { count, item } => {
                    skip_list(count, item, &vertex.name, source)?;
                }
            }
        }
        source.end_record();
    }

    Ok(PointCloud::from_columns(
        header.comments.clone(),
        scalar_names,
        columns,
        vertex.count,
    ))
}

fn skip_record(element: &ElementDef, source: &mut impl ValueSource) -> Result<(), PlyError> {
    for property in &element.properties {
        match property.kind {
            PropertyKind::Scalar(ty) => {
                source.next_value(ty, &element.name)?;
            }
            PropertyKind::List { count, item } => {
                skip_list(count, item, &element.name, source)?;
            }
        }
    }
    source.end_record();
    Ok(())
}

fn skip_list(
    count: ScalarType,
    item: ScalarType,
    element: &str,
    source: &mut impl ValueSource,
) -> Result<(), PlyError> {
    let len = source.next_value(count, element)?;
    if !(len >= 0.0 && len.fract() == 0.0) {
        return Err(PlyError::InvalidNumber {
            element: element.to_string(),
            token: len.to_string(),
        });
    }
    for _ in 0..len as usize {
        source.next_value(item, element)?;
    }
    Ok(())
}
