//! ASCII STL reader and writer.
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//!   ...
//! endsolid name
//! ```
//!
//! The reader is line oriented. Keywords are case sensitive, and lines whose
//! first token is not `solid`, `facet`, `vertex` or `endfacet` are skipped.
//! Malformed facets abort the whole parse; no partial mesh is returned.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1},
    combinator::{all_consuming, verify},
    number::complete::double,
    sequence::{preceded, terminated},
    IResult,
};
use tracing::{debug, info};

use crate::error::{StlError, StlResult};
use crate::geometry::Triangle;
use crate::mesh::{Mesh, DEFAULT_NAME};

/// Facet being accumulated between `facet` and `endfacet`.
struct OpenFacet {
    line: usize,
    normal: Vector3<f64>,
    vertices: Vec<Point3<f64>>,
}

/// Load a mesh from an ASCII STL file.
///
/// # Errors
///
/// Returns [`StlError::FileNotFound`] if `path` does not exist, an I/O error
/// if it cannot be read, or [`StlError::Format`] for malformed content.
pub fn load_ascii<P: AsRef<Path>>(path: P) -> StlResult<Mesh> {
    let path = path.as_ref();
    info!(path = %path.display(), "reading ASCII STL");

    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StlError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StlError::Io(e)
        }
    })?;

    let mut mesh = read_ascii(BufReader::new(file))?;
    mesh.set_source_path(path.to_path_buf());

    info!(
        path = %path.display(),
        name = %mesh.name(),
        triangles = mesh.triangle_count(),
        "read ASCII STL"
    );
    Ok(mesh)
}

/// Parse ASCII STL text held in memory.
///
/// # Errors
///
/// Returns [`StlError::Format`] for malformed content.
pub fn parse_ascii(input: &str) -> StlResult<Mesh> {
    read_ascii(input.as_bytes())
}

/// Parse ASCII STL from any buffered reader.
///
/// Mass properties are computed before returning. A mesh whose centroid is
/// undefined (no triangles, or zero total tetrahedron volume) is returned
/// with the cache unset, and the accessors report it on first use.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
///
/// # Errors
///
/// Returns [`StlError::Format`] for malformed content or an I/O error if the
/// reader fails.
pub fn read_ascii<R: BufRead>(reader: R) -> StlResult<Mesh> {
    let mut mesh = Mesh::new();
    let mut facet: Option<OpenFacet> = None;

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line = String::from_utf8_lossy(&bytes);
        let number = index + 1;
        let trimmed = line.trim();
        let (keyword, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));

        match keyword {
            "solid" => {
                let name = rest.split_whitespace().next().unwrap_or(DEFAULT_NAME);
                mesh.set_name(name)?;
            }
            "facet" => {
                if let Some(open) = &facet {
                    return Err(StlError::format(
                        number,
                        format!("facet opened before the facet at line {} was closed", open.line),
                    ));
                }
                let normal = parse_fields(facet_normal, rest)
                    .ok_or_else(|| {
                        StlError::format(number, "expected `facet normal <nx> <ny> <nz>` with finite numbers")
                    })?;
                facet = Some(OpenFacet {
                    line: number,
                    normal,
                    vertices: Vec::with_capacity(3),
                });
            }
            "vertex" => {
                let open = facet
                    .as_mut()
                    .ok_or_else(|| StlError::format(number, "vertex outside of a facet"))?;
                let position = parse_fields(vector3, rest)
                    .ok_or_else(|| {
                        StlError::format(number, "expected `vertex <x> <y> <z>` with finite numbers")
                    })?;
                open.vertices.push(Point3::from(position));
            }
            "endfacet" => {
                let open = facet
                    .take()
                    .ok_or_else(|| StlError::format(number, "endfacet without a matching facet"))?;
                let [v0, v1, v2] = <[Point3<f64>; 3]>::try_from(open.vertices).map_err(|found| {
                    StlError::format(
                        number,
                        format!(
                            "facet starting at line {} has {} vertices, expected 3",
                            open.line,
                            found.len()
                        ),
                    )
                })?;
                mesh.add_triangle(Triangle::with_normal(v0, v1, v2, open.normal));
            }
            _ => {}
        }
    }

    if let Some(open) = facet {
        return Err(StlError::format(open.line, "facet is never closed"));
    }

    match mesh.calc_centroid_and_volume() {
        Ok(_) => {}
        Err(StlError::DegenerateMesh { triangles }) => {
            debug!(triangles, "centroid undefined, mass properties left unset");
        }
        Err(e) => return Err(e),
    }
    debug!(name = %mesh.name(), triangles = mesh.triangle_count(), "parsed ASCII STL");
    Ok(mesh)
}

/// Run `parser` over the whole of `input`, allowing surrounding whitespace.
fn parse_fields<'a, T>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
    input: &'a str,
) -> Option<T> {
    all_consuming(terminated(parser, multispace0))(input)
        .ok()
        .map(|(_, value)| value)
}

fn facet_normal(input: &str) -> IResult<&str, Vector3<f64>> {
    let (input, _) = preceded(multispace0, tag("normal"))(input)?;
    let (input, _) = multispace1(input)?;
    vector3(input)
}

fn vector3(input: &str) -> IResult<&str, Vector3<f64>> {
    let (input, _) = multispace0(input)?;
    let (input, x) = coordinate(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = coordinate(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = coordinate(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

/// A float that is neither NaN nor infinite
fn coordinate(input: &str) -> IResult<&str, f64> {
    verify(double, |value: &f64| value.is_finite())(input)
}

/// Save a mesh as ASCII STL.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_ascii<P: AsRef<Path>>(mesh: &Mesh, path: P) -> StlResult<()> {
    let path = path.as_ref();
    info!(
        path = %path.display(),
        name = %mesh.name(),
        triangles = mesh.triangle_count(),
        "writing ASCII STL"
    );

    let file = File::create(path)?;
    write_ascii(mesh, BufWriter::new(file))
}

/// Write a mesh as ASCII STL.
///
/// Coordinates use the shortest representation that reads back to the same
/// `f64`, so a write followed by a parse reproduces every vertex exactly.
///
/// # Errors
///
/// Returns an error if writing or flushing fails.
pub fn write_ascii<W: Write>(mesh: &Mesh, mut writer: W) -> StlResult<()> {
    writeln!(writer, "solid {}", mesh.name())?;

    for triangle in mesh.triangles() {
        let n = &triangle.normal;
        writeln!(writer, "  facet normal {} {} {}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for v in &triangle.vertices {
            writeln!(writer, "      vertex {} {} {}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }

    writeln!(writer, "endsolid {}", mesh.name())?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TRIANGLE: &str = "solid wedge
  facet normal 0 0 1
    outer loop
      vertex 1 0 0
      vertex 0 1 0
      vertex 0 0 1
    endloop
  endfacet
endsolid wedge
";

    #[test]
    fn test_parse_single_facet() {
        let mesh = parse_ascii(TRIANGLE).unwrap();
        assert_eq!(mesh.name(), "wedge");
        assert_eq!(mesh.triangle_count(), 1);

        let tri = &mesh.triangles()[0];
        assert_eq!(tri.normal, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(tri.vertices[1], Point3::new(0.0, 1.0, 0.0));

        let props = mesh.cached_mass_properties().unwrap();
        assert_relative_eq!(props.volume, 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_empty_input() {
        let mesh = parse_ascii("").unwrap();
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.name(), DEFAULT_NAME);
        assert!(mesh.cached_mass_properties().is_none());
    }

    #[test]
    fn test_solid_without_name() {
        let mesh = parse_ascii("solid\nendsolid\n").unwrap();
        assert_eq!(mesh.name(), DEFAULT_NAME);
    }

    #[test]
    fn test_scientific_notation_and_indentation() {
        let input = "solid sci\n\tfacet normal -1.5e-3 0 2E2\nouter loop\n vertex 1e0 0 0\n vertex 0 1.0e+0 0\n   vertex 0 0 -0.5\nendloop\nendfacet\nendsolid sci\n";
        let mesh = parse_ascii(input).unwrap();
        let tri = &mesh.triangles()[0];
        assert_relative_eq!(tri.normal, Vector3::new(-1.5e-3, 0.0, 200.0));
        assert_relative_eq!(tri.vertices[2], Point3::new(0.0, 0.0, -0.5));
    }

    #[test]
    fn test_unknown_lines_ignored() {
        let input = TRIANGLE.replace("    outer loop", "    color 1 0 0\n    outer loop");
        let mesh = parse_ascii(&input).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_two_vertex_facet_rejected() {
        let input = TRIANGLE.replace("      vertex 0 0 1\n", "");
        match parse_ascii(&input) {
            Err(StlError::Format { line, message }) => {
                assert_eq!(line, 7);
                assert!(message.contains("has 2 vertices"));
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_four_vertex_facet_rejected() {
        let input = TRIANGLE.replace("      vertex 0 0 1\n", "      vertex 0 0 1\n      vertex 1 1 1\n");
        assert!(matches!(parse_ascii(&input), Err(StlError::Format { .. })));
    }

    #[test]
    fn test_non_numeric_coordinate_reports_line() {
        let input = TRIANGLE.replace("vertex 0 1 0", "vertex 0 one 0");
        match parse_ascii(&input) {
            Err(StlError::Format { line, .. }) => assert_eq!(line, 5),
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_normal_keyword_rejected() {
        let input = TRIANGLE.replace("facet normal 0 0 1", "facet 0 0 1");
        assert!(matches!(
            parse_ascii(&input),
            Err(StlError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        // `VERTEX` is an unknown line, so the facet ends with 2 vertices
        let input = TRIANGLE.replace("vertex 0 0 1", "VERTEX 0 0 1");
        assert!(matches!(parse_ascii(&input), Err(StlError::Format { .. })));
    }

    #[test]
    fn test_vertex_outside_facet_rejected() {
        let input = "solid s\nvertex 0 0 0\nendsolid s\n";
        assert!(matches!(
            parse_ascii(input),
            Err(StlError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn test_unclosed_facet_rejected() {
        let input = "solid s\nfacet normal 0 0 1\nouter loop\nvertex 1 0 0\n";
        assert!(matches!(
            parse_ascii(input),
            Err(StlError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn test_nested_facet_rejected() {
        let input = "solid s\nfacet normal 0 0 1\nfacet normal 0 0 1\n";
        assert!(matches!(
            parse_ascii(input),
            Err(StlError::Format { line: 3, .. })
        ));
    }

    #[test]
    fn test_flat_facet_parses_with_cache_unset() {
        let input = TRIANGLE.replace("vertex 0 0 1", "vertex 1 1 0");
        let mut mesh = parse_ascii(&input).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.cached_mass_properties().is_none());
        assert!(matches!(
            mesh.volume(),
            Err(StlError::DegenerateMesh { triangles: 1 })
        ));
    }

    #[test]
    fn test_overflowing_volume_parses_with_cache_unset() {
        let input = TRIANGLE
            .replace("vertex 1 0 0", "vertex 1e200 0 0")
            .replace("vertex 0 1 0", "vertex 0 1e200 0")
            .replace("vertex 0 0 1", "vertex 0 0 1e200");
        let mesh = parse_ascii(&input).unwrap();
        assert_eq!(mesh.triangles()[0].vertices[2], Point3::new(0.0, 0.0, 1e200));
        assert!(mesh.cached_mass_properties().is_none());
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        for bad in ["vertex 1 1 nan", "vertex inf 0 0", "vertex 0 -infinity 0"] {
            let input = TRIANGLE.replace("vertex 0 1 0", bad);
            assert!(
                matches!(parse_ascii(&input), Err(StlError::Format { line: 5, .. })),
                "{bad} accepted"
            );
        }

        let input = TRIANGLE.replace("facet normal 0 0 1", "facet normal NaN 0 1");
        assert!(matches!(
            parse_ascii(&input),
            Err(StlError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_name_is_replaced() {
        let mut input = b"solid pi\xe8ce\n".to_vec();
        input.extend_from_slice(TRIANGLE.split_once('\n').unwrap().1.as_bytes());

        let mesh = read_ascii(input.as_slice()).unwrap();
        assert_eq!(mesh.name(), "pi\u{fffd}ce");
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = TRIANGLE.replace('\n', "\r\n");
        let mesh = parse_ascii(&input).unwrap();
        assert_eq!(mesh.name(), "wedge");
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_write_layout() {
        let mesh = parse_ascii(TRIANGLE).unwrap();
        let mut out = Vec::new();
        write_ascii(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        assert_eq!(
            lines,
            [
                "solid wedge",
                "facet normal 0 0 1",
                "outer loop",
                "vertex 1 0 0",
                "vertex 0 1 0",
                "vertex 0 0 1",
                "endloop",
                "endfacet",
                "endsolid wedge",
            ]
        );
    }

    #[test]
    fn test_write_then_parse_is_exact() {
        let mut mesh = Mesh::cube(0.3);
        mesh.translate(&Vector3::new(1.0 / 3.0, -2.0e-7, 12345.678_9));
        mesh.rotate(&crate::Transform::rotation_y(0.123)).unwrap();

        let mut out = Vec::new();
        write_ascii(&mesh, &mut out).unwrap();
        let reparsed = read_ascii(out.as_slice()).unwrap();

        assert_eq!(reparsed.name(), mesh.name());
        assert_eq!(reparsed.triangles(), mesh.triangles());
    }
}
