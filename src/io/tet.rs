//! `.t` tet mesh format.
//!
//! A line-oriented text format with three record kinds, grouped in this
//! order:
//!
//! ```text
//! Vertex <id> <x> <y> <z> [ignored fields...]
//! Tet 4 <v1> <v2> <v3> <v4> [ignored fields...]
//! Edge <v1> <v2> [ignored fields...]
//! ```
//!
//! File vertex ids are arbitrary integers; they are remapped to dense ids in
//! the order vertices appear. Blank lines and lines starting with `#` are
//! skipped. Loading reads the text twice: once to count records, once to
//! build the mesh. An unexpected keyword before the last counted record is
//! an error; lines after it are never read.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use super::tokenizer::{TokenError, Tokenizer};
use crate::error::{MeshError, Result};
use crate::tet::{TetMesh, DEFAULT_DEGENERATE_VOLUME};

/// Options for loading `.t` files.
///
/// # Example
///
/// ```
/// use tetkit::io::tet::LoadOptions;
///
/// let options = LoadOptions::default()
///     .with_validate_edges(false)
///     .with_degenerate_volume(1e-9);
/// assert!(options.check_orientation);
/// ```
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Repair inverted tets and reject flat ones.
    pub check_orientation: bool,

    /// Require every `Edge` record to match an edge of the tets.
    pub validate_edges: bool,

    /// Accept vertices no tet references (with a warning).
    pub allow_isolated_vertices: bool,

    /// Absolute volume at or below which a tet is flat.
    pub degenerate_volume: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            check_orientation: true,
            validate_edges: true,
            allow_isolated_vertices: false,
            degenerate_volume: DEFAULT_DEGENERATE_VOLUME,
        }
    }
}

impl LoadOptions {
    /// Set whether tets are orientation-checked.
    pub fn with_check_orientation(mut self, check: bool) -> Self {
        self.check_orientation = check;
        self
    }

    /// Set whether `Edge` records are validated.
    pub fn with_validate_edges(mut self, validate: bool) -> Self {
        self.validate_edges = validate;
        self
    }

    /// Set whether isolated vertices are tolerated.
    pub fn with_allow_isolated_vertices(mut self, allow: bool) -> Self {
        self.allow_isolated_vertices = allow;
        self
    }

    /// Set the flat-tet volume threshold.
    pub fn with_degenerate_volume(mut self, volume: f64) -> Self {
        self.degenerate_volume = volume;
        self
    }
}

/// Load a tet mesh from a `.t` file.
///
/// # Example
///
/// ```no_run
/// use tetkit::io::tet::{self, LoadOptions};
///
/// let mesh = tet::load("model.t", &LoadOptions::default()).unwrap();
/// println!("{} tets", mesh.num_tets());
/// ```
pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<TetMesh> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    log::info!("loading {}", path.display());
    parse(&text, options)
}

#[derive(Debug, Default)]
struct RecordCounts {
    vertices: usize,
    tets: usize,
    edges: usize,
}

fn count_records(text: &str) -> RecordCounts {
    let mut counts = RecordCounts::default();
    for line in text.lines() {
        match Tokenizer::whitespace(line).next_token() {
            Some("Vertex") => counts.vertices += 1,
            Some("Tet") => counts.tets += 1,
            Some("Edge") => counts.edges += 1,
            _ => {}
        }
    }
    counts
}

/// Numbered, non-blank, non-comment lines.
struct Records<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    last_line: usize,
}

impl<'a> Records<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            last_line: 0,
        }
    }

    /// Next record, which must start with `keyword`. Returns the 1-based line
    /// number and a tokenizer positioned after the keyword.
    fn next_record(&mut self, keyword: &str) -> Result<(usize, Tokenizer<'a>)> {
        for (index, line) in self.lines.by_ref() {
            let line_no = index + 1;
            self.last_line = line_no;
            let mut tokens = Tokenizer::whitespace(line);
            match tokens.next_token() {
                None => continue,
                Some(t) if t.starts_with('#') => continue,
                Some(t) if t == keyword => return Ok((line_no, tokens)),
                Some(t) => {
                    return Err(MeshError::malformed(
                        line_no,
                        format!("expected `{}` record, found `{}`", keyword, t),
                    ))
                }
            }
        }
        Err(MeshError::malformed(
            self.last_line,
            format!("unexpected end of file, expected `{}` record", keyword),
        ))
    }
}

fn field<T: std::str::FromStr>(tokens: &mut Tokenizer<'_>, line: usize, name: &str) -> Result<T> {
    tokens.parse_next().map_err(|e| match e {
        TokenError::Exhausted => MeshError::malformed(line, format!("missing {}", name)),
        TokenError::Unparseable(token) => {
            MeshError::malformed(line, format!("invalid {} `{}`", name, token))
        }
    })
}

fn dense_id(file_ids: &HashMap<i64, usize>, id: i64, line: usize) -> Result<usize> {
    file_ids
        .get(&id)
        .copied()
        .ok_or_else(|| MeshError::malformed(line, format!("unknown vertex id {}", id)))
}

/// Parse `.t` text into a labeled tet mesh.
///
/// # Errors
/// The first problem found aborts the load:
/// - `MalformedFile` with the line number for unexpected records, missing or
///   unparseable fields, unknown or repeated vertex ids
/// - `DegenerateTet` / `NonManifoldFace` from tet construction
/// - `MissingEdge` for an `Edge` record with no matching edge, when
///   [`LoadOptions::validate_edges`] is set
/// - `IsolatedVertex` unless [`LoadOptions::allow_isolated_vertices`] is set
pub fn parse(text: &str, options: &LoadOptions) -> Result<TetMesh> {
    let counts = count_records(text);
    log::debug!(
        "counted {} vertices, {} tets, {} edges",
        counts.vertices,
        counts.tets,
        counts.edges
    );

    let mut mesh = TetMesh::with_capacity(counts.vertices, counts.tets);
    let mut file_ids: HashMap<i64, usize> = HashMap::with_capacity(counts.vertices);
    let mut records = Records::new(text);

    for _ in 0..counts.vertices {
        let (line, mut tokens) = records.next_record("Vertex")?;
        let id: i64 = field(&mut tokens, line, "vertex id")?;
        let x: f64 = field(&mut tokens, line, "x coordinate")?;
        let y: f64 = field(&mut tokens, line, "y coordinate")?;
        let z: f64 = field(&mut tokens, line, "z coordinate")?;

        let v = mesh.add_vertex(Point3::new(x, y, z));
        if file_ids.insert(id, v.index()).is_some() {
            return Err(MeshError::malformed(line, format!("duplicate vertex id {}", id)));
        }
    }

    for _ in 0..counts.tets {
        let (line, mut tokens) = records.next_record("Tet")?;
        let arity: usize = field(&mut tokens, line, "tet arity")?;
        if arity != 4 {
            return Err(MeshError::malformed(
                line,
                format!("tet arity must be 4, found {}", arity),
            ));
        }
        let mut vertex_ids = [0usize; 4];
        for slot in vertex_ids.iter_mut() {
            let id: i64 = field(&mut tokens, line, "tet vertex id")?;
            *slot = dense_id(&file_ids, id, line)?;
        }

        let built = if options.check_orientation {
            mesh.construct_tet_with_min_volume(vertex_ids, options.degenerate_volume)
        } else {
            mesh.construct_tet(vertex_ids)
        };
        if let Err(e) = built {
            log::debug!("tet at line {} rejected", line);
            return Err(e);
        }
    }

    for _ in 0..counts.edges {
        let (line, mut tokens) = records.next_record("Edge")?;
        if !options.validate_edges {
            continue;
        }
        let v0: i64 = field(&mut tokens, line, "edge vertex id")?;
        let v1: i64 = field(&mut tokens, line, "edge vertex id")?;
        let a = dense_id(&file_ids, v0, line)?;
        let b = dense_id(&file_ids, v1, line)?;
        if mesh.vertex_edge_to(a.into(), b.into()).is_none() {
            return Err(MeshError::MissingEdge { line, v0, v1 });
        }
    }

    let isolated = mesh.isolated_vertices();
    if let Some(first) = isolated.first() {
        if !options.allow_isolated_vertices {
            return Err(MeshError::IsolatedVertex {
                vertex: first.index(),
            });
        }
        log::warn!("{} vertices are not used by any tet", isolated.len());
    }

    mesh.label_boundary();
    mesh.shrink_to_fit();

    log::info!(
        "loaded tet mesh: {} vertices, {} tets, {} faces ({} on boundary)",
        mesh.num_vertices(),
        mesh.num_tets(),
        mesh.num_faces(),
        mesh.boundary_half_faces().count()
    );
    Ok(mesh)
}

/// Save a tet mesh to a `.t` file.
///
/// Vertex ids are written 1-based in dense order, followed by every tet and
/// every edge.
pub fn save<P: AsRef<Path>>(mesh: &TetMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a tet mesh in `.t` format.
pub fn write<W: Write>(mesh: &TetMesh, mut writer: W) -> Result<()> {
    // Dense 1-based numbering, skipping deleted slots
    let mut file_id = vec![0usize; mesh.vertex_pool().size()];
    for (n, (v, _)) in mesh.vertices().enumerate() {
        file_id[v.index()] = n + 1;
        let p = mesh.position(v);
        writeln!(writer, "Vertex {} {} {} {}", n + 1, p.x, p.y, p.z)?;
    }

    for t in mesh.tet_ids() {
        let [a, b, c, d] = mesh.tet_vertices(t).map(|v| file_id[v.index()]);
        writeln!(writer, "Tet 4 {} {} {} {}", a, b, c, d)?;
    }

    for (_, edge) in mesh.edges() {
        let [a, b] = edge.vertices.map(|v| file_id[v.index()]);
        writeln!(writer, "Edge {} {}", a, b)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TetVertexId;

    const SINGLE_TET: &str = "\
Vertex 1 0 0 0
Vertex 2 1 0 0
Vertex 3 0 1 0
Vertex 4 0 0 1
Tet 4 1 2 3 4
";

    const TET_PAIR: &str = "\
Vertex 10 0 0 0
Vertex 20 1 0 0
Vertex 30 0 1 0
Vertex 40 0 0 1
Vertex 50 1 1 1
Tet 4 10 20 30 40
Tet 4 50 30 20 40
Edge 10 20
Edge 20 50
";

    #[test]
    fn test_parse_single_tet() {
        let mesh = parse(SINGLE_TET, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_tets(), 1);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.boundary_half_faces().count(), 4);
        assert!(mesh.vertices().all(|(_, v)| v.boundary));
    }

    #[test]
    fn test_file_ids_are_remapped() {
        let mesh = parse(TET_PAIR, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.num_tets(), 2);
        assert_eq!(mesh.tet_vertex_ids()[1], [4, 2, 1, 3]);
        assert_eq!(*mesh.position(TetVertexId::new(4)), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(mesh.boundary_half_faces().count(), 6);
    }

    #[test]
    fn test_trailing_fields_ignored() {
        let text = "\
Vertex 1 0 0 0\t{rgb=(1 0 0)}
Vertex 2 1 0 0\t{uv=(0 0)}
Vertex 3 0 1 0

Vertex 4 0 0 1
# a comment
Tet 4 1 2 3 4 {region=7}
Edge 1 2 {sharp}
";
        let mesh = parse(text, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.num_tets(), 1);
    }

    #[test]
    fn test_inverted_tet_repaired() {
        let text = SINGLE_TET.replace("Tet 4 1 2 3 4", "Tet 4 2 1 3 4");
        let mesh = parse(&text, &LoadOptions::default()).unwrap();
        assert!(mesh.total_volume() > 0.0);

        let unchecked = LoadOptions::default().with_check_orientation(false);
        let mesh = parse(&text, &unchecked).unwrap();
        assert!(mesh.total_volume() < 0.0);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let text = "\
Vertex 1 0 0 0
Vertex 2 1 0 oops
";
        let err = parse(text, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, MeshError::MalformedFile { line: 2, .. }), "{}", err);

        let text = "Vertex 1 0 0\n";
        let err = parse(text, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, MeshError::MalformedFile { line: 1, .. }), "{}", err);
    }

    #[test]
    fn test_out_of_order_record() {
        let text = "\
Vertex 1 0 0 0
Tet 4 1 2 3 4
Vertex 2 1 0 0
";
        let err = parse(text, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, MeshError::MalformedFile { line: 2, .. }), "{}", err);
    }

    #[test]
    fn test_unknown_vertex_in_tet() {
        let text = SINGLE_TET.replace("Tet 4 1 2 3 4", "Tet 4 1 2 3 9");
        let err = parse(&text, &LoadOptions::default()).unwrap_err();
        match err {
            MeshError::MalformedFile { line, message } => {
                assert_eq!(line, 5);
                assert!(message.contains("unknown vertex id 9"));
            }
            other => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn test_bad_arity() {
        let text = SINGLE_TET.replace("Tet 4", "Tet 3");
        let err = parse(&text, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, MeshError::MalformedFile { line: 5, .. }));
    }

    #[test]
    fn test_duplicate_vertex_id() {
        let text = SINGLE_TET.replace("Vertex 4", "Vertex 3");
        let err = parse(&text, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, MeshError::MalformedFile { line: 4, .. }));
    }

    #[test]
    fn test_missing_edge() {
        let with_extra = SINGLE_TET.replace("Vertex 4 0 0 1\n", "Vertex 4 0 0 1\nVertex 9 5 5 5\n");
        let text = format!("{}Edge 1 9\n", with_extra);
        let options = LoadOptions::default().with_allow_isolated_vertices(true);
        let err = parse(&text, &options).unwrap_err();
        assert!(matches!(err, MeshError::MissingEdge { line: 7, v0: 1, v1: 9 }), "{}", err);

        // Skipped entirely when edges are not validated
        let mesh = parse(&text, &options.with_validate_edges(false)).unwrap();
        assert_eq!(mesh.num_vertices(), 5);
    }

    #[test]
    fn test_isolated_vertex_policy() {
        let text = format!("Vertex 0 9 9 9\n{}", SINGLE_TET);
        let err = parse(&text, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, MeshError::IsolatedVertex { vertex: 0 }));

        let options = LoadOptions::default().with_allow_isolated_vertices(true);
        let mesh = parse(&text, &options).unwrap();
        assert_eq!(mesh.isolated_vertices().len(), 1);
        assert!(!mesh.vertex(TetVertexId::new(0)).boundary);
    }

    #[test]
    fn test_degenerate_tet() {
        let text = SINGLE_TET.replace("Vertex 4 0 0 1", "Vertex 4 1 1 0");
        let err = parse(&text, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateTet { .. }));

        let text = SINGLE_TET.replace("Tet 4 1 2 3 4", "Tet 4 1 2 2 4");
        let err = parse(&text, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateTet { reason: "repeated vertex", .. }));
    }

    #[test]
    fn test_non_finite_volume_rejected() {
        for coord in ["NaN", "inf", "-inf"] {
            let text = SINGLE_TET.replace("Vertex 4 0 0 1", &format!("Vertex 4 {} 0 1", coord));
            let err = parse(&text, &LoadOptions::default()).unwrap_err();
            assert!(
                matches!(err, MeshError::DegenerateTet { reason: "zero volume", .. }),
                "{}: {}",
                coord,
                err
            );
        }
    }

    #[test]
    fn test_trailing_lines_ignored() {
        let text = format!("{}Edge 1 2\nnot a record\n", SINGLE_TET);
        let mesh = parse(&text, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.num_tets(), 1);
    }

    #[test]
    fn test_write_then_parse() {
        let mesh = parse(TET_PAIR, &LoadOptions::default()).unwrap();
        let mut out = Vec::new();
        write(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Vertex 1 0 0 0\n"));

        let reloaded = parse(&text, &LoadOptions::default()).unwrap();
        assert_eq!(reloaded.num_vertices(), mesh.num_vertices());
        assert_eq!(reloaded.num_tets(), mesh.num_tets());
        assert_eq!(reloaded.num_edges(), mesh.num_edges());
        assert_eq!(reloaded.tet_vertex_ids(), mesh.tet_vertex_ids());
        assert!((reloaded.total_volume() - mesh.total_volume()).abs() < 1e-12);
    }
}
