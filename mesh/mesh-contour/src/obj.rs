//! OBJ-style text dump of a [`Contour`].
//!
//! The writer emits `v x y z` lines for every point, then `f` lines with
//! 1-based indices: three per triangle, four per quad. Coordinates use the
//! shortest representation that parses back to the same `f64`, so a dump
//! read back with [`Contour::from_obj`] reproduces the container exactly.
//!
//! The reader accepts the common OBJ extras so dumps that went through
//! another tool still load: comments, texture/normal records, `i/t/n`
//! index triples, negative (relative) indices and n-gons, which are
//! fan-triangulated.

use crate::{Contour, ContourError, ContourResult};
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

impl Contour {
    /// Write the container as OBJ text.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::Io`] if the writer fails.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_contour::Contour;
    /// use nalgebra::Point3;
    ///
    /// let mut c = Contour::new();
    /// c.merge_triangles(&[[
    ///     Point3::origin(),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 0.5, 0.0),
    /// ]]);
    ///
    /// let mut out = Vec::new();
    /// c.to_obj(&mut out).unwrap();
    /// assert_eq!(String::from_utf8(out).unwrap(), "v 0 0 0\nv 1 0 0\nv 0 0.5 0\nf 1 2 3\n");
    /// ```
    pub fn to_obj<W: Write>(&self, mut writer: W) -> ContourResult<()> {
        for p in &self.points {
            writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for &[a, b, c] in &self.faces3 {
            writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
        }
        for &[a, b, c, d] in &self.faces4 {
            writeln!(writer, "f {} {} {} {}", a + 1, b + 1, c + 1, d + 1)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Parse OBJ text into a container.
    ///
    /// # Errors
    ///
    /// - [`ContourError::Parse`] for malformed numbers, vertex records with
    ///   fewer than three coordinates and faces with fewer than three corners
    /// - [`ContourError::IndexOutOfRange`] for face indices that do not refer
    ///   to a vertex of the file; `face` is the 0-based ordinal of the `f`
    ///   record in the file, whatever earlier polygons were split into
    /// - [`ContourError::Io`] if reading fails
    pub fn from_obj<R: BufRead>(reader: R) -> ContourResult<Self> {
        let mut contour = Self::new();
        // Faces may precede the vertices they use; resolve once all are read.
        let mut pending: Vec<(usize, Vec<i64>)> = Vec::new();

        for (n, line) in reader.lines().enumerate() {
            let line_no = n + 1;
            let line = line?;
            let mut tokens = line.split_whitespace();

            match tokens.next() {
                Some("v") => {
                    let coords = tokens
                        .take(3)
                        .map(|t| {
                            t.parse::<f64>().map_err(|e| {
                                ContourError::parse(line_no, format!("bad coordinate {t:?}: {e}"))
                            })
                        })
                        .collect::<ContourResult<Vec<_>>>()?;
                    let &[x, y, z] = coords.as_slice() else {
                        return Err(ContourError::parse(line_no, "vertex needs three coordinates"));
                    };
                    contour.points.push(Point3::new(x, y, z));
                }
                Some("f") => {
                    let indices = tokens
                        .map(|t| parse_index(t, contour.points.len(), line_no))
                        .collect::<ContourResult<Vec<_>>>()?;
                    if indices.len() < 3 {
                        return Err(ContourError::parse(
                            line_no,
                            format!("face needs at least three corners, got {}", indices.len()),
                        ));
                    }
                    pending.push((line_no, indices));
                }
                // Blank lines, comments and records the container has no use for.
                _ => {}
            }
        }

        let point_count = contour.points.len();
        for (face, (line_no, indices)) in pending.into_iter().enumerate() {
            let resolved = indices
                .iter()
                .map(|&i| {
                    u32::try_from(i)
                        .ok()
                        .filter(|&u| (u as usize) < point_count)
                        .ok_or(ContourError::IndexOutOfRange {
                            face,
                            index: i,
                            point_count,
                        })
                })
                .collect::<ContourResult<Vec<u32>>>()?;

            match resolved[..] {
                [a, b, c] => contour.faces3.push([a, b, c]),
                [a, b, c, d] => contour.faces4.push([a, b, c, d]),
                [first, ref rest @ ..] => {
                    debug!(line = line_no, corners = resolved.len(), "Fan-triangulating polygon");
                    for pair in rest.windows(2) {
                        contour.faces3.push([first, pair[0], pair[1]]);
                    }
                }
                [] => {}
            }
        }

        Ok(contour)
    }

    /// Write the container to an OBJ file.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::Io`] if the file cannot be created or written.
    pub fn save_obj<P: AsRef<Path>>(&self, path: P) -> ContourResult<()> {
        let file = File::create(path)?;
        self.to_obj(BufWriter::new(file))
    }

    /// Read a container from an OBJ file.
    ///
    /// # Errors
    ///
    /// See [`Contour::from_obj`]; additionally [`ContourError::Io`] if the
    /// file cannot be opened.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> ContourResult<Self> {
        let file = File::open(path)?;
        Self::from_obj(BufReader::new(file))
    }
}

/// Turn an OBJ index token (`7`, `7/2`, `7//3`, `-1`) into a 0-based index.
///
/// Negative indices count back from the most recent vertex. Range checks
/// happen after the whole file is read.
fn parse_index(token: &str, points_so_far: usize, line: usize) -> ContourResult<i64> {
    let head = token.split('/').next().unwrap_or(token);
    let raw: i64 = head
        .parse()
        .map_err(|e| ContourError::parse(line, format!("bad face index {token:?}: {e}")))?;

    match raw {
        0 => Err(ContourError::parse(line, "face index 0 is not valid in 1-based OBJ")),
        r if r > 0 => Ok(r - 1),
        r => Ok(i64::try_from(points_so_far).unwrap_or(i64::MAX) + r),
    }
}
