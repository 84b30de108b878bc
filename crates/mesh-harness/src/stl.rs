//! STL export from a [`RawMesh`] — binary and ASCII formats (ref. the
//! teacher's `export_binary_stl`/`export_ascii_stl`, retargeted from
//! `RenderMesh` to the crate's own wire-boundary mesh shape).

use mesh_core::external::RawMesh;

use crate::helpers::HarnessError;

fn face_normal(raw: &RawMesh, tri: [u32; 3]) -> (f32, f32, f32) {
    let p0 = raw.position(tri[0]);
    let p1 = raw.position(tri[1]);
    let p2 = raw.position(tri[2]);
    let n = (p1 - p0).cross(&(p2 - p0));
    match n.normalized() {
        Some(u) => (u.x as f32, u.y as f32, u.z as f32),
        None => (0.0, 0.0, 1.0),
    }
}

/// Export a `RawMesh` as a binary STL file.
///
/// Binary STL format:
/// - 80-byte header (arbitrary text)
/// - u32 triangle count (little-endian)
/// - For each triangle: 3×f32 normal + 3×(3×f32 vertex) + u16 attribute = 50 bytes
pub fn export_binary_stl(mesh: &RawMesh, name: &str) -> Result<Vec<u8>, HarnessError> {
    let tri_count = mesh.triangle_count();
    if tri_count == 0 {
        return Err(HarnessError::StlError {
            reason: "mesh has no triangles".to_string(),
        });
    }
    mesh.validate().map_err(|e| HarnessError::StlError { reason: e.to_string() })?;

    let file_size = 80 + 4 + tri_count * 50;
    let mut buf = Vec::with_capacity(file_size);

    let header = format!("binary STL: {name}");
    let header_bytes = header.as_bytes();
    buf.extend_from_slice(&header_bytes[..header_bytes.len().min(80)]);
    buf.resize(80, 0u8);

    buf.extend_from_slice(&(tri_count as u32).to_le_bytes());

    for t in 0..tri_count {
        let tri = mesh.triangle(t);
        let (nx, ny, nz) = face_normal(mesh, tri);
        buf.extend_from_slice(&nx.to_le_bytes());
        buf.extend_from_slice(&ny.to_le_bytes());
        buf.extend_from_slice(&nz.to_le_bytes());

        for &idx in &tri {
            let p = mesh.position(idx);
            buf.extend_from_slice(&(p.x as f32).to_le_bytes());
            buf.extend_from_slice(&(p.y as f32).to_le_bytes());
            buf.extend_from_slice(&(p.z as f32).to_le_bytes());
        }

        buf.extend_from_slice(&0u16.to_le_bytes());
    }

    Ok(buf)
}

/// Export a `RawMesh` as an ASCII STL string.
pub fn export_ascii_stl(mesh: &RawMesh, name: &str) -> Result<String, HarnessError> {
    let tri_count = mesh.triangle_count();
    if tri_count == 0 {
        return Err(HarnessError::StlError {
            reason: "mesh has no triangles".to_string(),
        });
    }
    mesh.validate().map_err(|e| HarnessError::StlError { reason: e.to_string() })?;

    let mut out = String::with_capacity(tri_count * 300);
    out.push_str(&format!("solid {name}\n"));

    for t in 0..tri_count {
        let tri = mesh.triangle(t);
        let (nx, ny, nz) = face_normal(mesh, tri);
        out.push_str(&format!("  facet normal {nx} {ny} {nz}\n"));
        out.push_str("    outer loop\n");
        for &idx in &tri {
            let p = mesh.position(idx);
            out.push_str(&format!("      vertex {} {} {}\n", p.x as f32, p.y as f32, p.z as f32));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }

    out.push_str(&format!("endsolid {name}\n"));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_mesh() -> RawMesh {
        RawMesh {
            vert_properties: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            tri_verts: vec![0, 1, 2],
            tri_ids: vec![],
        }
    }

    fn box_mesh() -> RawMesh {
        RawMesh {
            vert_properties: vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0,
            ],
            tri_verts: vec![
                0, 1, 2, 0, 2, 3, // bottom
                4, 6, 5, 4, 7, 6, // top
                0, 4, 5, 0, 5, 1, // front
                2, 6, 7, 2, 7, 3, // back
                0, 3, 7, 0, 7, 4, // left
                1, 5, 6, 1, 6, 2, // right
            ],
            tri_ids: vec![],
        }
    }

    #[test]
    fn binary_stl_header_is_80_bytes() {
        let mesh = triangle_mesh();
        let stl = export_binary_stl(&mesh, "test").unwrap();
        assert!(stl.len() >= 80);
        let header = String::from_utf8_lossy(&stl[..80]);
        assert!(header.contains("test"));
    }

    #[test]
    fn binary_stl_file_size_formula() {
        let mesh = box_mesh();
        let stl = export_binary_stl(&mesh, "box").unwrap();
        let tri_count = mesh.triangle_count();
        assert_eq!(stl.len(), 80 + 4 + tri_count * 50);
    }

    #[test]
    fn binary_stl_triangle_count_matches() {
        let mesh = box_mesh();
        let stl = export_binary_stl(&mesh, "box").unwrap();
        let tri_count = u32::from_le_bytes([stl[80], stl[81], stl[82], stl[83]]);
        assert_eq!(tri_count as usize, mesh.triangle_count());
    }

    #[test]
    fn ascii_stl_has_correct_keywords() {
        let mesh = triangle_mesh();
        let stl = export_ascii_stl(&mesh, "test_solid").unwrap();
        assert!(stl.starts_with("solid test_solid\n"));
        assert!(stl.ends_with("endsolid test_solid\n"));
        assert!(stl.contains("facet normal"));
        assert!(stl.contains("outer loop"));
        assert!(stl.contains("vertex"));
        assert!(stl.contains("endloop"));
        assert!(stl.contains("endfacet"));
    }

    #[test]
    fn empty_mesh_returns_error() {
        let mesh = RawMesh::default();
        assert!(export_binary_stl(&mesh, "empty").is_err());
        assert!(export_ascii_stl(&mesh, "empty").is_err());
    }

    #[test]
    fn invalid_index_returns_error() {
        let mesh = RawMesh {
            vert_properties: vec![0.0, 0.0, 0.0],
            tri_verts: vec![0, 1, 2],
            tri_ids: vec![],
        };
        assert!(export_binary_stl(&mesh, "bad").is_err());
        assert!(export_ascii_stl(&mesh, "bad").is_err());
    }
}
