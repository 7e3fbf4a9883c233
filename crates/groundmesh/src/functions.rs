//! Whole-mesh construction and measurement passes.

use eyre::{Result, ensure};
use glam::Vec3;
use groundmath::aabb::Aabb;
use groundmath::collections::IndexNewtype;

use crate::brep::{AttributeError, FaceId, Mesh, VertexId};

/// Builds a mesh from indexed triangles and stores `positions` as the vertex
/// `"position"` attribute. Edges shared between triangles are reused, so
/// interior edges end up with two loops and boundary edges with one.
pub fn make_triangle_mesh(positions: &[Vec3], triangles: &[[u32; 3]]) -> Result<Mesh> {
    let mut mesh = Mesh::new();
    let vertices: Vec<VertexId> = positions
        .iter()
        .map(|_| mesh.add_vertex())
        .collect::<Result<_>>()?;
    for tri in triangles {
        for &i in tri {
            ensure!(
                (i as usize) < vertices.len(),
                "triangle vertex index {i} out of range for {} vertices",
                vertices.len(),
            );
        }
        mesh.add_face(&[
            vertices[tri[0] as usize],
            vertices[tri[1] as usize],
            vertices[tri[2] as usize],
        ])?;
    }
    mesh.vertices_mut()
        .attributes_mut()
        .emplace::<Vec3>("position")
        .copy_from_slice(positions);
    tracing::debug!(
        vertices = mesh.vertices().len(),
        edges = mesh.edges().len(),
        faces = mesh.faces().len(),
        "built triangle mesh",
    );
    Ok(mesh)
}

/// Computes a unit normal for every face and stores the result as the face
/// `"normal"` attribute, replacing any existing one.
///
/// Normals follow the winding order of each face's loops; degenerate faces
/// get a zero normal.
pub fn generate_face_normals(mesh: &mut Mesh) -> Result<(), AttributeError> {
    let positions = mesh.vertices().attributes().at::<Vec3>("position")?;
    let normals: Vec<Vec3> = mesh
        .faces()
        .ids()
        .map(|f| {
            let [a, b, c] = face_positions(mesh, positions, f);
            (b - a).cross(c - a).normalize_or_zero()
        })
        .collect();
    mesh.faces_mut()
        .attributes_mut()
        .emplace::<Vec3>("normal")
        .copy_from_slice(&normals);
    Ok(())
}

/// Computes a unit normal for every vertex by averaging the normals of its
/// incident faces, and stores the result as the vertex `"normal"` attribute,
/// replacing any existing one.
///
/// Requires face normals (see [`generate_face_normals`]). Isolated vertices
/// get a zero normal.
pub fn generate_vertex_normals(mesh: &mut Mesh) -> Result<(), AttributeError> {
    let face_normals = mesh.faces().attributes().at::<Vec3>("normal")?;
    let normals: Vec<Vec3> = mesh
        .vertices()
        .ids()
        .map(|v| {
            // Each incident face contributes exactly one loop originating at
            // this vertex.
            let mut sum = Vec3::ZERO;
            for e in mesh.vertex_edges(v) {
                for l in mesh.edge_loops(e) {
                    if mesh.loop_vertex(l) == v {
                        sum += face_normals[mesh.loop_face(l).to_usize()];
                    }
                }
            }
            sum.normalize_or_zero()
        })
        .collect();
    mesh.vertices_mut()
        .attributes_mut()
        .emplace::<Vec3>("normal")
        .copy_from_slice(&normals);
    Ok(())
}

/// Returns the bounding box of the vertex `"position"` attribute.
pub fn calculate_bounds(mesh: &Mesh) -> Result<Aabb, AttributeError> {
    let positions = mesh.vertices().attributes().at::<Vec3>("position")?;
    Ok(Aabb::from_points(positions.iter().copied()))
}

/// Returns the positions of the first three vertices of a face's winding.
pub(crate) fn face_positions(mesh: &Mesh, positions: &[Vec3], f: FaceId) -> [Vec3; 3] {
    let mut it = mesh.face_loops(f).iter();
    let mut p = [Vec3::ZERO; 3];
    for slot in &mut p {
        if let Some(l) = it.next() {
            *slot = positions[mesh.loop_vertex(l).to_usize()];
        }
    }
    p
}

#[cfg(test)]
mod tests {
    use groundmath::assert_approx_eq;
    use pretty_assertions::assert_eq;

    use super::*;

    fn unit_square() -> Mesh {
        make_triangle_mesh(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 3], [1, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_make_triangle_mesh_shares_edges() {
        let mesh = unit_square();
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.edges().len(), 5);
        assert_eq!(mesh.faces().len(), 2);
        let boundary = mesh.edges().ids().filter(|&e| mesh.is_boundary_edge(e)).count();
        assert_eq!(boundary, 4);
    }

    #[test]
    fn test_make_triangle_mesh_rejects_bad_index() {
        assert!(make_triangle_mesh(&[Vec3::ZERO, Vec3::X, Vec3::Y], &[[0, 1, 7]]).is_err());
    }

    #[test]
    fn test_generate_face_normals() {
        let mut mesh = unit_square();
        generate_face_normals(&mut mesh).unwrap();
        let normals = mesh.faces().attributes().at::<Vec3>("normal").unwrap();
        assert_eq!(normals.len(), 2);
        for n in normals {
            assert_approx_eq!(n.x, 0.0);
            assert_approx_eq!(n.y, 0.0);
            assert_approx_eq!(n.z, 1.0);
        }
    }

    #[test]
    fn test_generate_face_normals_requires_positions() {
        let mut mesh = Mesh::new();
        assert_eq!(
            generate_face_normals(&mut mesh),
            Err(AttributeError::NotFound {
                name: "position".to_owned(),
            }),
        );
    }

    #[test]
    fn test_generate_vertex_normals_flat() {
        let mut mesh = unit_square();
        generate_face_normals(&mut mesh).unwrap();
        generate_vertex_normals(&mut mesh).unwrap();
        let normals = mesh.vertices().attributes().at::<Vec3>("normal").unwrap();
        assert_eq!(normals.len(), 4);
        for n in normals {
            assert_approx_eq!(n.x, 0.0);
            assert_approx_eq!(n.y, 0.0);
            assert_approx_eq!(n.z, 1.0);
        }
    }

    #[test]
    fn test_generate_vertex_normals_averages_across_fold() {
        // Floor square plus a wall rising from its far edge.
        let mut mesh = make_triangle_mesh(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(0.0, 1.0, 1.0),
            ],
            &[[0, 1, 3], [1, 2, 3], [3, 2, 5], [2, 4, 5]],
        )
        .unwrap();
        generate_face_normals(&mut mesh).unwrap();
        generate_vertex_normals(&mut mesh).unwrap();
        let normals = mesh.vertices().attributes().at::<Vec3>("normal").unwrap();

        // A vertex touching only the floor keeps the floor normal.
        assert_approx_eq!(normals[0].z, 1.0);
        // A vertex on the fold blends one floor face with two wall faces:
        // (0,0,1) + 2*(0,-1,0), normalized.
        let expected = Vec3::new(0.0, -2.0, 1.0).normalize();
        assert_approx_eq!(normals[2].x, expected.x);
        assert_approx_eq!(normals[2].y, expected.y);
        assert_approx_eq!(normals[2].z, expected.z);
    }

    #[test]
    fn test_generate_vertex_normals_requires_face_normals() {
        let mut mesh = unit_square();
        assert_eq!(
            generate_vertex_normals(&mut mesh),
            Err(AttributeError::NotFound {
                name: "normal".to_owned(),
            }),
        );
    }

    #[test]
    fn test_calculate_bounds() {
        let bounds = calculate_bounds(&unit_square()).unwrap();
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 0.0));
    }
}
