//! Surface traversal over triangulated navigation meshes.
//!
//! A traversal starts on a face and walks toward a target point, unfolding
//! across shared edges: each time the target leaves the current triangle, the
//! walk rotates the remaining motion into the plane of the neighboring face
//! and continues there, so the path length along the surface is preserved.

use eyre::{Result, ensure};
use glam::{Quat, Vec3};
use groundmath::collections::IndexNewtype;
use groundmath::triangle::{cartesian_to_barycentric, closest_point_triangle};

use crate::brep::{EdgeId, FaceId, LoopId, Mesh};
use crate::functions::face_positions;

/// Mesh feature on which a traversal came to rest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TraversalFeature {
    /// The traversal ended inside a face.
    Face(FaceId),
    /// The traversal stopped on an edge, either at the mesh boundary or
    /// because it started oscillating across that edge.
    Edge(EdgeId),
}

/// Result of a navmesh traversal.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NavmeshTraversal {
    /// Feature on which the traversal ended.
    pub feature: TraversalFeature,
    /// Target point, unfolded into the plane of the final face.
    pub target_point: Vec3,
    /// Point on the final face closest to the target point.
    pub closest_point: Vec3,
    /// Barycentric coordinates of the closest point on the final face.
    pub barycentric: Vec3,
}

/// State carried between traversal steps.
struct WalkState {
    face: FaceId,
    target_point: Vec3,
    direction: Vec3,
    previous_edge: Option<EdgeId>,
}

/// Outcome of one traversal step.
enum Step {
    /// The walk crossed an interior edge into a neighboring face.
    Crossed {
        face: FaceId,
        target_point: Vec3,
        direction: Vec3,
        edge: EdgeId,
        closest_point: Vec3,
    },
    /// The target projects inside the current face.
    Arrived { closest_point: Vec3 },
    /// The walk ran into a boundary edge.
    BlockedByBoundary { edge: EdgeId, closest_point: Vec3 },
    /// The walk tried to cross back over the edge it just came from.
    CycleDetected { edge: EdgeId, closest_point: Vec3 },
}

/// Walks from `start` on `face` toward `end` along the mesh surface.
///
/// The mesh must be triangulated, with a vertex `"position"` attribute and a
/// face `"normal"` attribute (see
/// [`generate_face_normals`](crate::functions::generate_face_normals)), and
/// `start` must lie on `face`.
///
/// The walk ends on a face if the target point projects inside it, or on an
/// edge if it reaches the mesh boundary or starts oscillating between two
/// faces. As a last resort the step count is capped at twice the face count,
/// which no simple walk can exceed.
pub fn traverse_navmesh(
    mesh: &Mesh,
    face: FaceId,
    start: Vec3,
    end: Vec3,
) -> Result<NavmeshTraversal> {
    let max_crossings = mesh.faces().len().saturating_mul(2);
    traverse_with_limit(mesh, face, start, end, max_crossings)
}

/// [`traverse_navmesh`] with an explicit crossing limit.
fn traverse_with_limit(
    mesh: &Mesh,
    face: FaceId,
    start: Vec3,
    end: Vec3,
    max_crossings: usize,
) -> Result<NavmeshTraversal> {
    ensure!(mesh.faces().contains(face), "no such face: {face}");
    let positions = mesh.vertices().attributes().at::<Vec3>("position")?;
    let normals = mesh.faces().attributes().at::<Vec3>("normal")?;

    let mut state = WalkState {
        face,
        target_point: end,
        direction: (end - start).normalize_or_zero(),
        previous_edge: None,
    };
    let mut remaining_crossings = max_crossings;
    loop {
        match step(mesh, positions, normals, &state) {
            Step::Arrived { closest_point } => {
                return Ok(finish(
                    mesh,
                    positions,
                    TraversalFeature::Face(state.face),
                    state.face,
                    state.target_point,
                    closest_point,
                ));
            }
            Step::BlockedByBoundary { edge, closest_point }
            | Step::CycleDetected { edge, closest_point } => {
                return Ok(finish(
                    mesh,
                    positions,
                    TraversalFeature::Edge(edge),
                    state.face,
                    state.target_point,
                    closest_point,
                ));
            }
            Step::Crossed {
                face,
                target_point,
                direction,
                edge,
                closest_point,
            } => {
                if remaining_crossings == 0 {
                    // Report against the face the walk was on: the crossing
                    // point lies on that face's triangle.
                    tracing::warn!(%edge, "navmesh traversal exceeded crossing limit");
                    return Ok(finish(
                        mesh,
                        positions,
                        TraversalFeature::Edge(edge),
                        state.face,
                        state.target_point,
                        closest_point,
                    ));
                }
                remaining_crossings -= 1;
                tracing::trace!(%edge, from = %state.face, to = %face, "crossed edge");
                state = WalkState {
                    face,
                    target_point,
                    direction,
                    previous_edge: Some(edge),
                };
            }
        }
    }
}

/// Advances the walk by one face.
fn step(mesh: &Mesh, positions: &[Vec3], normals: &[Vec3], state: &WalkState) -> Step {
    let mut loops = mesh.face_loops(state.face).iter();
    let (Some(l0), Some(l1), Some(l2)) = (loops.next(), loops.next(), loops.next()) else {
        unreachable!("navmesh face {} has fewer than 3 loops", state.face)
    };
    let corner_loops: [LoopId; 3] = [l0, l1, l2];
    let [a, b, c] = face_positions(mesh, positions, state.face);

    let (closest_point, region) = closest_point_triangle(a, b, c, state.target_point);
    if region.is_face_region() {
        return Step::Arrived { closest_point };
    }

    // Pick the loop whose edge the walk should cross. Edge regions map
    // straight to a loop; vertex regions choose between the two loops meeting
    // at the vertex, preferring an interior edge and breaking ties by which
    // edge is more perpendicular to the direction of motion.
    let closest_loop = if let Some(edge_index) = region.edge_index() {
        let l = corner_loops[edge_index];
        if mesh.is_boundary_edge(mesh.loop_edge(l)) {
            return Step::BlockedByBoundary {
                edge: mesh.loop_edge(l),
                closest_point,
            };
        }
        l
    } else {
        let Some(vertex_index) = region.vertex_index() else {
            unreachable!("region is neither face, edge, nor vertex")
        };
        let current = corner_loops[vertex_index];
        let previous = mesh.loop_prev(current);
        let current_blocked = mesh.is_boundary_edge(mesh.loop_edge(current));
        let previous_blocked = mesh.is_boundary_edge(mesh.loop_edge(previous));
        if current_blocked && previous_blocked {
            return Step::BlockedByBoundary {
                edge: mesh.loop_edge(current),
                closest_point,
            };
        } else if previous_blocked {
            current
        } else if current_blocked {
            previous
        } else {
            let origin = positions[mesh.loop_vertex(current).to_usize()];
            let ahead = positions[mesh.loop_vertex(mesh.loop_next(current)).to_usize()];
            let behind = positions[mesh.loop_vertex(previous).to_usize()];
            let current_direction = (ahead - origin).normalize_or_zero();
            let previous_direction = (origin - behind).normalize_or_zero();
            let current_dot = state.direction.dot(current_direction).abs();
            let previous_dot = state.direction.dot(previous_direction).abs();
            if current_dot < previous_dot { current } else { previous }
        }
    };

    let closest_edge = mesh.loop_edge(closest_loop);
    if state.previous_edge == Some(closest_edge) {
        return Step::CycleDetected {
            edge: closest_edge,
            closest_point,
        };
    }

    // Cross into the face on the other side of the edge, rotating the target
    // point and direction about the crossing point by the dihedral angle.
    let radial = mesh.edge_loops(closest_edge);
    let symmetric_loop = match (radial.front(), radial.back()) {
        (Some(front), Some(back)) if front == closest_loop => back,
        (Some(front), _) => front,
        _ => unreachable!("interior edge {closest_edge} has an empty radial list"),
    };
    let symmetric_face = mesh.loop_face(symmetric_loop);
    let rotation = Quat::from_rotation_arc(
        normals[state.face.to_usize()],
        normals[symmetric_face.to_usize()],
    );
    Step::Crossed {
        face: symmetric_face,
        target_point: rotation * (state.target_point - closest_point) + closest_point,
        direction: rotation * state.direction,
        edge: closest_edge,
        closest_point,
    }
}

/// Packages the final traversal state.
fn finish(
    mesh: &Mesh,
    positions: &[Vec3],
    feature: TraversalFeature,
    face: FaceId,
    target_point: Vec3,
    closest_point: Vec3,
) -> NavmeshTraversal {
    let [a, b, c] = face_positions(mesh, positions, face);
    NavmeshTraversal {
        feature,
        target_point,
        closest_point,
        barycentric: cartesian_to_barycentric(closest_point, a, b, c),
    }
}

#[cfg(test)]
mod tests {
    use groundmath::assert_approx_eq;

    use super::*;
    use crate::brep::VertexId;
    use crate::functions::{generate_face_normals, make_triangle_mesh};

    /// Unit square in the XY plane, split along the (1,0)-(0,1) diagonal.
    fn square() -> Mesh {
        let mut mesh = make_triangle_mesh(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 3], [1, 2, 3]],
        )
        .unwrap();
        generate_face_normals(&mut mesh).unwrap();
        mesh
    }

    /// Unit box fold: floor square plus a wall rising from its far edge.
    fn folded_strip() -> Mesh {
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
        mesh
    }

    #[test]
    fn test_arrives_on_start_face() {
        let mesh = square();
        let result = traverse_navmesh(
            &mesh,
            FaceId(0),
            Vec3::new(0.1, 0.1, 0.0),
            Vec3::new(0.2, 0.3, 0.0),
        )
        .unwrap();
        assert_eq!(result.feature, TraversalFeature::Face(FaceId(0)));
        assert_approx_eq!(result.closest_point.x, 0.2);
        assert_approx_eq!(result.closest_point.y, 0.3);
        let bary = result.barycentric;
        assert_approx_eq!(bary.x + bary.y + bary.z, 1.0);
        assert!(bary.min_element() >= -groundmath::EPSILON);
    }

    #[test]
    fn test_crosses_shared_edge() {
        let mesh = square();
        let result = traverse_navmesh(
            &mesh,
            FaceId(0),
            Vec3::new(0.1, 0.1, 0.0),
            Vec3::new(0.9, 0.9, 0.0),
        )
        .unwrap();
        // Coplanar faces: the unfolding rotation is the identity, so the
        // target is reached exactly, one face over.
        assert_eq!(result.feature, TraversalFeature::Face(FaceId(1)));
        assert_approx_eq!(result.closest_point.x, 0.9);
        assert_approx_eq!(result.closest_point.y, 0.9);
        assert_approx_eq!(result.target_point.z, 0.0);
    }

    #[test]
    fn test_stops_on_boundary_edge() {
        let mesh = square();
        let result = traverse_navmesh(
            &mesh,
            FaceId(0),
            Vec3::new(0.4, 0.2, 0.0),
            Vec3::new(0.5, -1.0, 0.0),
        )
        .unwrap();
        let bottom = mesh.find_edge(VertexId(0), VertexId(1)).unwrap();
        assert_eq!(result.feature, TraversalFeature::Edge(bottom));
        assert_approx_eq!(result.closest_point.x, 0.5);
        assert_approx_eq!(result.closest_point.y, 0.0);
    }

    #[test]
    fn test_vertex_region_stops_when_both_edges_are_boundary() {
        let mut mesh = make_triangle_mesh(
            &[Vec3::ZERO, Vec3::X, Vec3::Y],
            &[[0, 1, 2]],
        )
        .unwrap();
        generate_face_normals(&mut mesh).unwrap();
        let result = traverse_navmesh(
            &mesh,
            FaceId(0),
            Vec3::new(0.2, 0.2, 0.0),
            Vec3::new(2.0, -0.5, 0.0),
        )
        .unwrap();
        // Both loops at vertex 1 run along boundary edges; the reported edge
        // is the one the loop at that vertex runs along.
        let bc = mesh.find_edge(VertexId(1), VertexId(2)).unwrap();
        assert_eq!(result.feature, TraversalFeature::Edge(bc));
        assert_eq!(result.closest_point, Vec3::X);
    }

    #[test]
    fn test_oscillation_reports_crossed_edge() {
        let mesh = square();
        // The target is past the corner at (1,0): the walk crosses the
        // diagonal, then immediately wants to cross back.
        let result = traverse_navmesh(
            &mesh,
            FaceId(0),
            Vec3::new(0.1, 0.1, 0.0),
            Vec3::new(1.5, -0.5, 0.0),
        )
        .unwrap();
        let diagonal = mesh.find_edge(VertexId(1), VertexId(3)).unwrap();
        assert_eq!(result.feature, TraversalFeature::Edge(diagonal));
    }

    #[test]
    fn test_unfolds_across_fold() {
        let mesh = folded_strip();
        // Walk straight up the floor and 0.5 past the fold at y=1; the
        // target should unfold onto the wall at height 0.5.
        let result = traverse_navmesh(
            &mesh,
            FaceId(0),
            Vec3::new(0.25, 0.1, 0.0),
            Vec3::new(0.25, 1.5, 0.0),
        )
        .unwrap();
        assert_eq!(result.feature, TraversalFeature::Face(FaceId(2)));
        assert_approx_eq!(result.target_point.x, 0.25);
        assert_approx_eq!(result.target_point.y, 1.0);
        assert_approx_eq!(result.target_point.z, 0.5);
        assert_approx_eq!(result.closest_point.z, 0.5);
    }

    #[test]
    fn test_crossing_limit_reports_edge_on_current_face() {
        let mesh = square();
        // A zero crossing limit stops the walk at its first edge crossing.
        let result = traverse_with_limit(
            &mesh,
            FaceId(0),
            Vec3::new(0.1, 0.1, 0.0),
            Vec3::new(0.9, 0.9, 0.0),
            0,
        )
        .unwrap();
        let diagonal = mesh.find_edge(VertexId(1), VertexId(3)).unwrap();
        assert_eq!(result.feature, TraversalFeature::Edge(diagonal));
        // The crossing point and barycentric coordinates belong to the face
        // the walk was on, not the face it was about to enter.
        assert_approx_eq!(result.closest_point.x, 0.5);
        assert_approx_eq!(result.closest_point.y, 0.5);
        let bary = result.barycentric;
        assert_approx_eq!(bary.x + bary.y + bary.z, 1.0);
        assert!(bary.min_element() >= -groundmath::EPSILON);
        assert!(bary.max_element() <= 1.0 + groundmath::EPSILON);
        assert_approx_eq!(result.target_point.x, 0.9);
        assert_approx_eq!(result.target_point.y, 0.9);
    }

    #[test]
    fn test_step_cycle_guard() {
        let mesh = square();
        let positions = mesh.vertices().attributes().at::<Vec3>("position").unwrap();
        let normals = mesh.faces().attributes().at::<Vec3>("normal").unwrap();
        let diagonal = mesh.find_edge(VertexId(1), VertexId(3)).unwrap();
        // The walk just crossed the diagonal; wanting to cross it again is a
        // cycle.
        let state = WalkState {
            face: FaceId(0),
            target_point: Vec3::new(0.9, 0.9, 0.0),
            direction: Vec3::new(1.0, 1.0, 0.0).normalize(),
            previous_edge: Some(diagonal),
        };
        match step(&mesh, positions, normals, &state) {
            Step::CycleDetected { edge, .. } => assert_eq!(edge, diagonal),
            _ => panic!("expected cycle detection"),
        }
    }

    #[test]
    fn test_requires_normals() {
        let mesh = make_triangle_mesh(&[Vec3::ZERO, Vec3::X, Vec3::Y], &[[0, 1, 2]]).unwrap();
        assert!(traverse_navmesh(&mesh, FaceId(0), Vec3::ZERO, Vec3::X).is_err());
    }

    #[test]
    fn test_rejects_bad_face() {
        let mesh = square();
        assert!(traverse_navmesh(&mesh, FaceId(9), Vec3::ZERO, Vec3::X).is_err());
    }
}
