//! Cross-module invariant tests.

use glam::Vec3;
use groundmath::ray::Ray;
use pretty_assertions::assert_eq;

use crate::brep::{FaceId, Mesh, VertexId};
use crate::bvh::Bvh;
use crate::functions::{generate_face_normals, make_triangle_mesh};
use crate::navmesh::{TraversalFeature, traverse_navmesh};

/// Unit square in the XY plane, split along the (1,0)-(0,1) diagonal.
fn square() -> Mesh {
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
fn test_vertex_edge_lists_are_circular() {
    let mesh = square();
    for v in mesh.vertices().ids() {
        let list = mesh.vertex_edges(v);
        let Some(head) = list.front() else { continue };
        let mut forward = head;
        let mut backward = head;
        for _ in 0..list.len() {
            let side = mesh.edges.elements[forward].side(v);
            forward = mesh.edges.elements[forward].vertex_next[side];
            let side = mesh.edges.elements[backward].side(v);
            backward = mesh.edges.elements[backward].vertex_prev[side];
        }
        assert_eq!(forward, head);
        assert_eq!(backward, head);
    }
}

#[test]
fn test_loop_cycles_are_circular() {
    let mesh = square();
    for e in mesh.edges().ids() {
        let list = mesh.edge_loops(e);
        let Some(head) = list.front() else { continue };
        let mut cur = head;
        for _ in 0..list.len() {
            cur = mesh.loops.elements[cur].edge_next;
        }
        assert_eq!(cur, head);
    }
    for f in mesh.faces().ids() {
        let list = mesh.face_loops(f);
        let Some(head) = list.front() else { continue };
        let mut cur = head;
        for _ in 0..list.len() {
            cur = mesh.loops.elements[cur].face_next;
        }
        assert_eq!(cur, head);
    }
}

#[test]
fn test_list_iterators_are_double_ended() {
    let mesh = square();
    let forward: Vec<_> = mesh.face_loops(FaceId(0)).iter().collect();
    let mut backward: Vec<_> = mesh.face_loops(FaceId(0)).iter().rev().collect();
    backward.reverse();
    assert_eq!(forward, backward);
    assert_eq!(forward.len(), 3);

    // Vertex 1 bounds three edges.
    let forward: Vec<_> = mesh.vertex_edges(VertexId(1)).iter().collect();
    let mut backward: Vec<_> = mesh.vertex_edges(VertexId(1)).iter().rev().collect();
    backward.reverse();
    assert_eq!(forward, backward);
    assert_eq!(forward.len(), 3);
}

#[test]
fn test_attributes_follow_element_swaps() {
    let mut mesh = square();
    mesh.vertices_mut()
        .attributes_mut()
        .emplace::<u32>("tag")
        .copy_from_slice(&[10, 11, 12, 13]);

    mesh.remove_vertex(VertexId(0)).unwrap();

    // The last vertex took slot 0; its attributes came along.
    let tags = mesh.vertices().attributes().at::<u32>("tag").unwrap();
    assert_eq!(tags, [13, 11, 12]);
    let positions = mesh.vertices().attributes().at::<Vec3>("position").unwrap();
    assert_eq!(positions[0], Vec3::new(0.0, 1.0, 0.0));

    for container_len in [
        (mesh.vertices().len(), mesh.vertices().attributes().element_count()),
        (mesh.faces().len(), mesh.faces().attributes().element_count()),
    ] {
        assert_eq!(container_len.0, container_len.1);
    }

    // The surviving face still winds over live vertices.
    assert_eq!(mesh.faces().len(), 1);
    for f in mesh.faces().ids() {
        for l in mesh.face_loops(f) {
            assert!(mesh.vertices().contains(mesh.loop_vertex(l)));
            let [a, b] = mesh.edge_vertices(mesh.loop_edge(l));
            assert!(a == mesh.loop_vertex(l) || b == mesh.loop_vertex(l));
        }
    }
}

#[test]
fn test_pick_face_then_traverse() {
    let mut mesh = square();
    generate_face_normals(&mut mesh).unwrap();
    let bvh = Bvh::from_mesh(&mesh).unwrap();

    let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), -Vec3::Z);
    let mut candidates = vec![];
    bvh.visit(&ray, |p| candidates.push(p));
    assert!(candidates.contains(&0));

    let result = traverse_navmesh(
        &mesh,
        FaceId(0),
        Vec3::new(0.2, 0.2, 0.0),
        Vec3::new(0.8, 0.7, 0.0),
    )
    .unwrap();
    assert_eq!(result.feature, TraversalFeature::Face(FaceId(1)));
}
