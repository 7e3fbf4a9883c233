//! Closest-point queries and barycentric coordinates on triangles.

use glam::Vec3;

/// Voronoi regions of a triangle with vertices `a`, `b`, and `c`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TriangleRegion {
    /// Vertex `a` region.
    A,
    /// Vertex `b` region.
    B,
    /// Vertex `c` region.
    C,
    /// Edge `ab` region.
    Ab,
    /// Edge `bc` region.
    Bc,
    /// Edge `ca` region.
    Ca,
    /// Face region.
    Abc,
}

impl TriangleRegion {
    /// Returns `true` if the region is the face region.
    pub const fn is_face_region(self) -> bool {
        matches!(self, Self::Abc)
    }

    /// Returns `true` if the region is an edge region.
    pub const fn is_edge_region(self) -> bool {
        matches!(self, Self::Ab | Self::Bc | Self::Ca)
    }

    /// Returns `true` if the region is a vertex region.
    pub const fn is_vertex_region(self) -> bool {
        matches!(self, Self::A | Self::B | Self::C)
    }

    /// Returns the edge index of an edge region (`ab` = 0, `bc` = 1,
    /// `ca` = 2), or `None` for other regions.
    pub const fn edge_index(self) -> Option<usize> {
        match self {
            Self::Ab => Some(0),
            Self::Bc => Some(1),
            Self::Ca => Some(2),
            _ => None,
        }
    }

    /// Returns the vertex index of a vertex region (`a` = 0, `b` = 1,
    /// `c` = 2), or `None` for other regions.
    pub const fn vertex_index(self) -> Option<usize> {
        match self {
            Self::A => Some(0),
            Self::B => Some(1),
            Self::C => Some(2),
            _ => None,
        }
    }
}

/// Calculates the closest point on a triangle to a point, along with the
/// Voronoi region containing the point.
///
/// See Ericson, C. (2004). Real-time collision detection. CRC Press.
pub fn closest_point_triangle(a: Vec3, b: Vec3, c: Vec3, p: Vec3) -> (Vec3, TriangleRegion) {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let ap_dot_ab = ap.dot(ab);
    let ap_dot_ac = ap.dot(ac);
    if ap_dot_ab <= 0.0 && ap_dot_ac <= 0.0 {
        return (a, TriangleRegion::A);
    }

    let bc = c - b;
    let bp = p - b;
    let bp_dot_ba = bp.dot(a - b);
    let bp_dot_bc = bp.dot(bc);
    if bp_dot_ba <= 0.0 && bp_dot_bc <= 0.0 {
        return (b, TriangleRegion::B);
    }

    let cp = p - c;
    let cp_dot_ca = cp.dot(a - c);
    let cp_dot_cb = cp.dot(b - c);
    if cp_dot_ca <= 0.0 && cp_dot_cb <= 0.0 {
        return (c, TriangleRegion::C);
    }

    let n = ab.cross(ac);
    let pa = a - p;
    let pb = b - p;
    let vc = n.dot(pa.cross(pb));
    if vc <= 0.0 && ap_dot_ab >= 0.0 && bp_dot_ba >= 0.0 {
        return (
            a + ab * (ap_dot_ab / (ap_dot_ab + bp_dot_ba)),
            TriangleRegion::Ab,
        );
    }

    let pc = c - p;
    let va = n.dot(pb.cross(pc));
    if va <= 0.0 && bp_dot_bc >= 0.0 && cp_dot_cb >= 0.0 {
        return (
            b + bc * (bp_dot_bc / (bp_dot_bc + cp_dot_cb)),
            TriangleRegion::Bc,
        );
    }

    let vb = n.dot(pc.cross(pa));
    if vb <= 0.0 && ap_dot_ac >= 0.0 && cp_dot_ca >= 0.0 {
        return (
            a + ac * (ap_dot_ac / (ap_dot_ac + cp_dot_ca)),
            TriangleRegion::Ca,
        );
    }

    let u = va / (va + vb + vc);
    let v = vb / (va + vb + vc);
    let w = 1.0 - u - v;
    (a * u + b * v + c * w, TriangleRegion::Abc)
}

/// Converts barycentric coordinates to Cartesian coordinates.
pub fn barycentric_to_cartesian(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    a * p.x + b * p.y + c * p.z
}

/// Converts Cartesian coordinates to barycentric coordinates.
pub fn cartesian_to_barycentric(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ca = a - c;
    let ap = p - a;
    let n = ab.cross(ca);
    let d = n.length_squared();
    let q = n.cross(ap);
    let w = q.dot(ab) / d;
    let v = q.dot(ca) / d;
    Vec3::new(1.0 - v - w, v, w)
}
