//! Half-edge adjacency used by the edge collapse passes
//!
//! Built once from a [`TriangleMesh`], mutated by collapses, and compacted
//! back into a triangle mesh when the pass finishes. Removed faces and
//! vertices are tombstoned with [`INVALID`] rather than erased so indices
//! held by the caller's priority queue stay meaningful.

use std::collections::{HashMap, HashSet};
use geomopt_core::{Point3f, TriangleMesh, Vector3f};

pub(crate) const INVALID: usize = usize::MAX;

#[derive(Debug, Clone)]
pub(crate) struct HalfEdge {
    pub target: usize,
    pub twin: usize,
    pub next: usize,
    pub prev: usize,
    pub face: usize,
}

/// Half-edge mesh for topology-aware edge collapse operations.
pub(crate) struct HalfEdgeMesh {
    pub half_edges: Vec<HalfEdge>,
    /// One outgoing half-edge per vertex (INVALID if removed)
    pub vertex_edge: Vec<usize>,
    /// One half-edge per face (INVALID if removed)
    pub face_edge: Vec<usize>,
    pub active_face_count: usize,
    pub positions: Vec<Point3f>,
    normals: Option<Vec<Vector3f>>,
    colors: Option<Vec<[u8; 3]>>,
    pub vertex_removed: Vec<bool>,
}

impl HalfEdgeMesh {
    /// Faces must reference valid vertex indices; callers validate first.
    /// Faces that repeat a vertex are left out, so `active_face_count`
    /// only counts faces that survive compaction.
    pub fn from_triangle_mesh(mesh: &TriangleMesh) -> Self {
        let nv = mesh.vertices.len();
        let nf = mesh.faces.len();

        let mut half_edges = Vec::with_capacity(nf * 3);
        let mut vertex_edge = vec![INVALID; nv];
        let mut face_edge = Vec::with_capacity(nf);

        for face in mesh
            .faces
            .iter()
            .filter(|f| f[0] != f[1] && f[1] != f[2] && f[2] != f[0])
        {
            let fi = face_edge.len();
            let base = half_edges.len();
            for j in 0..3usize {
                half_edges.push(HalfEdge {
                    target: face[(j + 1) % 3],
                    twin: INVALID,
                    next: base + (j + 1) % 3,
                    prev: base + (j + 2) % 3,
                    face: fi,
                });
                if vertex_edge[face[j]] == INVALID {
                    vertex_edge[face[j]] = base + j;
                }
            }
            face_edge.push(base);
        }

        // Pair each half-edge with an unpaired reverse edge. Inconsistent
        // winding or a non-manifold edge leaves the extra copies unpaired.
        let mut open: HashMap<(usize, usize), usize> = HashMap::with_capacity(nf * 3);
        for he in 0..half_edges.len() {
            let from = half_edges[half_edges[he].prev].target;
            let to = half_edges[he].target;
            match open.remove(&(to, from)) {
                Some(twin) => {
                    half_edges[he].twin = twin;
                    half_edges[twin].twin = he;
                }
                None => {
                    open.entry((from, to)).or_insert(he);
                }
            }
        }

        let active_face_count = face_edge.len();
        HalfEdgeMesh {
            half_edges,
            vertex_edge,
            face_edge,
            active_face_count,
            positions: mesh.vertices.clone(),
            normals: mesh.normals.clone(),
            colors: mesh.colors.clone(),
            vertex_removed: vec![false; nv],
        }
    }

    #[inline]
    pub fn source(&self, he: usize) -> usize {
        self.half_edges[self.half_edges[he].prev].target
    }

    #[inline]
    pub fn is_alive(&self, v: usize) -> bool {
        !self.vertex_removed[v] && self.vertex_edge[v] != INVALID
    }

    /// Outgoing half-edges of `v`. The fan is walked counterclockwise; if it
    /// stops at a boundary the remainder is walked clockwise from the start.
    pub fn outgoing_half_edges(&self, v: usize) -> Vec<usize> {
        let start = self.vertex_edge[v];
        if start == INVALID {
            return Vec::new();
        }
        let limit = self.half_edges.len();
        let mut fan = vec![start];

        let mut he = start;
        while let Some(next) = self.rotate_ccw(he) {
            if next == start || fan.len() > limit {
                return fan;
            }
            fan.push(next);
            he = next;
        }

        let mut he = start;
        while let Some(next) = self.rotate_cw(he) {
            if next == start || fan.len() > limit {
                break;
            }
            fan.push(next);
            he = next;
        }
        fan
    }

    #[inline]
    fn rotate_ccw(&self, he: usize) -> Option<usize> {
        let twin = self.half_edges[self.half_edges[he].prev].twin;
        (twin != INVALID).then_some(twin)
    }

    #[inline]
    fn rotate_cw(&self, he: usize) -> Option<usize> {
        let twin = self.half_edges[he].twin;
        (twin != INVALID).then(|| self.half_edges[twin].next)
    }

    pub fn neighbors(&self, v: usize) -> HashSet<usize> {
        let mut result = HashSet::new();
        for he in self.outgoing_half_edges(v) {
            result.insert(self.half_edges[he].target);
            // The vertex across a boundary fan edge is only reachable
            // through the incoming half-edge.
            let prev = self.half_edges[he].prev;
            result.insert(self.source(prev));
        }
        result.remove(&v);
        result
    }

    /// Faces incident to a vertex.
    pub fn vertex_faces(&self, v: usize) -> Vec<usize> {
        self.outgoing_half_edges(v)
            .iter()
            .map(|&he| self.half_edges[he].face)
            .filter(|&f| f != INVALID)
            .collect()
    }

    pub fn face_vertices(&self, f: usize) -> Option<[usize; 3]> {
        let he0 = self.face_edge[f];
        if he0 == INVALID {
            return None;
        }
        let he1 = self.half_edges[he0].next;
        Some([
            self.source(he0),
            self.half_edges[he0].target,
            self.half_edges[he1].target,
        ])
    }

    pub fn is_boundary_vertex(&self, v: usize) -> bool {
        self.outgoing_half_edges(v).iter().any(|&he| {
            let prev = self.half_edges[he].prev;
            self.half_edges[he].twin == INVALID || self.half_edges[prev].twin == INVALID
        })
    }

    pub fn find_half_edge(&self, from: usize, to: usize) -> Option<usize> {
        self.outgoing_half_edges(from)
            .into_iter()
            .find(|&he| self.half_edges[he].target == to)
    }

    /// Half-edge for the undirected edge (a, b), in whichever direction exists.
    pub fn find_edge(&self, a: usize, b: usize) -> Option<usize> {
        self.find_half_edge(a, b).or_else(|| self.find_half_edge(b, a))
    }

    /// Number of live faces a collapse of (v1, v2) removes.
    pub fn faces_removed_by_collapse(&self, v1: usize, v2: usize) -> usize {
        match self.find_edge(v1, v2) {
            Some(he) if self.half_edges[he].twin == INVALID => 1,
            Some(_) => 2,
            None => 0,
        }
    }

    /// Check the link condition: common neighbors must equal exactly the
    /// face apices opposite the edge (2 for interior, 1 for boundary).
    pub fn check_link_condition(&self, v1: usize, v2: usize) -> bool {
        let h = match self.find_edge(v1, v2) {
            Some(h) => h,
            None => return false,
        };
        let n1 = self.neighbors(v1);
        let n2 = self.neighbors(v2);
        let common_count = n1.intersection(&n2).count();

        let is_boundary = self.half_edges[h].twin == INVALID;
        if !is_boundary {
            // Joining two boundary loops through an interior edge pinches the surface.
            if self.is_boundary_vertex(v1) && self.is_boundary_vertex(v2) {
                return false;
            }
            // Collapsing any edge of a tetrahedron folds it flat.
            if n1.len() <= 3 && n2.len() <= 3 {
                return false;
            }
        }
        let expected = if is_boundary { 1 } else { 2 };
        common_count == expected
    }

    /// True when moving v1 and v2 to `new_pos` would invert or degenerate a
    /// surviving face around either vertex.
    pub fn collapse_flips_faces(&self, v1: usize, v2: usize, new_pos: &Point3f) -> bool {
        let mut faces: Vec<usize> = self.vertex_faces(v1);
        faces.extend(self.vertex_faces(v2));
        faces.sort_unstable();
        faces.dedup();

        for f in faces {
            let Some(tri) = self.face_vertices(f) else {
                continue;
            };
            let has_v1 = tri.contains(&v1);
            let has_v2 = tri.contains(&v2);
            if has_v1 && has_v2 {
                // Removed by the collapse
                continue;
            }
            let before = [
                self.positions[tri[0]],
                self.positions[tri[1]],
                self.positions[tri[2]],
            ];
            let mut after = before;
            for (slot, &vi) in tri.iter().enumerate() {
                if vi == v1 || vi == v2 {
                    after[slot] = *new_pos;
                }
            }
            let n_before = (before[1] - before[0]).cross(&(before[2] - before[0]));
            let n_after = (after[1] - after[0]).cross(&(after[2] - after[0]));
            let len_before = n_before.norm();
            let len_after = n_after.norm();
            if len_before <= f32::EPSILON {
                continue;
            }
            if len_after <= f32::EPSILON * len_before || n_before.dot(&n_after) <= 0.0 {
                return true;
            }
        }
        false
    }

    #[inline]
    fn is_live(&self, he: usize) -> bool {
        he != INVALID && self.half_edges[he].face != INVALID
    }

    /// Tombstone the face owning `he` and glue the twins of its other two
    /// sides to each other.
    fn detach_face(&mut self, he: usize) {
        let next = self.half_edges[he].next;
        let prev = self.half_edges[he].prev;
        let across_next = self.half_edges[next].twin;
        let across_prev = self.half_edges[prev].twin;
        if across_next != INVALID {
            self.half_edges[across_next].twin = across_prev;
        }
        if across_prev != INVALID {
            self.half_edges[across_prev].twin = across_next;
        }

        let face = self.half_edges[he].face;
        for e in [he, next, prev] {
            self.half_edges[e].face = INVALID;
        }
        self.face_edge[face] = INVALID;
        self.active_face_count -= 1;
    }

    /// Keep `vertex_edge[v]` on a live face, trying `preferred` first and then
    /// the half-edges that left `v` before the collapse.
    fn repoint_vertex(&mut self, v: usize, preferred: usize, ring: &[usize]) {
        let current = self.vertex_edge[v];
        if current == INVALID || self.is_live(current) {
            return;
        }
        let replacement = std::iter::once(preferred)
            .chain(ring.iter().copied())
            .find(|&he| self.is_live(he))
            .unwrap_or(INVALID);
        self.vertex_edge[v] = replacement;
    }

    /// Merge `v2` into `v1` at `new_pos`, removing the one or two faces on
    /// the edge. Returns false when `v1 -> v2` is not a half-edge.
    pub fn collapse_edge(&mut self, v1: usize, v2: usize, new_pos: Point3f) -> bool {
        let Some(h) = self.find_half_edge(v1, v2) else {
            return false;
        };
        let h_twin = self.half_edges[h].twin;

        // Opposite apex of each removed face with the half-edge that leaves
        // it towards the merged vertex and survives.
        let mut apices = Vec::with_capacity(2);
        let h_next = self.half_edges[h].next;
        apices.push((self.half_edges[h_next].target, self.half_edges[h_next].twin));
        if h_twin != INVALID {
            let t_next = self.half_edges[h_twin].next;
            apices.push((self.half_edges[t_next].target, self.half_edges[t_next].twin));
        }
        let rings: Vec<Vec<usize>> = apices
            .iter()
            .map(|&(apex, _)| self.outgoing_half_edges(apex))
            .collect();

        let v2_outgoing = self.outgoing_half_edges(v2);
        let mut v1_ring = self.outgoing_half_edges(v1);
        v1_ring.extend_from_slice(&v2_outgoing);
        let v1_preferred = self.half_edges[self.half_edges[h].prev].twin;

        self.detach_face(h);
        if h_twin != INVALID {
            self.detach_face(h_twin);
        }

        for &he in &v2_outgoing {
            let prev = self.half_edges[he].prev;
            self.half_edges[prev].target = v1;
            let twin = self.half_edges[he].twin;
            if self.is_live(twin) {
                self.half_edges[twin].target = v1;
            }
        }

        self.repoint_vertex(v1, v1_preferred, &v1_ring);
        for ((apex, preferred), ring) in apices.into_iter().zip(rings) {
            self.repoint_vertex(apex, preferred, &ring);
        }
        self.vertex_edge[v2] = INVALID;
        self.vertex_removed[v2] = true;
        self.positions[v1] = new_pos;

        if let Some(normals) = self.normals.as_mut() {
            if let Some(avg) = (normals[v1] + normals[v2]).try_normalize(f32::EPSILON) {
                normals[v1] = avg;
            }
        }
        if let Some(colors) = self.colors.as_mut() {
            let (a, b) = (colors[v1], colors[v2]);
            colors[v1] = std::array::from_fn(|k| ((a[k] as u16 + b[k] as u16) / 2) as u8);
        }

        true
    }

    /// Renumber live vertices densely and emit the surviving faces. Vertices
    /// that no face references are dropped.
    pub fn to_triangle_mesh(&self) -> TriangleMesh {
        let mut remap = vec![INVALID; self.positions.len()];
        let mut kept = Vec::new();
        for v in (0..self.positions.len()).filter(|&v| self.is_alive(v)) {
            remap[v] = kept.len();
            kept.push(v);
        }

        let faces: Vec<[usize; 3]> = (0..self.face_edge.len())
            .filter_map(|f| self.face_vertices(f))
            .map(|tri| tri.map(|v| remap[v]))
            .filter(|t| !t.contains(&INVALID) && t[0] != t[1] && t[1] != t[2] && t[2] != t[0])
            .collect();

        let mut mesh =
            TriangleMesh::from_vertices_and_faces(kept.iter().map(|&v| self.positions[v]).collect(), faces);
        if let Some(normals) = &self.normals {
            mesh.set_normals(kept.iter().map(|&v| normals[v]).collect());
        }
        if let Some(colors) = &self.colors {
            mesh.set_colors(kept.iter().map(|&v| colors[v]).collect());
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_meshes::*;

    #[test]
    fn test_halfedge_construction() {
        let mesh = make_tetrahedron();
        let hem = HalfEdgeMesh::from_triangle_mesh(&mesh);
        assert_eq!(hem.half_edges.len(), 12);
        assert_eq!(hem.active_face_count, 4);

        for he in &hem.half_edges {
            assert_ne!(he.twin, INVALID, "closed mesh half-edge should have twin");
        }
    }

    #[test]
    fn test_halfedge_boundary() {
        let mesh = make_single_triangle();
        let hem = HalfEdgeMesh::from_triangle_mesh(&mesh);
        for he in &hem.half_edges {
            assert_eq!(he.twin, INVALID);
        }
        for v in 0..3 {
            assert!(hem.is_boundary_vertex(v));
        }
        assert_eq!(hem.faces_removed_by_collapse(0, 1), 1);
        assert_eq!(hem.faces_removed_by_collapse(1, 0), 1);
    }

    #[test]
    fn test_grid_boundary_classification() {
        let mesh = make_plane_grid(4);
        let hem = HalfEdgeMesh::from_triangle_mesh(&mesh);
        // Corner and edge vertices lie on the boundary, the inner 2x2 does not
        assert!(hem.is_boundary_vertex(0));
        assert!(hem.is_boundary_vertex(1));
        assert!(!hem.is_boundary_vertex(5));
        assert!(!hem.is_boundary_vertex(10));
        assert_eq!(hem.faces_removed_by_collapse(0, 1), 1);
        assert_eq!(hem.faces_removed_by_collapse(5, 6), 2);
    }

    #[test]
    fn test_neighbors() {
        let hem = HalfEdgeMesh::from_triangle_mesh(&make_tetrahedron());
        for v in 0..4 {
            assert_eq!(hem.neighbors(v).len(), 3);
        }

        let hem = HalfEdgeMesh::from_triangle_mesh(&make_plane_grid(4));
        // Interior vertex of the diagonal grid has valence 6
        assert_eq!(hem.neighbors(5).len(), 6);
        // Corner 0 touches 1 and 4
        assert_eq!(hem.neighbors(0).len(), 2);
    }

    #[test]
    fn test_link_condition() {
        // Tetrahedron collapses would fold the solid flat
        let hem = HalfEdgeMesh::from_triangle_mesh(&make_tetrahedron());
        assert!(!hem.check_link_condition(0, 1));

        let hem = HalfEdgeMesh::from_triangle_mesh(&make_plane_grid(5));
        // Interior edge between two interior vertices
        assert!(hem.check_link_condition(6, 7));
        // Interior edge joining two boundary vertices would pinch
        assert!(!hem.check_link_condition(1, 5));
    }

    #[test]
    fn test_collapse_interior_edge() {
        let mesh = make_plane_grid(5);
        let mut hem = HalfEdgeMesh::from_triangle_mesh(&mesh);
        let before = hem.active_face_count;
        let mid = Point3f::from((hem.positions[6].coords + hem.positions[7].coords) * 0.5);

        assert!(!hem.collapse_flips_faces(6, 7, &mid));
        assert!(hem.collapse_edge(6, 7, mid));
        assert_eq!(hem.active_face_count, before - 2);
        assert!(hem.vertex_removed[7]);
        assert_eq!(hem.positions[6], mid);

        let out = hem.to_triangle_mesh();
        assert_eq!(out.face_count(), before - 2);
        assert_eq!(out.vertex_count(), mesh.vertex_count() - 1);
        assert!(out.validate().is_ok());
    }

    #[test]
    fn test_collapse_detects_flip() {
        let mesh = make_plane_grid(5);
        let hem = HalfEdgeMesh::from_triangle_mesh(&mesh);
        // Dragging the merged vertex far past its ring inverts faces
        let far = Point3f::new(10.0, 1.0, 0.0);
        assert!(hem.collapse_flips_faces(6, 7, &far));
    }

    #[test]
    fn test_collapse_boundary_edge() {
        let mesh = make_plane_grid(4);
        let mut hem = HalfEdgeMesh::from_triangle_mesh(&mesh);
        assert!(hem.check_link_condition(1, 2));
        assert_eq!(hem.faces_removed_by_collapse(1, 2), 1);

        let (a, b) = if hem.find_half_edge(1, 2).is_some() { (1, 2) } else { (2, 1) };
        let pos = hem.positions[a];
        assert!(hem.collapse_edge(a, b, pos));
        assert_eq!(hem.active_face_count, mesh.face_count() - 1);
        assert!(hem.to_triangle_mesh().validate().is_ok());
    }

    #[test]
    fn test_attributes_follow_collapse() {
        let mut mesh = make_plane_grid(5);
        let n = mesh.vertex_count();
        mesh.set_normals(vec![Vector3f::z(); n]);
        mesh.set_colors((0..n).map(|i| [i as u8, 0, 255]).collect());

        let mut hem = HalfEdgeMesh::from_triangle_mesh(&mesh);
        let mid = Point3f::from((hem.positions[6].coords + hem.positions[7].coords) * 0.5);
        assert!(hem.collapse_edge(6, 7, mid));
        let out = hem.to_triangle_mesh();
        assert_eq!(out.normals.as_ref().unwrap().len(), out.vertex_count());
        assert_eq!(out.colors.as_ref().unwrap().len(), out.vertex_count());
        // vertex 6 keeps its slot and blends 6 and 7
        assert_eq!(out.colors.as_ref().unwrap()[6], [6, 0, 255]);
    }

    #[test]
    fn test_repeated_corner_faces_are_skipped() {
        let mut mesh = make_plane_grid(4);
        mesh.add_face([5, 5, 6]);
        mesh.add_face([9, 10, 9]);
        let hem = HalfEdgeMesh::from_triangle_mesh(&mesh);
        assert_eq!(hem.active_face_count, 18);
        assert_eq!(hem.half_edges.len(), 18 * 3);
        assert_eq!(hem.to_triangle_mesh().face_count(), hem.active_face_count);
    }

    #[test]
    fn test_face_count_tracks_output_through_collapses() {
        let mut mesh = make_plane_grid(6);
        mesh.add_face([14, 14, 15]);
        let mut hem = HalfEdgeMesh::from_triangle_mesh(&mesh);
        for (a, b) in [(7, 8), (14, 15), (21, 22)] {
            let (keep, drop) = if hem.find_half_edge(a, b).is_some() { (a, b) } else { (b, a) };
            if hem.is_alive(keep) && hem.is_alive(drop) && hem.check_link_condition(keep, drop) {
                let pos = hem.positions[keep];
                assert!(hem.collapse_edge(keep, drop, pos));
            }
        }
        let out = hem.to_triangle_mesh();
        assert_eq!(out.face_count(), hem.active_face_count);
        assert!(out.validate().is_ok());
    }
}
