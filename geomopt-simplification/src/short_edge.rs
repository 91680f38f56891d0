//! Short edge decimation
//!
//! [`ShortEdgeOp`] removes edges whose length is below a fraction of the
//! model's smallest bounding-box dimension, shortest first, until the
//! continuation policy, the step limit or the primitive floor stops it.
//! Afterwards it optionally recomputes smooth vertex normals and re-strips
//! the triangles.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use priority_queue::PriorityQueue;
use tracing::{debug, info, warn};

use geomopt_core::{Bounded, Point3f, Result, TriangleMesh};

use crate::config::ShortEdgeConfig;
use crate::half_edge::HalfEdgeMesh;
use crate::operation::{CopyOp, GeometryOperation};
use crate::smoothing::smooth_normals;
use crate::stats::{DecimationStats, StopReason};
use crate::tristrip::build_strips;

/// Application control mechanism to continue or halt decimation.
///
/// The provided method defers to the decimator's built-in rule, so an
/// implementation only overrides what it needs. Closures with the matching
/// signature are callbacks too.
pub trait ContinueDecimationCallback: Send + Sync {
    /// Returns true if the mesh is to continue being decimated, false to stop.
    fn continue_decimation(
        &self,
        decimator: &ShortEdgeOp,
        next_error: f32,
        num_original_primitives: usize,
        num_remaining_primitives: usize,
    ) -> bool {
        decimator.continue_decimation_implementation(
            next_error,
            num_original_primitives,
            num_remaining_primitives,
        )
    }

    /// Independent copy used by [`CopyOp::Deep`]. `None` shares the callback.
    fn duplicate(&self) -> Option<Arc<dyn ContinueDecimationCallback>> {
        None
    }
}

impl<F> ContinueDecimationCallback for F
where
    F: Fn(&ShortEdgeOp, f32, usize, usize) -> bool + Send + Sync,
{
    fn continue_decimation(
        &self,
        decimator: &ShortEdgeOp,
        next_error: f32,
        num_original_primitives: usize,
        num_remaining_primitives: usize,
    ) -> bool {
        self(
            decimator,
            next_error,
            num_original_primitives,
            num_remaining_primitives,
        )
    }
}

/// Queue priority: shorter edges pop first.
#[derive(Debug, Clone, Copy)]
struct EdgeLength(f32);

impl PartialEq for EdgeLength {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}
impl Eq for EdgeLength {}

impl PartialOrd for EdgeLength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EdgeLength {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.total_cmp(&self.0)
    }
}

type EdgeQueue = PriorityQueue<(usize, usize), EdgeLength>;

#[inline]
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// A geometry reduction tool that removes edges shorter than a maximum
/// feature length, expressed as a fraction of the smallest model
/// bounding-box dimension.
#[derive(Clone)]
pub struct ShortEdgeOp {
    sample_ratio: f32,
    max_feature: f32,
    maximum_error: f32,
    tri_strip: bool,
    smoothing: bool,
    ignore_boundaries: bool,
    min_prim: usize,
    max_steps: usize,
    continue_decimation_callback: Option<Arc<dyn ContinueDecimationCallback>>,
}

impl Default for ShortEdgeOp {
    fn default() -> Self {
        Self::with_params(1.0, f32::MAX, 0.1, usize::MAX)
    }
}

impl fmt::Debug for ShortEdgeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortEdgeOp")
            .field("sample_ratio", &self.sample_ratio)
            .field("max_feature", &self.max_feature)
            .field("maximum_error", &self.maximum_error)
            .field("tri_strip", &self.tri_strip)
            .field("smoothing", &self.smoothing)
            .field("ignore_boundaries", &self.ignore_boundaries)
            .field("min_prim", &self.min_prim)
            .field("max_steps", &self.max_steps)
            .field(
                "continue_decimation_callback",
                &self.continue_decimation_callback.is_some(),
            )
            .finish()
    }
}

impl ShortEdgeOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(
        sample_ratio: f32,
        maximum_error: f32,
        max_feature: f32,
        max_steps: usize,
    ) -> Self {
        Self {
            sample_ratio,
            max_feature,
            maximum_error,
            tri_strip: true,
            smoothing: true,
            ignore_boundaries: false,
            min_prim: 1,
            max_steps,
            continue_decimation_callback: None,
        }
    }

    pub fn from_config(config: &ShortEdgeConfig) -> Self {
        let mut op = Self::with_params(
            config.sample_ratio,
            config.maximum_error,
            config.max_feature,
            config.max_steps,
        );
        op.tri_strip = config.tri_strip;
        op.smoothing = config.smoothing;
        op.ignore_boundaries = config.ignore_boundaries;
        op.min_prim = config.min_primitives;
        op
    }

    /// Scalar and boolean settings as a serializable config.
    pub fn config(&self) -> ShortEdgeConfig {
        ShortEdgeConfig {
            sample_ratio: self.sample_ratio,
            maximum_error: self.maximum_error,
            max_feature: self.max_feature,
            max_steps: self.max_steps,
            min_primitives: self.min_prim,
            tri_strip: self.tri_strip,
            smoothing: self.smoothing,
            ignore_boundaries: self.ignore_boundaries,
        }
    }

    /// Copy this operation. Shallow copies share the callback; deep copies
    /// use [`ContinueDecimationCallback::duplicate`] when it returns one.
    pub fn copy_with(&self, copy_op: CopyOp) -> Self {
        let mut copy = self.clone();
        if copy_op == CopyOp::Deep {
            copy.continue_decimation_callback = self
                .continue_decimation_callback
                .as_ref()
                .map(|cb| cb.duplicate().unwrap_or_else(|| Arc::clone(cb)));
        }
        copy
    }

    pub fn set_sample_ratio(&mut self, sample_ratio: f32) {
        self.sample_ratio = sample_ratio;
    }
    pub fn sample_ratio(&self) -> f32 {
        self.sample_ratio
    }

    pub fn set_max_feature(&mut self, max_feature: f32) {
        self.max_feature = max_feature;
    }
    pub fn max_feature(&self) -> f32 {
        self.max_feature
    }

    pub fn set_maximum_error(&mut self, error: f32) {
        self.maximum_error = error;
    }
    pub fn maximum_error(&self) -> f32 {
        self.maximum_error
    }

    pub fn set_tri_strip(&mut self, on: bool) {
        self.tri_strip = on;
    }
    pub fn tri_strip(&self) -> bool {
        self.tri_strip
    }

    pub fn set_smoothing(&mut self, on: bool) {
        self.smoothing = on;
    }
    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    pub fn set_ignore_boundaries(&mut self, setting: bool) {
        self.ignore_boundaries = setting;
    }
    pub fn ignore_boundaries(&self) -> bool {
        self.ignore_boundaries
    }

    pub fn set_min_primitives(&mut self, min_prim: usize) {
        self.min_prim = min_prim;
    }
    pub fn min_primitives(&self) -> usize {
        self.min_prim
    }

    pub fn set_max_steps(&mut self, max_steps: usize) {
        self.max_steps = max_steps;
    }
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn set_continue_decimation_callback(
        &mut self,
        cb: Option<Arc<dyn ContinueDecimationCallback>>,
    ) {
        self.continue_decimation_callback = cb;
    }

    /// Install a closure as the continuation callback.
    pub fn set_continue_decimation_fn<F>(&mut self, f: F)
    where
        F: Fn(&ShortEdgeOp, f32, usize, usize) -> bool + Send + Sync + 'static,
    {
        self.continue_decimation_callback = Some(Arc::new(f));
    }

    pub fn continue_decimation_callback(&self) -> Option<&Arc<dyn ContinueDecimationCallback>> {
        self.continue_decimation_callback.as_ref()
    }

    pub fn with_sample_ratio(mut self, sample_ratio: f32) -> Self {
        self.sample_ratio = sample_ratio;
        self
    }

    pub fn with_max_feature(mut self, max_feature: f32) -> Self {
        self.max_feature = max_feature;
        self
    }

    pub fn with_maximum_error(mut self, error: f32) -> Self {
        self.maximum_error = error;
        self
    }

    pub fn with_tri_strip(mut self, on: bool) -> Self {
        self.tri_strip = on;
        self
    }

    pub fn with_smoothing(mut self, on: bool) -> Self {
        self.smoothing = on;
        self
    }

    pub fn with_ignore_boundaries(mut self, setting: bool) -> Self {
        self.ignore_boundaries = setting;
        self
    }

    pub fn with_min_primitives(mut self, min_prim: usize) -> Self {
        self.min_prim = min_prim;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_continue_decimation_callback(
        mut self,
        cb: Arc<dyn ContinueDecimationCallback>,
    ) -> Self {
        self.continue_decimation_callback = Some(cb);
        self
    }

    /// Decide whether to take the next step. A registered callback decides
    /// alone; otherwise the built-in rule applies.
    pub fn continue_decimation(
        &self,
        next_error: f32,
        num_original_primitives: usize,
        num_remaining_primitives: usize,
    ) -> bool {
        match self.continue_decimation_callback {
            Some(ref cb) => cb.continue_decimation(
                self,
                next_error,
                num_original_primitives,
                num_remaining_primitives,
            ),
            None => self.continue_decimation_implementation(
                next_error,
                num_original_primitives,
                num_remaining_primitives,
            ),
        }
    }

    /// Built-in rule: keep going while more than `sample_ratio` of the
    /// original primitives remain and the next error is within the ceiling.
    pub fn continue_decimation_implementation(
        &self,
        next_error: f32,
        num_original_primitives: usize,
        num_remaining_primitives: usize,
    ) -> bool {
        (num_remaining_primitives as f32) > (num_original_primitives as f32) * self.sample_ratio
            && next_error <= self.maximum_error
    }

    /// Longest edge length eligible for removal on `mesh`, or `None` when the
    /// mesh has no measurable extent.
    pub fn feature_length(&self, mesh: &TriangleMesh) -> Option<f32> {
        mesh.min_extent().map(|extent| extent * self.max_feature)
    }

    /// Remove short edges from `mesh` in place.
    ///
    /// Faces referencing missing vertices are rejected before anything is
    /// modified. Once any edge is collapsed the mesh is compacted, which also
    /// drops vertices no face references.
    pub fn decimate(&self, mesh: &mut TriangleMesh) -> Result<DecimationStats> {
        mesh.validate()?;

        let original = mesh.primitive_count();
        let mut stats = DecimationStats::new(original);
        if mesh.is_empty() {
            debug!("Empty mesh, skipping decimation");
            return Ok(stats);
        }

        let Some(threshold) = self.feature_length(mesh) else {
            warn!(
                vertices = mesh.vertex_count(),
                "Mesh bounding box has no extent, skipping decimation"
            );
            self.post_process(mesh);
            return Ok(stats);
        };
        stats.feature_length = threshold;

        info!(
            original = original,
            feature_length = threshold,
            sample_ratio = self.sample_ratio,
            "Starting short edge decimation"
        );

        let mut hem = HalfEdgeMesh::from_triangle_mesh(mesh);
        let mut queue = self.build_queue(&hem, threshold);
        let mut stale = 0usize;

        stats.stop_reason = loop {
            if stats.steps >= self.max_steps {
                break StopReason::MaxSteps;
            }
            let remaining = hem.active_face_count;
            if remaining <= self.min_prim {
                break StopReason::MinPrimitives;
            }
            let Some(((a, b), EdgeLength(queued))) = queue.pop() else {
                break StopReason::NoCandidates;
            };

            if !hem.is_alive(a) || !hem.is_alive(b) || hem.find_edge(a, b).is_none() {
                stale += 1;
                continue;
            }
            let length = (hem.positions[a] - hem.positions[b]).norm();
            if !self.is_candidate(&hem, a, b, length, threshold) {
                stale += 1;
                continue;
            }
            if length.total_cmp(&queued) != Ordering::Equal {
                queue.push((a, b), EdgeLength(length));
                stale += 1;
                continue;
            }

            stats.steps += 1;
            stats.last_error = Some(length);
            if !self.continue_decimation(length, original, remaining) {
                break StopReason::PolicyHalted;
            }

            if remaining.saturating_sub(hem.faces_removed_by_collapse(a, b)) < self.min_prim
                || !hem.check_link_condition(a, b)
            {
                stats.collapses_rejected += 1;
                continue;
            }

            let (keep, drop) = if hem.find_half_edge(a, b).is_some() {
                (a, b)
            } else {
                (b, a)
            };
            let position = self.collapse_position(&hem, keep, drop);
            if hem.collapse_flips_faces(keep, drop, &position)
                || !hem.collapse_edge(keep, drop, position)
            {
                stats.collapses_rejected += 1;
                continue;
            }

            stats.collapses_performed += 1;
            self.requeue_around(&hem, &mut queue, keep, threshold);
        };

        debug!(
            stale = stale,
            rejected = stats.collapses_rejected,
            "Short edge candidate summary"
        );

        if stats.collapses_performed > 0 {
            *mesh = hem.to_triangle_mesh();
        }
        stats.final_primitives = mesh.primitive_count();

        info!(
            original = original,
            final_primitives = stats.final_primitives,
            steps = stats.steps,
            collapses = stats.collapses_performed,
            reason = %stats.stop_reason,
            "Short edge decimation complete"
        );

        self.post_process(mesh);
        Ok(stats)
    }

    fn post_process(&self, mesh: &mut TriangleMesh) {
        if self.smoothing {
            smooth_normals(mesh);
            debug!(vertices = mesh.vertex_count(), "Recomputed smooth normals");
        }
        if self.tri_strip {
            let strips = build_strips(&mesh.faces);
            debug!(
                strips = strips.len(),
                faces = mesh.face_count(),
                "Rebuilt triangle strips"
            );
            mesh.strips = Some(strips);
        } else {
            mesh.strips = None;
        }
    }

    fn touches_boundary(hem: &HalfEdgeMesh, a: usize, b: usize) -> bool {
        hem.is_boundary_vertex(a) || hem.is_boundary_vertex(b)
    }

    fn is_candidate(
        &self,
        hem: &HalfEdgeMesh,
        a: usize,
        b: usize,
        length: f32,
        threshold: f32,
    ) -> bool {
        length <= threshold && (self.ignore_boundaries || !Self::touches_boundary(hem, a, b))
    }

    /// Midpoint, or the boundary endpoint when only one end is on the boundary.
    fn collapse_position(&self, hem: &HalfEdgeMesh, keep: usize, drop: usize) -> Point3f {
        let keep_boundary = hem.is_boundary_vertex(keep);
        let drop_boundary = hem.is_boundary_vertex(drop);
        match (keep_boundary, drop_boundary) {
            (true, false) => hem.positions[keep],
            (false, true) => hem.positions[drop],
            _ => Point3f::from((hem.positions[keep].coords + hem.positions[drop].coords) * 0.5),
        }
    }

    fn build_queue(&self, hem: &HalfEdgeMesh, threshold: f32) -> EdgeQueue {
        let mut queue = PriorityQueue::new();
        for v in 0..hem.positions.len() {
            if !hem.is_alive(v) {
                continue;
            }
            for n in hem.neighbors(v) {
                if n < v {
                    continue;
                }
                let length = (hem.positions[v] - hem.positions[n]).norm();
                if self.is_candidate(hem, v, n, length, threshold) {
                    queue.push(edge_key(v, n), EdgeLength(length));
                }
            }
        }
        queue
    }

    fn requeue_around(&self, hem: &HalfEdgeMesh, queue: &mut EdgeQueue, v: usize, threshold: f32) {
        for n in hem.neighbors(v) {
            let key = edge_key(v, n);
            let length = (hem.positions[v] - hem.positions[n]).norm();
            if self.is_candidate(hem, v, n, length, threshold) {
                queue.push(key, EdgeLength(length));
            } else {
                queue.remove(&key);
            }
        }
    }
}

impl GeometryOperation for ShortEdgeOp {
    fn apply<'a>(&self, mesh: &'a mut TriangleMesh) -> Result<&'a mut TriangleMesh> {
        self.decimate(mesh)?;
        Ok(mesh)
    }

    fn clone_operation(&self) -> Box<dyn GeometryOperation> {
        Box::new(self.copy_with(CopyOp::Shallow))
    }

    fn class_name(&self) -> &'static str {
        "ShortEdgeOp"
    }
}
