//! Pair matching with caching and scoring.

use std::sync::Arc;

use crate::assignment::assigner_for;
use crate::config::CorrespondenceConfig;
use crate::core::{Assignment, CancelToken, PairKey};
use crate::error::{Error, Result};
use crate::filter::ProductManifoldFilter;
use crate::functional_map::{FunctionalMapSolver, ZoomoutRefiner, soft_correspondence};
use crate::mesh::{MeshMetric, MeshSource};
use crate::store::AssignmentStore;

use super::alignment::{AlignmentViewer, matched_rotation};
use super::distortion::geodesic_distortion;

/// Result of matching one pair.
#[derive(Clone, Debug)]
pub struct MatchOutcome {
    /// Mesh used as source (never the larger one)
    pub source: String,
    /// Mesh used as destination
    pub destination: String,
    /// Source to destination vertex matches
    pub assignment: Assignment,
    /// Geodesic distortion of the assignment
    pub distortion: f64,
    /// Whether the assignment came from the store
    pub from_cache: bool,
}

impl MatchOutcome {
    /// Canonical key of the matched pair.
    pub fn key(&self) -> PairKey {
        PairKey::new(self.source.clone(), self.destination.clone())
    }
}

/// Full pipeline for one ordered pair of meshes.
///
/// Solve, zoomout, soft correspondence, then the product manifold filter
/// driving the configured assigner. `src` should be the smaller mesh.
pub fn compute_correspondence(
    src: &dyn MeshMetric,
    dst: &dyn MeshMetric,
    config: &CorrespondenceConfig,
    cancel: &CancelToken,
) -> Result<Assignment> {
    let map = FunctionalMapSolver::from_config(config).solve(src, dst)?;
    log::debug!(
        "Initial map {}x{} (reflected: {}, residual: {:.4e})",
        map.dimension(),
        map.dimension(),
        map.reflected,
        map.residual
    );

    let refined = ZoomoutRefiner::from_config(&config.zoomout)
        .with_cancel_token(cancel.clone())
        .refine(src, dst, &map.c)?;

    let affinity = soft_correspondence(
        src,
        dst,
        &refined.map,
        config.soft_correspondence.kernel_width,
    )?;

    let assigner = assigner_for(&config.product_manifold_filter, dst)?;
    let outcome = ProductManifoldFilter::new(config.product_manifold_filter.clone())
        .with_cancel_token(cancel.clone())
        .run(assigner.as_ref(), src.geodesics(), dst.geodesics(), &affinity)?;

    log::debug!(
        "Filter ({}) finished after {} iterations, converged: {}, {} matches",
        assigner.name(),
        outcome.iterations,
        outcome.converged,
        outcome.assignment.len()
    );
    Ok(outcome.assignment)
}

/// Matches mesh pairs by name.
///
/// Loads both meshes, orders them so the smaller is the source, reuses a
/// stored assignment when one fits, otherwise runs
/// [`compute_correspondence`] and stores the result. Every pair is scored
/// by [`geodesic_distortion`].
///
/// Without a store nothing is cached. Lookup, compute and save are not
/// atomic: two workers matching the same pair may both compute and both
/// write, and the last write wins.
pub struct Matcher {
    meshes: Arc<dyn MeshSource>,
    config: CorrespondenceConfig,
    store: Option<Arc<dyn AssignmentStore>>,
    viewer: Option<Arc<dyn AlignmentViewer>>,
    cancel: CancelToken,
}

impl Matcher {
    /// Create a matcher; the config is validated here.
    pub fn new(meshes: Arc<dyn MeshSource>, config: CorrespondenceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            meshes,
            config,
            store: None,
            viewer: None,
            cancel: CancelToken::new(),
        })
    }

    /// Cache assignments in `store`.
    pub fn with_store(mut self, store: Arc<dyn AssignmentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Show every match with `viewer`.
    pub fn with_viewer(mut self, viewer: Arc<dyn AlignmentViewer>) -> Self {
        self.viewer = Some(viewer);
        self
    }

    /// Use an external cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token cancelling in-flight and future matches.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Active configuration.
    pub fn config(&self) -> &CorrespondenceConfig {
        &self.config
    }

    /// Match meshes `a` and `b`.
    ///
    /// Errors carry the pair they occurred on.
    pub fn match_pair(&self, a: &str, b: &str) -> Result<MatchOutcome> {
        let requested = PairKey::new(a, b);
        self.cancel.check().map_err(|e| e.for_pair(&requested))?;

        let mesh_a = self.meshes.load(a).map_err(|e| Error::from(e).for_pair(&requested))?;
        let mesh_b = self.meshes.load(b).map_err(|e| Error::from(e).for_pair(&requested))?;

        let key = PairKey::canonical(a, mesh_a.num_vertices(), b, mesh_b.num_vertices());
        let (src, dst) = if mesh_b.num_vertices() < mesh_a.num_vertices() {
            (mesh_b, mesh_a)
        } else {
            (mesh_a, mesh_b)
        };

        self.match_loaded(&key, src.as_ref(), dst.as_ref())
            .map_err(|e| e.for_pair(&key))
    }

    fn match_loaded(
        &self,
        key: &PairKey,
        src: &dyn MeshMetric,
        dst: &dyn MeshMetric,
    ) -> Result<MatchOutcome> {
        let cached = self.lookup(key, src.num_vertices(), dst.num_vertices());
        let from_cache = cached.is_some();
        let assignment = match cached {
            Some(assignment) => assignment,
            None => compute_correspondence(src, dst, &self.config, &self.cancel)?,
        };

        let distortion = geodesic_distortion(src.geodesics(), dst.geodesics(), &assignment)?;
        log::info!(
            "{} -> {}: geodesic distortion = {:.3}",
            key.source,
            key.destination,
            distortion
        );

        if let Some(viewer) = &self.viewer
            && let Some(rotation) = matched_rotation(src, dst, &assignment)
        {
            viewer.show(src, dst, &assignment, &rotation);
        }

        if !from_cache
            && let Some(store) = &self.store
            && let Err(e) = store.save(key, &assignment)
        {
            log::warn!("Failed to cache {}: {}", key, e);
        }

        Ok(MatchOutcome {
            source: key.source.clone(),
            destination: key.destination.clone(),
            assignment,
            distortion,
            from_cache,
        })
    }

    /// Stored assignment for `key` that fits both meshes.
    ///
    /// Equal-size pairs are unordered, so the reversed key is tried too.
    /// Unreadable or ill-fitting entries are misses.
    fn lookup(&self, key: &PairKey, src_vertices: usize, dst_vertices: usize) -> Option<Assignment> {
        let store = self.store.as_ref()?;

        let mut candidates = vec![(key.clone(), false)];
        if src_vertices == dst_vertices && key.source != key.destination {
            candidates.push((key.reversed(), true));
        }

        for (candidate, swap) in candidates {
            match store.load(&candidate) {
                Ok(Some(stored)) => {
                    let assignment = if swap { stored.swapped() } else { stored };
                    if !assignment.is_empty() && assignment.fits(src_vertices, dst_vertices) {
                        log::debug!("Cache hit for {}", candidate);
                        return Some(assignment);
                    }
                    log::warn!(
                        "Ignoring cached {}: indices do not fit {}x{} vertices",
                        candidate,
                        src_vertices,
                        dst_vertices
                    );
                }
                Ok(None) => {}
                Err(e) => log::warn!("Ignoring cached {}: {}", candidate, e),
            }
        }
        None
    }
}
