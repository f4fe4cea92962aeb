use std::path::Path;

use glam::{Mat4, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::config::{JitterMode, PlacementConfig};
use super::instance::{instance_transform, InstanceRaw};
use crate::constants::placement::JITTER_FRACTION;
use crate::error::TerrainResult;
use crate::heightfield::HeightSampler;
use crate::transform::TerrainTransform;

/// One accepted sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedObject {
    /// Domain coordinate the height was sampled at
    pub uv: Vec2,
    /// World position; y is the scaled elevation at `uv`
    pub position: Vec3,
}

/// Accepted objects in sampling order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlacementResult {
    objects: Vec<PlacedObject>,
    samples_taken: usize,
    cap_reached: bool,
}

impl PlacementResult {
    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.objects.iter().map(|object| object.position)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of height queries issued, accepted or not
    pub fn samples_taken(&self) -> usize {
        self.samples_taken
    }

    /// Whether generation stopped early because the cap was hit
    pub fn cap_reached(&self) -> bool {
        self.cap_reached
    }

    /// translate(position) * scale(object_scale) per object
    pub fn instance_transforms(&self, object_scale: f32) -> Vec<Mat4> {
        self.positions()
            .map(|position| instance_transform(position, object_scale))
            .collect()
    }

    /// Instance data ready for a vertex buffer
    pub fn instance_data(&self, object_scale: f32) -> Vec<InstanceRaw> {
        self.positions()
            .map(|position| InstanceRaw::from_transform(instance_transform(position, object_scale)))
            .collect()
    }

    /// Write the objects as a pretty-printed JSON array. An empty result
    /// still produces `[]`.
    pub fn write_json(&self, path: impl AsRef<Path>) -> TerrainResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.objects)?;
        std::fs::write(path, json)?;
        log::info!(
            "[PlacementResult::write_json] Wrote {} placements to {:?}",
            self.objects.len(),
            path
        );
        Ok(())
    }
}

/// Jittered-grid sampler that places objects on the terrain surface
pub struct PlacementEngine {
    config: PlacementConfig,
    transform: TerrainTransform,
}

impl PlacementEngine {
    pub fn new(config: PlacementConfig, transform: TerrainTransform) -> TerrainResult<Self> {
        config.validate()?;
        Ok(Self { config, transform })
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn transform(&self) -> &TerrainTransform {
        &self.transform
    }

    /// Run placement with the configured seed (or entropy)
    pub fn generate_seeded<S: HeightSampler + ?Sized>(
        &self,
        sampler: &S,
    ) -> TerrainResult<PlacementResult> {
        let mut rng = self.create_rng();
        self.generate(sampler, &mut rng)
    }

    /// Scan the G x G grid row-major (gx outer, gz inner), query one
    /// jittered sample per cell and keep the ones inside the height band.
    ///
    /// Stops the moment `max_objects` samples have been accepted, so later
    /// rows may be left unsampled. The only error is the sampler's own.
    pub fn generate<S, R>(&self, sampler: &S, rng: &mut R) -> TerrainResult<PlacementResult>
    where
        S: HeightSampler + ?Sized,
        R: Rng,
    {
        let (min, max) = self.transform.bounds();
        log::info!(
            "[PlacementEngine::generate] Terrain bounds: X = [{}, {}], Z = [{}, {}]",
            min.x,
            max.x,
            min.y,
            max.y
        );

        let mut result = PlacementResult::default();
        if self.config.max_objects == 0 {
            log::info!("[PlacementEngine::generate] max_objects is 0, nothing to place");
            return Ok(result);
        }

        let band = self.config.min_height..=self.config.max_height;
        let resolution = self.config.grid_resolution;

        'scan: for gx in 0..resolution {
            for gz in 0..resolution {
                let (u, v) = self.jittered_sample(gx, gz, rng);
                let height = sampler.sample_height(u, v)?;
                result.samples_taken += 1;
                log::trace!(
                    "[PlacementEngine::generate] Sampled height at ({}, {}): {}",
                    u,
                    v,
                    height
                );

                if !band.contains(&height) {
                    continue;
                }

                result.objects.push(PlacedObject {
                    uv: Vec2::new(u, v),
                    position: self.transform.uv_to_world(u, v, height),
                });

                if result.objects.len() >= self.config.max_objects {
                    result.cap_reached = true;
                    log::info!(
                        "[PlacementEngine::generate] Reached maximum object limit: {}",
                        self.config.max_objects
                    );
                    break 'scan;
                }
            }
        }

        log::info!(
            "[PlacementEngine::generate] Generated {} objects from {} samples",
            result.objects.len(),
            result.samples_taken
        );
        Ok(result)
    }

    /// Region a cell's jittered sample can land in, as (min, max) in (u, v).
    /// The upper bound is exclusive.
    pub fn sample_bounds(&self, gx: u32, gz: u32) -> (Vec2, Vec2) {
        let cell = self.cell_size();
        let span = JITTER_FRACTION * cell;
        let base = Vec2::new(gx as f32, gz as f32) * cell;
        match self.config.jitter {
            JitterMode::Quadrant => (base, base + Vec2::splat(span)),
            JitterMode::Centered => {
                let center = base + Vec2::splat(cell * 0.5);
                (center - Vec2::splat(span * 0.5), center + Vec2::splat(span * 0.5))
            }
        }
    }

    fn cell_size(&self) -> f32 {
        1.0 / self.config.grid_resolution as f32
    }

    fn jittered_sample<R: Rng>(&self, gx: u32, gz: u32, rng: &mut R) -> (f32, f32) {
        let (lo, hi) = self.sample_bounds(gx, gz);
        let u = jitter_axis(lo.x, hi.x, rng);
        let v = jitter_axis(lo.y, hi.y, rng);
        (u, v)
    }

    fn create_rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Uniform value in [lo, hi). Falls back to `lo` when rounding makes the
/// span collapse or pushes the product onto `hi`.
fn jitter_axis<R: Rng>(lo: f32, hi: f32, rng: &mut R) -> f32 {
    let value = lo + rng.gen::<f32>() * (hi - lo);
    if value < hi {
        value
    } else {
        lo
    }
}
