//! The merge driver: load, index, merge, filter, emit.
//!
//! # Phases
//!
//! 1. **Aggregate** - move every input point into one arena, grouping the
//!    valid measures of worthy points by image
//! 2. **Index** - build one k-d tree per image
//! 3. **Merge** - for each worthy point in arena order, gather nearby points
//!    on shared images and let the merger fold in the ones that match
//! 4. **Filter** - rename duplicate IDs, prune, apply the minimum-measure rule
//! 5. **Emit** - assemble the output network and the merge log
//!
//! Phases run strictly in order on a single thread. Only phase 1 and the
//! output step of [`run`] touch the filesystem.

mod stats;


use std::path::PathBuf;
use std::time::Instant;

use hashbrown::HashSet;

pub use stats::CombineStats;

use crate::aggregate::{Aggregate, PointId};
use crate::config::{CombineConfig, RunConfig};
use crate::control::ControlNet;
use crate::emit::{filter_points, output_network};
use crate::error::{Error, Result};
use crate::io;
use crate::merge_log::{MergeLog, MergeRecord};
use crate::merger::{PointMerger, Verdict};
use crate::spatial::{ImageIndex, IndexedMeasure};

/// Everything a run produces.
#[derive(Debug)]
pub struct CombineResult {
    pub network: ControlNet,
    pub merge_log: Vec<MergeRecord>,
    /// Distinct cube serials over all inputs, sorted.
    pub cube_serials: Vec<String>,
    pub stats: CombineStats,
}

#[derive(Debug)]
pub struct PointCombiner {
    config: CombineConfig,
    merger: PointMerger,
}

impl PointCombiner {
    pub fn new(config: CombineConfig) -> Result<Self> {
        config.validate()?;
        let merger = PointMerger::new(config.image_tolerance);
        Ok(Self { config, merger })
    }

    pub fn config(&self) -> &CombineConfig {
        &self.config
    }

    /// Merge in-memory networks, in the order given.
    pub fn combine(&self, networks: Vec<ControlNet>) -> Result<CombineResult> {
        if networks.is_empty() {
            return Err(Error::NoInputs);
        }

        let mut aggregate = Aggregate::from_networks(networks);
        let mut stats = CombineStats {
            total_images: aggregate.num_images(),
            input_points: aggregate.points.len(),
            valid_points: aggregate.valid_points,
            total_measures: aggregate.total_measures,
            ..Default::default()
        };
        tracing::info!(
            networks = aggregate.num_networks,
            points = stats.input_points,
            valid_points = stats.valid_points,
            measures = stats.total_measures,
            images = stats.total_images,
            "Aggregated input networks"
        );

        let start = Instant::now();
        let index = aggregate.build_index(self.config.kd_leaf_size);
        tracing::info!(
            images = index.num_images(),
            leaf_size = index.leaf_size(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built measure clouds"
        );

        let start = Instant::now();
        let merge_log = self.merge_points(&mut aggregate, &index, &mut stats)?;
        tracing::info!(
            points_evaluated = stats.points_evaluated,
            points_merged = stats.points_merged,
            measures_merged = stats.measures_merged,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Merged points"
        );

        let cube_serials: Vec<String> = aggregate.cube_serials().map(str::to_owned).collect();
        let header = aggregate.header.clone();

        let absorbed: HashSet<PointId> = merge_log.absorbed().collect();
        let filtered = filter_points(aggregate.into_points(), &absorbed, &self.config);
        stats.measures_deleted += filtered.stats.measures_deleted;
        stats.points_dropped_min_measures = filtered.stats.points_dropped_min_measures;
        stats.output_points = filtered.stats.output_points;

        let merge_log = merge_log.records(&filtered.names);
        let network = output_network(filtered.points, &header, &self.config);

        tracing::info!(
            output_points = stats.output_points,
            dropped_min_measures = stats.points_dropped_min_measures,
            measures_deleted = stats.measures_deleted,
            log_entries = merge_log.len(),
            "Filtered output network"
        );

        Ok(CombineResult {
            network,
            merge_log,
            cube_serials,
            stats,
        })
    }

    /// Phase 3. Each worthy point, in arena order, is a merge source for
    /// the worthy points whose measures lie within the image tolerance of
    /// one of its own on a shared image.
    pub fn merge_points(
        &self,
        aggregate: &mut Aggregate,
        index: &ImageIndex,
        stats: &mut CombineStats,
    ) -> Result<MergeLog> {
        let tolerance = self.config.image_tolerance;
        let mut log = MergeLog::new();
        let mut hits: Vec<IndexedMeasure> = Vec::new();
        let mut seen: HashSet<PointId> = HashSet::new();
        let mut candidates: Vec<PointId> = Vec::new();
        let mut absorbed: Vec<PointId> = Vec::new();

        for idx in 0..aggregate.points.len() {
            let source_id = PointId(idx);
            let source = aggregate.point(source_id);
            if !source.is_worthy() {
                continue;
            }

            seen.clear();
            candidates.clear();
            for measure in source.valid_measures() {
                hits.clear();
                index.radius_query_into(
                    measure.cube_serial(),
                    measure.position(),
                    tolerance,
                    &mut hits,
                );
                for hit in &hits {
                    if hit.point != source_id
                        && aggregate.point(hit.point).is_worthy()
                        && seen.insert(hit.point)
                    {
                        candidates.push(hit.point);
                    }
                }
            }
            if candidates.is_empty() {
                continue;
            }

            // Tree traversal order is arbitrary; arena order keeps runs reproducible.
            candidates.sort_unstable();

            let start_measures = source.num_measures();
            absorbed.clear();
            for &candidate_id in &candidates {
                let (source, candidate) = aggregate.pair_mut(source_id, candidate_id);
                stats.points_evaluated += 1;

                match self.merger.evaluate(source, candidate) {
                    Verdict::Accept(distance) => {
                        let outcome = self.merger.merge(source, candidate, &distance)?;
                        tracing::debug!(
                            source = %source.id,
                            candidate = %candidate.id,
                            mean = distance.mean,
                            common_images = distance.count,
                            transferred = outcome.transferred,
                            dropped = outcome.dropped,
                            "Merged point"
                        );
                        stats.points_merged += 1;
                        stats.measures_merged += outcome.transferred;
                        stats.measures_deleted += outcome.dropped;
                        absorbed.push(candidate_id);
                    }
                    Verdict::BeyondTolerance(distance) => {
                        tracing::trace!(
                            source = %source.id,
                            candidate = %candidate.id,
                            mean = distance.mean,
                            "Candidate beyond tolerance"
                        );
                    }
                    _ => {}
                }
            }

            let end_measures = aggregate.point(source_id).num_measures();
            log.record(source_id, start_measures, end_measures, &absorbed);
        }

        Ok(log)
    }
}

/// Networks named by a run configuration, in base, from, list order.
pub fn input_paths(config: &RunConfig) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    paths.extend(config.cnet_base.iter().cloned());
    paths.extend(config.cnet_from.iter().cloned());
    if let Some(list) = &config.cnet_list {
        paths.extend(io::read_network_list(list)?);
    }

    if paths.is_empty() {
        return Err(Error::NoInputs);
    }
    Ok(paths)
}

/// Load the configured networks, combine them, and write every configured
/// output. Outputs are staged and moved into place only after all of them
/// were written, so a failed run leaves no partial output.
pub fn run(config: &RunConfig) -> Result<CombineResult> {
    let combiner = PointCombiner::new(config.combine.clone())?;

    let networks = input_paths(config)?
        .iter()
        .map(|path| io::load_network(path))
        .collect::<Result<Vec<_>>>()?;

    let result = combiner.combine(networks)?;

    let mut outputs = io::StagedOutputs::new();
    if let Some(path) = &config.onet {
        io::save_network(&result.network, &outputs.stage(path))?;
    }
    if let Some(path) = &config.tosn {
        let serials = result.cube_serials.iter().map(String::as_str);
        io::write_serial_list(serials, &outputs.stage(path))?;
    }
    if let Some(path) = &config.log_file {
        MergeLog::write_csv(&result.merge_log, &outputs.stage(path))?;
    }
    outputs.commit()?;

    if let Some(path) = &config.onet {
        tracing::info!(path = %path.display(), points = result.network.num_points(), "Wrote control network");
    }
    if let Some(path) = &config.tosn {
        tracing::info!(path = %path.display(), serials = result.cube_serials.len(), "Wrote serial list");
    }
    if let Some(path) = &config.log_file {
        tracing::info!(path = %path.display(), entries = result.merge_log.len(), "Wrote merge log");
    }

    Ok(result)
}
