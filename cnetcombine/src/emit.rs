//! Post-merge filtering and assembly of the output network.

use chrono::{SecondsFormat, Utc};
use hashbrown::{HashMap, HashSet};

use crate::aggregate::{NetworkHeader, PointId};
use crate::config::CombineConfig;
use crate::control::{ControlNet, ControlPoint};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub measures_deleted: usize,
    pub points_dropped_min_measures: usize,
    pub output_points: usize,
}

/// Result of the single post-filter pass.
#[derive(Debug)]
pub struct Filtered {
    pub points: Vec<ControlPoint>,
    /// Final ID of every aggregate point, by arena index, including points
    /// that were dropped.
    pub names: Vec<String>,
    pub stats: FilterStats,
}

/// Renames duplicate IDs, prunes measures, applies the minimum-measure rule
/// and the apriori reset, and drops ignored or invalid points when
/// `clean_net` is set.
///
/// Points in `absorbed` were merged into another point and are always
/// dropped. They still take part in renaming so that merge-log IDs resolve.
pub fn filter_points(
    points: Vec<ControlPoint>,
    absorbed: &HashSet<PointId>,
    config: &CombineConfig,
) -> Filtered {
    let mut renamer = IdRenamer::default();
    let mut names = Vec::with_capacity(points.len());
    let mut kept = Vec::with_capacity(points.len());
    let mut stats = FilterStats::default();

    for (idx, mut point) in points.into_iter().enumerate() {
        let name = renamer.unique(&point.id);
        if name != point.id {
            tracing::debug!(original = %point.id, renamed = %name, "Renamed duplicate point ID");
            point.id = name.clone();
        }
        names.push(name);

        if absorbed.contains(&PointId(idx)) {
            continue;
        }

        if config.clean_measures {
            stats.measures_deleted += point.retain_valid_measures();
        }

        if !point.edit_lock && !point.ignored && point.num_valid_measures() < config.min_measures {
            point.ignored = true;
            stats.points_dropped_min_measures += 1;
        }

        if config.set_apriori_best && !point.edit_lock {
            point.set_apriori_to_best();
        }

        if config.clean_net && (point.ignored || point.invalid) {
            continue;
        }
        kept.push(point);
    }

    stats.output_points = kept.len();
    Filtered {
        points: kept,
        names,
        stats,
    }
}

/// Hands out `id`, then `id_1`, `id_2`, ... for repeats, skipping any name
/// already taken.
#[derive(Debug, Default)]
struct IdRenamer {
    used: HashSet<String>,
    counts: HashMap<String, usize>,
}

impl IdRenamer {
    fn unique(&mut self, id: &str) -> String {
        let mut name = id.to_string();
        while !self.used.insert(name.clone()) {
            let count = self.counts.entry(id.to_string()).or_insert(0);
            *count += 1;
            name = format!("{id}_{count}");
        }
        name
    }
}

/// Builds the output network around the surviving points.
pub fn output_network(
    points: Vec<ControlPoint>,
    header: &NetworkHeader,
    config: &CombineConfig,
) -> ControlNet {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    ControlNet {
        network_id: config
            .network_id
            .clone()
            .unwrap_or_else(|| header.network_id.clone()),
        target_name: header.target_name.clone(),
        description: config
            .description
            .clone()
            .unwrap_or_else(|| header.description.clone()),
        user_name: user_name(),
        created: now.clone(),
        modified: now,
        points,
    }
}

fn user_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
