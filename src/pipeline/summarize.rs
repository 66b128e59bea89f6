// pipeline/summarize.rs
// Phase 4: Dispersion statistics for each cognate set
// Geographic spread (pairwise geodesic distance) and subgroup spread (microgroups hit)

use super::enrich::LocatedReflex;
use crate::config::SetdistConfig;
use crate::geodesy::{self, Coordinates};
use indexmap::IndexMap;
use tracing::{info, warn};

/// Summary statistics over the distinct pairwise distances of a set, in km
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// No distance could be measured: every located reflex shares one
    /// position, or fewer than two reflexes are located. All values are 0.
    pub degenerate: bool,
}

impl DistanceStats {
    /// Statistics over the distinct values in `distances`
    pub fn from_distances(mut distances: Vec<f64>) -> Self {
        distances.sort_by(f64::total_cmp);
        distances.dedup();

        match (distances.first(), distances.last()) {
            (Some(&min), Some(&max)) => Self {
                min,
                max,
                mean: distances.iter().sum::<f64>() / distances.len() as f64,
                degenerate: false,
            },
            _ => Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                degenerate: true,
            },
        }
    }
}

/// One summary per cognate set with at least two reflexes
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub protoform: String,
    pub reflexes: usize,
    pub distance: DistanceStats,
    /// A contributing position was interpolated from family members
    pub interpolated: bool,
    /// Matched microgroup names, in configuration order
    pub microgroups: Vec<String>,
    /// A reflex comes from a regional lingua franca
    pub has_regional: bool,
}

impl SummaryRecord {
    pub fn microgroup_count(&self) -> usize {
        self.microgroups.len()
    }
}

/// Summarize every group with two or more reflexes
pub fn summarize(
    groups: &IndexMap<String, Vec<LocatedReflex>>,
    config: &SetdistConfig,
) -> Vec<SummaryRecord> {
    let mut result = Vec::new();
    let mut skipped = 0;

    for (protoform, rows) in groups {
        // A lone reflex has no spread to measure
        if rows.len() < 2 {
            skipped += 1;
            continue;
        }
        result.push(summarize_set(protoform, rows, config));
    }

    info!(
        "Summarized {} cognate sets ({} single-reflex sets skipped)",
        result.len(),
        skipped
    );
    result
}

fn summarize_set(protoform: &str, rows: &[LocatedReflex], config: &SetdistConfig) -> SummaryRecord {
    let located: Vec<&LocatedReflex> = rows.iter().filter(|r| r.coordinates.is_some()).collect();
    let points: Vec<Coordinates> = located.iter().filter_map(|r| r.coordinates).collect();

    let distance = DistanceStats::from_distances(pairwise_distances(&points));
    if distance.degenerate {
        warn!(
            protoform,
            reflexes = rows.len(),
            located = points.len(),
            "no measurable distance between reflexes, reporting zero spread"
        );
    }

    let microgroups = config
        .microgroups
        .iter()
        .filter(|group| rows.iter().any(|r| r.has_ancestor(&group.code)))
        .map(|group| group.name.clone())
        .collect();

    SummaryRecord {
        protoform: protoform.to_string(),
        reflexes: rows.len(),
        distance,
        interpolated: located.iter().any(|r| r.interpolated),
        microgroups,
        has_regional: rows
            .iter()
            .any(|r| config.regional_codes.iter().any(|c| *c == r.glottocode)),
    }
}

/// Geodesic distance in km between every pair of distinct positions.
///
/// Distances are symmetric, so each unordered pair is measured once.
/// Pairs that cannot be measured are skipped with a warning.
pub fn pairwise_distances(points: &[Coordinates]) -> Vec<f64> {
    let mut distances = Vec::new();

    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            if a == b {
                continue;
            }
            match geodesy::distance_km(*a, *b) {
                Ok(km) => distances.push(km),
                Err(e) => warn!("Couldn't calculate distance for {}, {}: {}", a, b, e),
            }
        }
    }

    distances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Microgroup;
    use crate::pipeline::group::{group_by, GroupKey};
    use crate::taxonomy::TaxonRef;

    fn reflex(protoform: &str, code: &str, at: Option<(f64, f64)>, ancestors: &[&str]) -> LocatedReflex {
        LocatedReflex {
            protoform: protoform.to_string(),
            glottocode: code.to_string(),
            language: None,
            coordinates: at.map(|(lat, lon)| Coordinates::new(lat, lon)),
            ancestors: ancestors
                .iter()
                .map(|c| TaxonRef {
                    code: c.to_string(),
                    name: c.to_uppercase(),
                })
                .collect(),
            interpolated: false,
        }
    }

    fn config() -> SetdistConfig {
        SetdistConfig {
            microgroups: vec![
                Microgroup::new("North", "nort0001"),
                Microgroup::new("South", "sout0001"),
                Microgroup::new("East", "east0001"),
            ],
            regional_codes: vec!["regi0001".to_string()],
            ..SetdistConfig::default()
        }
    }

    fn groups(rows: Vec<LocatedReflex>) -> IndexMap<String, Vec<LocatedReflex>> {
        group_by(rows, GroupKey::ProtoForm)
    }

    #[test]
    fn single_reflex_sets_are_skipped() {
        let grouped = groups(vec![
            reflex("P1", "a", Some((10.0, 100.0)), &[]),
            reflex("P1", "b", Some((11.0, 101.0)), &[]),
            reflex("P2", "c", Some((12.0, 102.0)), &[]),
        ]);
        let summaries = summarize(&grouped, &config());

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].protoform, "P1");
        assert_eq!(summaries[0].reflexes, 2);
        assert!(!summaries[0].distance.degenerate);
        assert!(summaries[0].distance.min > 0.0);
    }

    #[test]
    fn statistics_are_ordered() {
        let grouped = groups(vec![
            reflex("P1", "a", Some((0.0, 0.0)), &[]),
            reflex("P1", "b", Some((0.0, 1.0)), &[]),
            reflex("P1", "c", Some((0.0, 3.0)), &[]),
            reflex("P1", "d", Some((0.0, 3.0)), &[]),
        ]);
        let s = &summarize(&grouped, &config())[0];

        assert!(0.0 <= s.distance.min);
        assert!(s.distance.min <= s.distance.mean);
        assert!(s.distance.mean <= s.distance.max);
        assert!((s.distance.max - 3.0 * 111.32).abs() < 1.0);
        assert_eq!(s.reflexes, 4);
    }

    #[test]
    fn distances_form_a_set() {
        // Both pairs are one degree apart on the equator
        let points = [
            Coordinates::new(0.0, 0.0),
            Coordinates::new(0.0, 1.0),
            Coordinates::new(0.0, 0.0),
        ];
        let distances = pairwise_distances(&points);
        assert_eq!(distances.len(), 2);

        let stats = DistanceStats::from_distances(distances);
        assert!((stats.max - stats.min).abs() < 1e-6);
        assert!((stats.mean - stats.min).abs() < 1e-6);

        // repeated values count once towards the mean
        let stats = DistanceStats::from_distances(vec![1.0, 4.0, 1.0, 1.0]);
        assert_eq!((stats.min, stats.max, stats.mean), (1.0, 4.0, 2.5));
    }

    #[test]
    fn empty_distance_list_is_degenerate() {
        let stats = DistanceStats::from_distances(Vec::new());
        assert!(stats.degenerate);
        assert_eq!(stats.mean, 0.0);
    }

    #[test]
    fn co_located_set_is_degenerate_not_fatal() {
        let grouped = groups(vec![
            reflex("P1", "a", Some((5.0, 5.0)), &[]),
            reflex("P1", "b", Some((5.0, 5.0)), &[]),
            reflex("P1", "c", None, &[]),
        ]);
        let s = &summarize(&grouped, &config())[0];

        assert!(s.distance.degenerate);
        assert_eq!((s.distance.min, s.distance.max, s.distance.mean), (0.0, 0.0, 0.0));
        assert_eq!(s.reflexes, 3);
    }

    #[test]
    fn bad_positions_are_skipped() {
        let points = [
            Coordinates::new(0.0, 0.0),
            Coordinates::new(95.0, 0.0),
            Coordinates::new(0.0, 1.0),
        ];
        assert_eq!(pairwise_distances(&points).len(), 1);
    }

    #[test]
    fn microgroups_match_on_ancestor_codes() {
        let grouped = groups(vec![
            reflex("P1", "a", Some((0.0, 0.0)), &["root", "east0001"]),
            reflex("P1", "b", Some((0.0, 1.0)), &["root", "nort0001"]),
            reflex("P1", "c", Some((0.0, 2.0)), &["root", "nort0001"]),
            // the row's own code is not an ancestor
            reflex("P1", "sout0001", Some((0.0, 3.0)), &["root"]),
        ]);
        let s = &summarize(&grouped, &config())[0];

        assert_eq!(s.microgroups, vec!["North".to_string(), "East".to_string()]);
        assert_eq!(s.microgroup_count(), 2);
        assert!(!s.has_regional);
    }

    #[test]
    fn interpolation_and_regional_flags() {
        let mut family = reflex("P1", "regi0001", Some((1.0, 1.0)), &[]);
        family.interpolated = true;
        let grouped = groups(vec![family, reflex("P1", "b", Some((2.0, 2.0)), &[])]);
        let s = &summarize(&grouped, &config())[0];

        assert!(s.interpolated);
        assert!(s.has_regional);

        let plain = groups(vec![
            reflex("P2", "a", Some((1.0, 1.0)), &[]),
            reflex("P2", "b", Some((2.0, 2.0)), &[]),
        ]);
        let s = &summarize(&plain, &config())[0];
        assert!(!s.interpolated);
        assert!(!s.has_regional);
    }
}
