use cognate_sets::config::SetdistConfig;
use cognate_sets::pipeline::{self, enrich, ingest, report};
use cognate_sets::taxonomy::{Gazetteer, GazetteerEntry, LazyGazetteer, ReferenceCache};
use cognate_sets::Error;
use std::fs;
use std::path::Path;

fn gazetteer() -> Gazetteer {
    Gazetteer::from_entries([
        GazetteerEntry::new("aust1307", "Austronesian", "family"),
        GazetteerEntry::new("cent2246", "Central Philippine", "family").parent("aust1307"),
        GazetteerEntry::new("taga1270", "Tagalog", "language")
            .parent("cent2246")
            .located(10.0, 100.0),
        GazetteerEntry::new("cebu1242", "Cebuano", "language")
            .parent("cent2246")
            .located(11.0, 101.0),
        GazetteerEntry::new("bata1315", "Batanic", "family").parent("aust1307"),
        GazetteerEntry::new("ivat1242", "Ivatan", "language")
            .parent("bata1315")
            .located(18.0, 121.0),
        GazetteerEntry::new("itba1234", "Itbayat", "language")
            .parent("bata1315")
            .located(21.0, 121.0),
        GazetteerEntry::new("yami1254", "Yami", "language")
            .parent("bata1315")
            .located(18.0, 124.0),
    ])
    .unwrap()
}

const REFLEXES: &str = "ProtoForm\tGlottoCode\tGlottologName\tLatitude\tLongitude\n\
                        P1\ttaga1270\tTagalog\t\t\n\
                        P1\tcebu1242\tCebuano\t\t\n\
                        P2\tivat1242\tIvatan\t\t\n\
                        P3\tbata1315\tBatanic\t\t\n\
                        P3\tivat1242\tIvatan\t\t\n\
                        P3\t\tUnknown\t\t\n\
                        P4\t\tUnknown\t\t\n\
                        P4\ttaga1270\tTagalog\t\t\n";

fn write_input(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("reflexes.tsv");
    fs::write(&path, contents).unwrap();
    path
}

fn render(output: &pipeline::SetdistOutput, config: &SetdistConfig) -> (Vec<u8>, Vec<u8>) {
    let mut summary = Vec::new();
    let mut matrix = Vec::new();
    report::write_summary(&mut summary, &output.summaries).unwrap();
    report::write_matrix(&mut matrix, &output.matrix, &config.microgroups).unwrap();
    (summary, matrix)
}

#[test]
fn only_multi_reflex_sets_are_summarized() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), REFLEXES);
    let gazetteer = gazetteer();
    let config = SetdistConfig::default();

    let output = ReferenceCache::scoped(dir.path().join("cache.bin"), &gazetteer, |cache| {
        pipeline::run_setdist(&input, cache, &config)
    })
    .unwrap();

    assert_eq!(output.reflexes_read, 8);
    assert_eq!(output.reflexes_located, 6);

    let protoforms: Vec<&str> = output.summaries.iter().map(|s| s.protoform.as_str()).collect();
    assert_eq!(protoforms, vec!["P1", "P3"]);

    let p1 = &output.summaries[0];
    assert_eq!(p1.reflexes, 2);
    assert!(!p1.interpolated);
    assert!(p1.has_regional);
    assert_eq!(p1.microgroups, vec!["Central Philippine"]);
    assert!(p1.distance.min > 0.0);
    assert_eq!(p1.distance.min, p1.distance.max);
    assert_eq!(p1.distance.min, p1.distance.mean);

    // The row without a code leaves P3 with two reflexes
    let p3 = &output.summaries[1];
    assert_eq!(p3.reflexes, 2);
    assert!(p3.interpolated);
    assert!(!p3.has_regional);
    assert_eq!(p3.microgroups, vec!["Batanic"]);
}

#[test]
fn family_rows_take_the_member_centroid() {
    let gazetteer = gazetteer();
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ReferenceCache::open(dir.path().join("cache.bin"), &gazetteer).unwrap();

    let rows = ingest::read_reflexes(REFLEXES.as_bytes(), "inline").unwrap();
    let enriched = enrich::enrich(&mut cache, rows).unwrap();

    assert_eq!(enriched.dropped, 2);
    let family = enriched
        .rows
        .iter()
        .find(|r| r.glottocode == "bata1315")
        .unwrap();
    let position = family.coordinates.unwrap();
    assert!(family.interpolated);
    assert!((position.latitude - 19.0).abs() < 1e-6);
    assert!((position.longitude - 122.0).abs() < 1e-6);

    assert!(enriched
        .rows
        .iter()
        .filter(|r| r.glottocode != "bata1315")
        .all(|r| !r.interpolated));
}

#[test]
fn statistics_are_ordered_and_matrix_matches_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), REFLEXES);
    let gazetteer = gazetteer();
    let config = SetdistConfig::default();

    let output = ReferenceCache::scoped(dir.path().join("cache.bin"), &gazetteer, |cache| {
        pipeline::run_setdist(&input, cache, &config)
    })
    .unwrap();

    assert_eq!(output.summaries.len(), output.matrix.len());
    for (summary, row) in output.summaries.iter().zip(&output.matrix) {
        let d = summary.distance;
        assert!(0.0 <= d.min && d.min <= d.mean && d.mean <= d.max);

        assert_eq!(summary.protoform, row.protoform);
        assert_eq!(row.presence.len(), config.microgroups.len());
        assert_eq!(row.present_count(), summary.microgroup_count());
    }
}

#[test]
fn second_run_is_identical_and_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), REFLEXES);
    let cache_path = dir.path().join("cache.bin");
    let config = SetdistConfig::default();

    let gazetteer = gazetteer();
    let first = ReferenceCache::scoped(&cache_path, &gazetteer, |cache| {
        pipeline::run_setdist(&input, cache, &config)
    })
    .unwrap();
    assert!(cache_path.exists());

    // Every code is cached, so the gazetteer file is never opened
    let absent = LazyGazetteer::new(Some(dir.path().join("absent-languoid.csv")));
    let mut cache = ReferenceCache::open(&cache_path, &absent).unwrap();
    let second = pipeline::run_setdist(&input, &mut cache, &config).unwrap();
    assert!(!cache.is_dirty());
    assert!(!absent.is_loaded());

    assert_eq!(render(&first, &config), render(&second, &config));
}

#[test]
fn cached_run_needs_no_gazetteer_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), REFLEXES);
    let cache_path = dir.path().join("cache.bin");
    let config = SetdistConfig::default();

    let gazetteer = gazetteer();
    ReferenceCache::scoped(&cache_path, &gazetteer, |cache| {
        pipeline::run_setdist(&input, cache, &config)
    })
    .unwrap();

    let unset = LazyGazetteer::new(None);
    let output = ReferenceCache::scoped(&cache_path, &unset, |cache| {
        pipeline::run_setdist(&input, cache, &config)
    })
    .unwrap();
    assert_eq!(output.summaries.len(), 2);
    assert!(!unset.is_loaded());

    // A code the cache has not seen still needs the gazetteer
    let extra = write_input(
        dir.path(),
        "ProtoForm\tGlottoCode\tLatitude\tLongitude\nP9\tyami1254\t\t\nP9\ttaga1270\t\t\n",
    );
    let result = ReferenceCache::scoped(&cache_path, &unset, |cache| {
        pipeline::run_setdist(&extra, cache, &config)
    });
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn unknown_code_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "ProtoForm\tGlottoCode\tLatitude\tLongitude\nP1\tnope1234\t\t\nP1\ttaga1270\t\t\n",
    );
    let gazetteer = gazetteer();
    let cache_path = dir.path().join("cache.bin");

    let result = ReferenceCache::scoped(&cache_path, &gazetteer, |cache| {
        pipeline::run_setdist(&input, cache, &SetdistConfig::default())
    });

    match result {
        Err(Error::UnknownCode { code }) => assert_eq!(code, "nope1234"),
        other => panic!("expected unknown code, got {:?}", other.map(|o| o.summaries)),
    }
}

#[test]
fn malformed_table_fails_before_lookups() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "ProtoForm\tGlottoCode\nP1\ttaga1270\n");
    let gazetteer = gazetteer();
    let cache_path = dir.path().join("cache.bin");

    let result = ReferenceCache::scoped(&cache_path, &gazetteer, |cache| {
        pipeline::run_setdist(&input, cache, &SetdistConfig::default())
    });

    assert!(matches!(result, Err(Error::Format { .. })));
    // Nothing was fetched, so there was nothing to save
    assert!(!cache_path.exists());
}
