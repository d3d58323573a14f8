#![allow(clippy::unwrap_used)]

use std::fs;
use std::sync::Arc;
use std::thread;

use approx::assert_relative_eq;
use pinhole::analysis::read_hits;
use pinhole::catalog::{DETECTOR, VOLUME_COUNT};
use pinhole::material::MaterialRegistry;
use pinhole::math::Point3;
use pinhole::units::{CM, MEV, MM, UM};
use pinhole::{
    classify, ApertureStrategy, CatalogOptions, Config, EntryScorer, GeometryCatalog, HitRecord,
    HitRecorder, RunContext, StepEvent,
};

fn materials() -> MaterialRegistry {
    MaterialRegistry::with_predefined(["G4_Al"])
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn reference_configuration_file_builds_expected_detector() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pinhole_config.txt");
    fs::write(&path, "0.5\n5.0\n100\n10\n").unwrap();
    let config = Config::load(&path).unwrap();

    let geo = GeometryCatalog::default()
        .build(&config, &mut materials())
        .unwrap();
    let tree = geo.tree();
    assert_eq!(tree.len(), VOLUME_COUNT);

    let window = tree.volume(geo.window()).unwrap();
    let bounds = window.solid.bounding_box().unwrap();
    assert_relative_eq!(bounds.max.y, 100.0 * UM, epsilon = 1e-12);
    assert_relative_eq!(geo.aperture_radius().unwrap(), 0.5 * MM);

    let window_y = tree.global_transform(geo.window()).unwrap().translation.vector.y;
    let foil_y = tree.global_transform(geo.foil()).unwrap().translation.vector.y;
    assert_relative_eq!(foil_y - window_y, 100.0 * UM + 10.0 * UM, epsilon = 1e-12);
    assert_relative_eq!(-foil_y, 5.0 * MM - 100.0 * UM - 10.0 * UM, epsilon = 1e-12);
}

#[test]
fn aperture_radius_tracks_configuration_for_both_strategies() {
    for aperture in [ApertureStrategy::Subtractive, ApertureStrategy::KnifeEdge] {
        let catalog = GeometryCatalog::new(CatalogOptions {
            aperture,
            check_overlaps: true,
        });
        for radius_mm in [0.01, 0.5, 2.0, 10.0, 60.0] {
            let config = Config::new(radius_mm * MM, 5.0 * MM, 100.0 * UM, 10.0 * UM).unwrap();
            let geo = catalog.build(&config, &mut materials()).unwrap();
            assert_relative_eq!(geo.aperture_radius().unwrap(), radius_mm * MM);
            let world = geo.tree().global_bounding_box(geo.world()).unwrap();
            let envelope = geo.tree().global_bounding_box(geo.envelope()).unwrap();
            assert!(world.strictly_contains_box(&envelope));
        }
    }
}

#[test]
fn entry_example_yields_one_hit_then_none() {
    let entering = StepEvent {
        track_id: 7,
        current_volume: None,
        next_volume: Some(DETECTOR),
        position: Point3::new(1.0 * CM, 0.0, 2.0 * CM),
        kinetic_energy: 5.0 * MEV,
    };
    let hit = classify(&entering, &DETECTOR).unwrap();
    assert_eq!(
        hit,
        HitRecord {
            x: 1.0 * CM,
            z: 2.0 * CM,
            kinetic_energy: 5.0 * MEV,
        }
    );

    let inside = StepEvent {
        current_volume: Some(DETECTOR),
        ..entering
    };
    assert!(classify(&inside, &DETECTOR).is_none());
}

#[test]
fn concurrent_threads_write_every_hit_as_a_whole_line() {
    const THREADS: usize = 8;
    const HITS: usize = 500;

    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let run = RunContext::new(dir.path());
    let recorder = Arc::new(HitRecorder::new());
    recorder.open(&run).unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let recorder = Arc::clone(&recorder);
            thread::spawn(move || {
                for h in 0..HITS {
                    #[allow(clippy::cast_precision_loss)]
                    recorder.record(&HitRecord {
                        x: t as f64 * CM,
                        z: h as f64 * CM,
                        kinetic_energy: 0.25 * MEV,
                    });
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = recorder.close().unwrap();
    assert_eq!(stats.recorded, (THREADS * HITS) as u64);
    assert_eq!(stats.dropped, 0);

    let text = fs::read_to_string(run.hits_path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), THREADS * HITS);
    for line in &lines {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 3, "malformed line {line:?}");
        assert!(fields.iter().all(|f| f.parse::<f64>().is_ok()), "bad line {line:?}");
    }

    let table = read_hits(run.hits_path()).unwrap();
    assert_eq!(table.hits.len(), THREADS * HITS);
    assert_eq!(table.skipped, 0);
}

#[test]
fn shared_geometry_drives_scoring_across_threads() {
    init_tracing();
    let config: Config = "0.5 5.0 100 10".parse().unwrap();
    let geo = Arc::new(
        GeometryCatalog::default()
            .build(&config, &mut materials())
            .unwrap(),
    );
    let dir = tempfile::tempdir().unwrap();
    let run = RunContext::with_token(dir.path(), "shared");
    let recorder = HitRecorder::new();
    recorder.open(&run).unwrap();

    thread::scope(|scope| {
        for t in 0..4_u64 {
            let geo = Arc::clone(&geo);
            let recorder = &recorder;
            scope.spawn(move || {
                let tree = geo.tree();
                let scorer = EntryScorer::new(geo.detector(), recorder);
                // A straight track along +y through the window gap into the detector.
                #[allow(clippy::cast_precision_loss)]
                let x = t as f64 * MM;
                let path = [-7.0, -3.0, -1.0, 0.0, 0.5];
                let mut current = tree.locate(&Point3::new(x, path[0], 0.0));
                for y in &path[1..] {
                    let point = Point3::new(x, *y, 0.0);
                    let next = tree.locate(&point);
                    scorer.process(&StepEvent {
                        track_id: t,
                        current_volume: current,
                        next_volume: next,
                        position: point,
                        kinetic_energy: 1.0 * MEV,
                    });
                    current = next;
                }
            });
        }
    });

    let stats = recorder.close().unwrap();
    assert_eq!(stats.recorded, 4);
    let table = read_hits(run.hits_path()).unwrap();
    assert!(table.hits.iter().all(|h| h.z == 0.0));
}
