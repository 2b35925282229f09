use tempfile::TempDir;
use wikihouse_core::{GeometryErrorKind, LengthExt};
use wikihouse_fabricate::{
    default_output_path, Face, FabricationError, Fabricator, GeometryPolicy, Group, Mode,
    ModelDocument, ModelEntity, OutputFormat, RotationPolicy,
};
use wikihouse_settings::Settings;

fn rect(name: &str, w_mm: f64, h_mm: f64) -> ModelEntity {
    let (w, h) = (w_mm.mm().inches(), h_mm.mm().inches());
    ModelEntity::Face(Face::new(
        name,
        vec![[0.0, 0.0, 0.0], [w, 0.0, 0.0], [w, h, 0.0], [0.0, h, 0.0]],
        18.0.mm(),
    ))
}

fn house() -> Vec<ModelEntity> {
    vec![ModelEntity::Group(Group::new(
        "house",
        vec![
            ModelEntity::Group(Group::new(
                "wall-1",
                vec![rect("stud-1", 300.0, 1500.0), rect("stud-2", 300.0, 1500.0)],
            )),
            rect("floor", 800.0, 500.0),
        ],
    ))]
}

#[test]
fn test_save_forces_extension() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out").join("house");

    let run = Fabricator::new(Settings::default())
        .with_format(OutputFormat::Dxf)
        .run(&house(), Mode::Save { path: target })
        .unwrap();

    let written = run.path().unwrap();
    assert_eq!(written, dir.path().join("out").join("house.dxf"));
    let content = std::fs::read_to_string(written).unwrap();
    assert!(content.contains("AC1009"));
    assert_eq!(run.report.panels, 3);
}

#[test]
fn test_save_replaces_wrong_extension() {
    let dir = TempDir::new().unwrap();
    let run = Fabricator::new(Settings::default())
        .run(
            &house(),
            Mode::Save {
                path: dir.path().join("house.dxf"),
            },
        )
        .unwrap();
    assert_eq!(run.path().unwrap(), dir.path().join("house.svg"));
    assert!(!dir.path().join("house.dxf").exists());
}

#[test]
fn test_failed_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.svg");
    let entities = vec![rect("too-big", 3000.0, 3000.0)];

    let err = Fabricator::new(Settings::default())
        .run(&entities, Mode::Save { path: path.clone() })
        .unwrap_err();
    assert!(matches!(err, FabricationError::Unplaceable(_)));
    assert!(!path.exists());
}

#[test]
fn test_rejected_faces_name_their_path() {
    let wrong_thickness = ModelEntity::Face(Face::new(
        "skin",
        vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0], [0.0, 10.0, 0.0]],
        12.0.mm(),
    ));
    let entities = vec![ModelEntity::Group(Group::new(
        "house",
        vec![ModelEntity::Group(Group::new("wall-1", vec![wrong_thickness]))],
    ))];

    let err = Fabricator::new(Settings::default())
        .run(&entities, Mode::Preview)
        .unwrap_err();
    let FabricationError::Extraction(failures) = err else {
        panic!("expected extraction failure");
    };
    assert_eq!(failures[0].entity, "house/wall-1/skin");
    assert!(matches!(
        failures[0].kind,
        GeometryErrorKind::ThicknessMismatch { .. }
    ));

    let run = Fabricator::new(Settings::default())
        .with_geometry_policy(GeometryPolicy::Skip)
        .run(&entities, Mode::Preview)
        .unwrap();
    assert_eq!(run.report.skipped.len(), 1);
    assert_eq!(run.report.sheets, 0);
}

#[test]
fn test_tall_panels_rotated_by_default() {
    let auto = Fabricator::new(Settings::default())
        .run(&house(), Mode::Preview)
        .unwrap();
    assert_eq!(auto.report.sheets, 1);

    // Unrotated 1500 mm studs cannot fit a 1200 mm tall sheet
    let err = Fabricator::new(Settings::default())
        .with_rotation(RotationPolicy::None)
        .run(&house(), Mode::Preview)
        .unwrap_err();
    assert!(matches!(err, FabricationError::Unplaceable(ref e) if e.label == "A"));
}

#[test]
fn test_model_document_round_trip_through_cli_workflow() {
    let dir = TempDir::new().unwrap();
    let model_path = dir.path().join("model.json");
    let doc = ModelDocument {
        title: "Garden Room".to_string(),
        entities: house(),
    };
    std::fs::write(&model_path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

    let loaded = ModelDocument::load(&model_path).unwrap();
    assert_eq!(loaded, doc);

    let out = default_output_path(&model_path, &loaded.title, OutputFormat::Svg);
    let run = Fabricator::new(Settings::default())
        .run(&loaded.entities, Mode::Save { path: out })
        .unwrap();
    assert_eq!(run.path().unwrap(), dir.path().join("Garden Room.svg"));
}
