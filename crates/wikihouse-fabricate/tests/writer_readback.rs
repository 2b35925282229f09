use dxf::entities::EntityType;
use std::io::Cursor;
use wikihouse_core::{LengthExt, Point2};
use wikihouse_fabricate::{
    writer_for, Drawing, DxfWriter, LayoutEngine, OutputFormat, Panel, SvgWriter, Writer,
};
use wikihouse_settings::Settings;

fn rect_panel(label: &str, w_mm: f64, h_mm: f64) -> Panel {
    let (w, h) = (w_mm.mm().inches(), h_mm.mm().inches());
    Panel {
        label: label.to_string(),
        outline: vec![
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ],
        inner_loops: Vec::new(),
        thickness: 18.0.mm(),
        transform: nalgebra::Matrix4::identity(),
        tag: None,
        source: label.to_lowercase(),
    }
}

fn drawing_of(panels: &[Panel]) -> Drawing {
    let layout = LayoutEngine::new(&Settings::default())
        .layout(panels)
        .unwrap();
    Drawing::from_layout(&layout)
}

/// One sheet holding a single 100 mm square panel "A"
fn square_drawing() -> Drawing {
    drawing_of(&[rect_panel("A", 100.0, 100.0)])
}

#[test]
fn test_svg_parses_with_one_outline_and_label() {
    let bytes = SvgWriter::new().write(&square_drawing()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let doc = roxmltree::Document::parse(&text).unwrap();

    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.attribute("width"), Some("2400.000mm"));
    assert_eq!(root.attribute("viewBox"), Some("0 0 2400.000 1200.000"));

    let paths: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("path") && n.attribute("class") == Some("cut"))
        .collect();
    assert_eq!(paths.len(), 1);
    let d = paths[0].attribute("d").unwrap();
    assert!(d.starts_with("M ") && d.ends_with(" Z"));
    assert_eq!(d.matches(" L ").count(), 3);

    let labels: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("text"))
        .collect();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].text(), Some("A"));

    let groups = doc
        .descendants()
        .filter(|n| n.has_tag_name("g"))
        .filter_map(|n| n.attribute("id"))
        .collect::<Vec<_>>();
    assert_eq!(groups, vec!["sheet-1"]);
}

#[test]
fn test_dxf_parses_with_one_outline_and_label() {
    let bytes = DxfWriter::new().write(&square_drawing()).unwrap();
    let drawing = dxf::Drawing::load(&mut Cursor::new(bytes)).unwrap();

    let layers: Vec<String> = drawing.layers().map(|l| l.name.clone()).collect();
    for name in ["CUT", "LABEL", "SHEET"] {
        assert!(layers.iter().any(|l| l == name), "missing layer {name}");
    }

    let mut cut_outlines = 0;
    let mut labels = Vec::new();
    for entity in drawing.entities() {
        match &entity.specific {
            EntityType::Polyline(polyline) if entity.common.layer == "CUT" => {
                cut_outlines += 1;
                let vertices: Vec<_> = polyline.vertices().collect();
                assert_eq!(vertices.len(), 4);
                assert!(polyline.flags & 1 != 0);
                assert!((vertices[0].location.x - 15.0).abs() < 1e-6);
                assert!((vertices[0].location.y - 15.0).abs() < 1e-6);
                assert!((vertices[2].location.x - 115.0).abs() < 1e-6);
            }
            EntityType::Text(text) => {
                assert_eq!(entity.common.layer, "LABEL");
                assert!((text.text_height - 30.0).abs() < 1e-6);
                labels.push(text.value.clone());
            }
            _ => {}
        }
    }
    assert_eq!(cut_outlines, 1);
    assert_eq!(labels, vec!["A".to_string()]);
}

#[test]
fn test_output_is_byte_identical_across_runs() {
    let drawing = square_drawing();
    for format in OutputFormat::ALL {
        let writer = writer_for(format);
        assert_eq!(writer.write(&drawing).unwrap(), writer.write(&drawing).unwrap());
    }
}

#[test]
fn test_second_sheet_sits_at_same_offset_in_both_formats() {
    // Each panel fills most of a sheet, so B starts a second one
    let drawing = drawing_of(&[rect_panel("A", 2000.0, 1000.0), rect_panel("B", 2000.0, 1000.0)]);
    assert_eq!(drawing.sheets.len(), 2);
    let expected_left = 2400.0 + 100.0;

    let svg = String::from_utf8(SvgWriter::new().write(&drawing).unwrap()).unwrap();
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let sheet_2 = doc
        .descendants()
        .find(|n| n.has_tag_name("g") && n.attribute("id") == Some("sheet-2"))
        .unwrap();
    let border = sheet_2
        .children()
        .find(|n| n.has_tag_name("rect"))
        .unwrap();
    let svg_left: f64 = border.attribute("x").unwrap().parse().unwrap();
    assert!((svg_left - expected_left).abs() < 1e-3);

    let dxf_doc = dxf::Drawing::load(&mut Cursor::new(DxfWriter::new().write(&drawing).unwrap()))
        .unwrap();
    let dxf_lefts: Vec<f64> = dxf_doc
        .entities()
        .filter(|e| e.common.layer == "SHEET")
        .filter_map(|e| match &e.specific {
            EntityType::Polyline(p) => p.vertices().map(|v| v.location.x).reduce(f64::min),
            _ => None,
        })
        .collect();
    assert_eq!(dxf_lefts.len(), 2);
    assert!(dxf_lefts[0].abs() < 1e-6);
    assert!((dxf_lefts[1] - svg_left).abs() < 1e-3);
}
