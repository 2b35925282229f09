use nalgebra::Matrix4;
use proptest::prelude::*;
use wikihouse_core::{Bounds, Length, LengthExt, Point2};
use wikihouse_fabricate::{
    assign_labels, LayoutEngine, Panel, RotationPolicy, UnplaceablePanelError,
};
use wikihouse_settings::Settings;

fn rect_panel(w_mm: f64, h_mm: f64) -> Panel {
    let (w, h) = (w_mm.mm().inches(), h_mm.mm().inches());
    Panel {
        label: String::new(),
        outline: vec![
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ],
        inner_loops: Vec::new(),
        thickness: 18.0.mm(),
        transform: Matrix4::identity(),
        tag: None,
        source: "generated".to_string(),
    }
}

fn panel_sizes() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((10.0f64..1100.0, 10.0f64..1100.0), 0..40)
}

fn rotation_policies() -> impl Strategy<Value = RotationPolicy> {
    prop_oneof![Just(RotationPolicy::Auto), Just(RotationPolicy::None)]
}

proptest! {
    #[test]
    fn padded_placements_never_overlap(sizes in panel_sizes(), rotation in rotation_policies()) {
        let mut panels: Vec<Panel> = sizes.iter().map(|&(w, h)| rect_panel(w, h)).collect();
        assign_labels(&mut panels);
        let layout = LayoutEngine::new(&Settings::default())
            .with_rotation(rotation)
            .layout(&panels)
            .unwrap();

        for sheet in &layout.sheets {
            let padded: Vec<Bounds> = sheet
                .placements
                .iter()
                .map(|p| p.bounds().inflate(layout.padding))
                .collect();
            for (i, a) in padded.iter().enumerate() {
                for b in padded.iter().skip(i + 1) {
                    prop_assert!(!a.overlaps(b, 1e-6));
                }
            }
        }
        prop_assert!(layout.verify().is_ok());
    }

    #[test]
    fn placements_stay_inside_margins(sizes in panel_sizes()) {
        let settings = Settings::default();
        let panels: Vec<Panel> = sizes.iter().map(|&(w, h)| rect_panel(w, h)).collect();
        let layout = LayoutEngine::new(&settings).layout(&panels).unwrap();

        let margin = settings.margin().inches();
        let right = settings.sheet_width().inches() - margin;
        let top = settings.sheet_height().inches() - margin;
        for (_, placement) in layout.placements() {
            let b = placement.bounds();
            prop_assert!(b.min.x >= margin - 1e-9 && b.min.y >= margin - 1e-9);
            prop_assert!(b.max.x <= right + 1e-9 && b.max.y <= top + 1e-9);
            // Transformed outline keeps its bounding box
            let outline = Bounds::from_points(&placement.outline).unwrap();
            prop_assert!((outline.min.x - b.min.x).abs() < 1e-6);
            prop_assert!((outline.max.y - b.max.y).abs() < 1e-6);
        }
    }

    #[test]
    fn every_panel_is_placed_once(sizes in panel_sizes()) {
        let panels: Vec<Panel> = sizes.iter().map(|&(w, h)| rect_panel(w, h)).collect();
        let layout = LayoutEngine::new(&Settings::default()).layout(&panels).unwrap();

        let mut seen: Vec<usize> = layout.placements().map(|(_, p)| p.panel).collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..panels.len()).collect::<Vec<_>>());
        prop_assert_eq!(layout.stats().panels, panels.len());
        prop_assert!(layout.stats().utilisation <= 1.0);
    }

    #[test]
    fn oversized_panels_are_rejected(extra in 1.0f64..500.0) {
        let settings = Settings::default();
        let inner = settings.sheet_inner_width().to_mm();
        let panels = vec![rect_panel(inner + extra, inner + extra)];
        let err: UnplaceablePanelError = LayoutEngine::new(&settings)
            .layout(&panels)
            .unwrap_err();
        prop_assert!((err.width.to_mm() - (inner + extra)).abs() < 1e-6);
    }
}

#[test]
fn test_layout_is_deterministic() {
    let panels: Vec<Panel> = (1..30)
        .map(|i| rect_panel(37.0 * i as f64, 900.0 - 25.0 * i as f64))
        .collect();
    let engine = LayoutEngine::new(&Settings::default());
    assert_eq!(engine.layout(&panels).unwrap(), engine.layout(&panels).unwrap());
}

#[test]
fn test_panel_exactly_filling_inner_area() {
    let settings = Settings::default();
    let pad = settings.padding().to_mm();
    let w = settings.sheet_inner_width().to_mm() - 2.0 * pad;
    let h = settings.sheet_inner_height().to_mm() - 2.0 * pad;
    let layout = LayoutEngine::new(&settings)
        .layout(&[rect_panel(w, h), rect_panel(w, h)])
        .unwrap();
    assert_eq!(layout.sheets.len(), 2);
    assert!(layout.verify().is_ok());
    let label_height = Length::from_inches(layout.font_height).to_mm();
    assert!((label_height - 30.0).abs() < 1e-9);
}
