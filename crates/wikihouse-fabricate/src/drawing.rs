//! Format-neutral drawing model
//!
//! A [`Drawing`] is what every writer consumes: per sheet, a border and the
//! primitives to cut and label. It is a straight transcription of a
//! [`Layout`] and adds no geometry of its own. Coordinates are sheet-local
//! inches with Y pointing up.

use crate::layout::Layout;
use serde::Serialize;
use wikihouse_core::{Bounds, Point2};

/// Drawing layer a primitive belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Layer {
    /// Panel outlines and cut-outs
    Cut,
    /// Panel identity labels
    Label,
    /// Sheet border
    Sheet,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Cut, Layer::Label, Layer::Sheet];

    pub fn name(self) -> &'static str {
        match self {
            Self::Cut => "CUT",
            Self::Label => "LABEL",
            Self::Sheet => "SHEET",
        }
    }
}

/// Closed polygon on the cut layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    /// Label of the panel the polygon belongs to
    pub panel: String,
    pub points: Vec<Point2>,
    /// True for cut-outs inside a panel
    pub inner: bool,
}

/// Text on the label layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub position: Point2,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetDrawing {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub polygons: Vec<Polygon>,
    pub labels: Vec<Label>,
}

impl SheetDrawing {
    pub fn border(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Drawing {
    pub sheets: Vec<SheetDrawing>,
}

impl Drawing {
    /// Transcribe a layout into drawing primitives
    pub fn from_layout(layout: &Layout) -> Self {
        let sheets = layout
            .sheets
            .iter()
            .map(|sheet| {
                let mut polygons = Vec::new();
                let mut labels = Vec::with_capacity(sheet.placements.len());
                for placement in &sheet.placements {
                    polygons.push(Polygon {
                        panel: placement.label.clone(),
                        points: placement.outline.clone(),
                        inner: false,
                    });
                    polygons.extend(placement.inner_loops.iter().map(|points| Polygon {
                        panel: placement.label.clone(),
                        points: points.clone(),
                        inner: true,
                    }));
                    labels.push(Label {
                        text: placement.label.clone(),
                        position: placement.label_anchor,
                        height: layout.font_height,
                    });
                }
                SheetDrawing {
                    index: sheet.index,
                    width: sheet.width,
                    height: sheet.height,
                    polygons,
                    labels,
                }
            })
            .collect();
        Self { sheets }
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutEngine;
    use crate::panel::Panel;
    use nalgebra::Matrix4;
    use wikihouse_core::Length;
    use wikihouse_settings::Settings;

    fn slotted_panel() -> Panel {
        Panel {
            label: "A".to_string(),
            outline: vec![
                Point2::new(0.0, 0.0),
                Point2::new(20.0, 0.0),
                Point2::new(20.0, 10.0),
                Point2::new(0.0, 10.0),
            ],
            inner_loops: vec![vec![
                Point2::new(2.0, 2.0),
                Point2::new(2.0, 4.0),
                Point2::new(4.0, 4.0),
                Point2::new(4.0, 2.0),
            ]],
            thickness: Length::from_mm(18.0),
            transform: Matrix4::identity(),
            tag: None,
            source: "slotted".to_string(),
        }
    }

    #[test]
    fn test_from_layout_transcribes_placements() {
        let layout = LayoutEngine::new(&Settings::default())
            .layout(&[slotted_panel()])
            .unwrap();
        let drawing = Drawing::from_layout(&layout);

        assert_eq!(drawing.sheets.len(), 1);
        let sheet = &drawing.sheets[0];
        assert_eq!(sheet.polygons.len(), 2);
        assert!(!sheet.polygons[0].inner);
        assert!(sheet.polygons[1].inner);
        assert_eq!(sheet.polygons[0].points, layout.sheets[0].placements[0].outline);
        assert_eq!(sheet.labels[0].text, "A");
        assert_eq!(sheet.labels[0].position, layout.sheets[0].placements[0].label_anchor);
        assert!((Length::from_inches(sheet.labels[0].height).to_mm() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_layout() {
        let layout = LayoutEngine::new(&Settings::default()).layout(&[]).unwrap();
        assert!(Drawing::from_layout(&layout).is_empty());
    }
}
