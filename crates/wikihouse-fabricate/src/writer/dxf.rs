//! DXF output
//!
//! DXF R12 built with the `dxf` crate, readable by every CAM package in use at
//! fabrication shops. Sheets are placed side by side as [`sheet_offsets`]
//! arranges them. R12 has no units header variable; coordinates are
//! millimetres at a fixed 25.4 per inch.

use super::{extent_mm, sheet_offsets, to_mm, validate, OutputFormat, Writer};
use crate::drawing::{Drawing, Layer, SheetDrawing};
use crate::error::WriterResult;
use chrono::{DateTime, Local, Utc};
use dxf::entities::{Entity, EntityType, Polyline, Text, Vertex};
use dxf::enums::AcadVersion;
use dxf::{Color, Point};
use wikihouse_core::Point2;

/// AutoCAD colour index for a layer
fn layer_color(layer: Layer) -> u8 {
    match layer {
        Layer::Cut => 1,
        Layer::Label => 5,
        Layer::Sheet => 8,
    }
}

/// Writes drawings as DXF R12
#[derive(Debug, Clone, Default)]
pub struct DxfWriter;

impl DxfWriter {
    pub fn new() -> Self {
        Self
    }

    /// The `dxf` document for `drawing`, before serialisation
    pub fn build(&self, drawing: &Drawing) -> WriterResult<dxf::Drawing> {
        validate(drawing)?;

        let mut doc = dxf::Drawing::new();
        doc.header.version = AcadVersion::R12;

        // Fixed stamps keep the output byte-identical between runs
        let stamp: DateTime<Local> = DateTime::<Utc>::default().with_timezone(&Local);
        doc.header.creation_date = stamp;
        doc.header.update_date = stamp;

        let (width, height) = extent_mm(drawing);
        doc.header.minimum_drawing_extents = Point::origin();
        doc.header.maximum_drawing_extents = Point::new(width, height, 0.0);

        for layer in Layer::ALL {
            doc.add_layer(dxf::tables::Layer {
                name: layer.name().to_string(),
                color: Color::from_index(layer_color(layer)),
                ..Default::default()
            });
        }

        for (sheet, offset) in drawing.sheets.iter().zip(sheet_offsets(drawing)) {
            add_sheet(&mut doc, sheet, offset);
        }

        Ok(doc)
    }
}

impl Writer for DxfWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Dxf
    }

    fn write(&self, drawing: &Drawing) -> WriterResult<Vec<u8>> {
        let doc = self.build(drawing)?;
        let mut buf = Vec::new();
        doc.save(&mut buf)?;
        Ok(buf)
    }
}

fn on_layer(layer: Layer, specific: EntityType) -> Entity {
    let mut entity = Entity::new(specific);
    entity.common.layer = layer.name().to_string();
    entity
}

fn add_polyline(doc: &mut dxf::Drawing, layer: Layer, points: &[Point2], offset: f64) {
    let mut polyline = Polyline::default();
    polyline.set_is_closed(true);
    for p in points {
        let location = Point::new(offset + to_mm(p.x), to_mm(p.y), 0.0);
        polyline.add_vertex(doc, Vertex::new(location));
    }
    doc.add_entity(on_layer(layer, EntityType::Polyline(polyline)));
}

fn add_sheet(doc: &mut dxf::Drawing, sheet: &SheetDrawing, offset: f64) {
    let border = sheet.border();
    let corners = [
        border.min,
        Point2::new(border.max.x, border.min.y),
        border.max,
        Point2::new(border.min.x, border.max.y),
    ];
    add_polyline(doc, Layer::Sheet, &corners, offset);

    for polygon in &sheet.polygons {
        add_polyline(doc, Layer::Cut, &polygon.points, offset);
    }

    for label in &sheet.labels {
        let text = Text {
            location: Point::new(
                offset + to_mm(label.position.x),
                to_mm(label.position.y),
                0.0,
            ),
            text_height: to_mm(label.height),
            value: label.text.clone(),
            ..Default::default()
        };
        doc.add_entity(on_layer(Layer::Label, EntityType::Text(text)));
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::single_square;
    use super::*;

    fn build(drawing: &Drawing) -> dxf::Drawing {
        DxfWriter::new().build(drawing).unwrap()
    }

    fn polylines<'a>(doc: &'a dxf::Drawing, layer: &'a str) -> Vec<&'a Polyline> {
        doc.entities()
            .filter(|e| e.common.layer == layer)
            .filter_map(|e| match &e.specific {
                EntityType::Polyline(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_header_and_layers() {
        let doc = build(&single_square());
        assert_eq!(doc.header.version, AcadVersion::R12);
        for (name, color) in [("CUT", 1), ("LABEL", 5), ("SHEET", 8)] {
            let layer = doc.layers().find(|l| l.name == name).unwrap();
            assert_eq!(layer.color.index(), Some(color));
        }

        let text = String::from_utf8(DxfWriter::new().write(&single_square()).unwrap()).unwrap();
        assert!(text.contains("AC1009"));
        assert!(!text.contains("$INSUNITS"));
    }

    #[test]
    fn test_polyline_and_text() {
        let doc = build(&single_square());
        assert_eq!(polylines(&doc, "SHEET").len(), 1);

        let cuts = polylines(&doc, "CUT");
        assert_eq!(cuts.len(), 1);
        assert!(cuts[0].is_closed());
        let corner = &cuts[0].vertices().nth(1).unwrap().location;
        assert!((corner.x - 115.0).abs() < 1e-6);
        assert!((corner.y - 15.0).abs() < 1e-6);

        let texts: Vec<&Text> = doc
            .entities()
            .filter_map(|e| match &e.specific {
                EntityType::Text(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].value, "A");
        assert!((texts[0].text_height - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_second_sheet_offset_along_x() {
        let mut drawing = single_square();
        let mut second = drawing.sheets[0].clone();
        second.index = 1;
        drawing.sheets.push(second);

        let doc = build(&drawing);
        let cuts = polylines(&doc, "CUT");
        assert_eq!(cuts.len(), 2);
        // 2400 mm sheet + 100 mm gap + 15 mm
        let first = &cuts[1].vertices().next().unwrap().location;
        assert!((first.x - 2515.0).abs() < 1e-6);
        assert!((doc.header.maximum_drawing_extents.x - 4900.0).abs() < 1e-6);
    }
}
