//! SVG output
//!
//! All sheets go into one document, side by side as arranged by
//! [`sheet_offsets`]. Units are millimetres. Drawing coordinates have Y
//! pointing up, so Y is flipped against the document height on the way out.

use super::{extent_mm, sheet_offsets, to_mm, validate, OutputFormat, Writer};
use crate::drawing::{Drawing, SheetDrawing};
use crate::error::WriterResult;
use std::fmt::Write;
use wikihouse_core::Point2;

const STYLE: &str = ".sheet { fill: none; stroke: #999999; stroke-width: 0.5; }
    .cut { fill: none; stroke: #ff0000; stroke-width: 0.5; }
    .label { fill: #0000ff; font-family: sans-serif; }";

fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Writes drawings as SVG
#[derive(Debug, Clone, Default)]
pub struct SvgWriter;

impl SvgWriter {
    pub fn new() -> Self {
        Self
    }

    /// Standalone document for a single sheet
    pub fn write_sheet(&self, sheet: &SheetDrawing) -> WriterResult<Vec<u8>> {
        let drawing = Drawing {
            sheets: vec![sheet.clone()],
        };
        self.write(&drawing)
    }
}

impl Writer for SvgWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Svg
    }

    fn write(&self, drawing: &Drawing) -> WriterResult<Vec<u8>> {
        validate(drawing)?;

        let (width, height) = extent_mm(drawing);

        let mut out = String::new();
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{width:.3}mm" height="{height:.3}mm" viewBox="0 0 {width:.3} {height:.3}">"#
        )?;
        writeln!(out, "  <style>")?;
        writeln!(out, "    {STYLE}")?;
        writeln!(out, "  </style>")?;

        for (sheet, offset) in drawing.sheets.iter().zip(sheet_offsets(drawing)) {
            write_sheet_group(&mut out, sheet, offset, height)?;
        }

        writeln!(out, "</svg>")?;
        Ok(out.into_bytes())
    }
}

fn write_sheet_group(
    out: &mut String,
    sheet: &SheetDrawing,
    offset: f64,
    page_height: f64,
) -> std::fmt::Result {
    let sheet_height = to_mm(sheet.height);
    let flip = |p: &Point2| (offset + to_mm(p.x), page_height - to_mm(p.y));

    writeln!(out, r#"  <g id="sheet-{}">"#, sheet.index + 1)?;
    writeln!(
        out,
        r#"    <rect class="sheet" x="{offset:.3}" y="{:.3}" width="{:.3}" height="{sheet_height:.3}"/>"#,
        page_height - sheet_height,
        to_mm(sheet.width)
    )?;

    for polygon in &sheet.polygons {
        let mut d = String::new();
        for (i, p) in polygon.points.iter().enumerate() {
            let (x, y) = flip(p);
            let cmd = if i == 0 { "M" } else { " L" };
            write!(d, "{cmd} {x:.3} {y:.3}")?;
        }
        d.push_str(" Z");
        writeln!(
            out,
            r#"    <path class="cut" data-panel="{}" d="{d}"/>"#,
            xml_escape(&polygon.panel)
        )?;
    }

    for label in &sheet.labels {
        let (x, y) = flip(&label.position);
        writeln!(
            out,
            r#"    <text class="label" x="{x:.3}" y="{y:.3}" font-size="{:.3}">{}</text>"#,
            to_mm(label.height),
            xml_escape(&label.text)
        )?;
    }

    writeln!(out, "  </g>")
}
