//! Sheet layout
//!
//! Greedy shelf packing. Panels are taken in order and placed left to right
//! along a row; when a panel does not fit the remaining row width a new row
//! starts above the tallest panel of the current one, and when it does not
//! fit the remaining height a new sheet is opened. Every panel keeps
//! `padding` clear on each side, so neighbours end up `2 * padding` apart,
//! and nothing is placed within `margin` of a sheet edge.
//!
//! Sheet coordinates are inches with the origin at the sheet's lower-left
//! corner and Y pointing up.

use crate::error::UnplaceablePanelError;
use crate::panel::Panel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};
use wikihouse_core::{Bounds, Length, Point2};
use wikihouse_settings::Settings;

/// Slack allowed when comparing placements against sheet limits, in inches
pub const LAYOUT_TOLERANCE: f64 = 1e-6;

/// Quarter-turn applied to a panel when it is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rotation {
    None,
    Quarter,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Quarter => 90,
        }
    }
}

/// Whether the engine may turn panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Keep panels as modelled
    None,
    /// Lay panels with their long side along the sheet's X axis
    #[default]
    Auto,
}

impl FromStr for RotationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "auto" | "on" => Ok(Self::Auto),
            other => Err(format!("unknown rotation policy: {other}")),
        }
    }
}

impl fmt::Display for RotationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

/// A panel positioned on a sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// Index into the panel list given to the engine
    pub panel: usize,
    pub label: String,
    pub rotation: Rotation,
    /// Lower-left corner of the unpadded bounding box
    pub origin: Point2,
    pub width: f64,
    pub height: f64,
    /// Outline in sheet coordinates
    pub outline: Vec<Point2>,
    /// Cut-outs in sheet coordinates
    pub inner_loops: Vec<Vec<Point2>>,
    /// Baseline start of the label text
    pub label_anchor: Point2,
}

impl Placement {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.height,
        )
    }
}

/// One stock sheet and the panels placed on it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub placements: Vec<Placement>,
}

impl Sheet {
    fn new(index: usize, geometry: &SheetGeometry) -> Self {
        Self {
            index,
            width: geometry.width,
            height: geometry.height,
            margin: geometry.margin,
            placements: Vec::new(),
        }
    }

    /// Usable area inside the margins
    pub fn inner_bounds(&self) -> Bounds {
        Bounds::new(
            self.margin,
            self.margin,
            self.width - self.margin,
            self.height - self.margin,
        )
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }
}

/// A rule broken by a layout
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutViolation {
    OutsideInnerArea { sheet: usize, label: String },
    Overlap { sheet: usize, first: String, second: String },
}

impl fmt::Display for LayoutViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideInnerArea { sheet, label } => {
                write!(f, "sheet {sheet}: panel {label} extends into the margin")
            }
            Self::Overlap {
                sheet,
                first,
                second,
            } => write!(f, "sheet {sheet}: panels {first} and {second} overlap"),
        }
    }
}

/// Summary figures for a layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutStats {
    pub sheets: usize,
    pub panels: usize,
    /// Panel area over total sheet area, between 0 and 1
    pub utilisation: f64,
}

/// Every sheet needed for a set of panels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub sheets: Vec<Sheet>,
    pub padding: f64,
    pub font_height: f64,
    /// Material area of each panel, by panel index
    #[serde(skip)]
    panel_areas: Vec<f64>,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn placements(&self) -> impl Iterator<Item = (&Sheet, &Placement)> {
        self.sheets
            .iter()
            .flat_map(|sheet| sheet.placements.iter().map(move |p| (sheet, p)))
    }

    /// Check containment in the inner area and pairwise non-overlap of padded footprints
    pub fn verify(&self) -> Result<(), LayoutViolation> {
        for sheet in &self.sheets {
            let inner = sheet.inner_bounds();
            let padded: Vec<Bounds> = sheet
                .placements
                .iter()
                .map(|p| p.bounds().inflate(self.padding))
                .collect();

            for (placement, footprint) in sheet.placements.iter().zip(&padded) {
                if !inner.contains(footprint, LAYOUT_TOLERANCE) {
                    return Err(LayoutViolation::OutsideInnerArea {
                        sheet: sheet.index,
                        label: placement.label.clone(),
                    });
                }
            }

            for (i, a) in padded.iter().enumerate() {
                for (j, b) in padded.iter().enumerate().skip(i + 1) {
                    if a.overlaps(b, LAYOUT_TOLERANCE) {
                        return Err(LayoutViolation::Overlap {
                            sheet: sheet.index,
                            first: sheet.placements[i].label.clone(),
                            second: sheet.placements[j].label.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> LayoutStats {
        let sheet_area: f64 = self.sheets.iter().map(|s| s.width * s.height).sum();
        let panel_area: f64 = self.panel_areas.iter().sum();
        LayoutStats {
            sheets: self.sheets.len(),
            panels: self.placements().count(),
            utilisation: if sheet_area > 0.0 {
                panel_area / sheet_area
            } else {
                0.0
            },
        }
    }
}

/// Sheet settings in inches
#[derive(Debug, Clone, Copy)]
struct SheetGeometry {
    width: f64,
    height: f64,
    margin: f64,
    padding: f64,
    font_height: f64,
}

impl SheetGeometry {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            width: settings.sheet_width().inches(),
            height: settings.sheet_height().inches(),
            margin: settings.margin().inches(),
            padding: settings.padding().inches(),
            font_height: settings.font_height().inches(),
        }
    }

    fn inner_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    fn inner_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }

    /// True when a `w x h` panel plus padding fits inside the margins
    fn fits(&self, w: f64, h: f64) -> bool {
        w + 2.0 * self.padding <= self.inner_width() + LAYOUT_TOLERANCE
            && h + 2.0 * self.padding <= self.inner_height() + LAYOUT_TOLERANCE
    }
}

/// Insertion point for the next padded footprint
#[derive(Debug)]
struct LayoutCursor {
    x: f64,
    y: f64,
    row_height: f64,
    origin: f64,
}

impl LayoutCursor {
    fn new(origin: f64) -> Self {
        Self {
            x: origin,
            y: origin,
            row_height: 0.0,
            origin,
        }
    }

    fn place(&mut self, width: f64, height: f64) -> (f64, f64) {
        let position = (self.x, self.y);
        self.x += width;
        self.row_height = self.row_height.max(height);
        position
    }

    fn next_row(&mut self) {
        self.y += self.row_height;
        self.x = self.origin;
        self.row_height = 0.0;
    }

    fn reset(&mut self) {
        *self = Self::new(self.origin);
    }
}

/// Shelf-packing layout engine
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    geometry: SheetGeometry,
    rotation: RotationPolicy,
}

impl LayoutEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            geometry: SheetGeometry::from_settings(settings),
            rotation: RotationPolicy::default(),
        }
    }

    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    /// Place every panel, opening sheets as needed
    pub fn layout(&self, panels: &[Panel]) -> Result<Layout, UnplaceablePanelError> {
        let g = self.geometry;
        let pad = g.padding;
        let right = g.width - g.margin;
        let top = g.height - g.margin;

        let mut sheets: Vec<Sheet> = Vec::new();
        let mut cursor = LayoutCursor::new(g.margin);

        for (index, panel) in panels.iter().enumerate() {
            let (w, h) = (panel.width(), panel.height());
            let rotation = self.orientation(panel, w, h)?;
            let (pw, ph) = match rotation {
                Rotation::None => (w, h),
                Rotation::Quarter => (h, w),
            };
            let (fw, fh) = (pw + 2.0 * pad, ph + 2.0 * pad);

            if sheets.is_empty() {
                sheets.push(Sheet::new(0, &g));
            }
            if cursor.x + fw > right + LAYOUT_TOLERANCE {
                cursor.next_row();
            }
            if cursor.y + fh > top + LAYOUT_TOLERANCE {
                sheets.push(Sheet::new(sheets.len(), &g));
                cursor.reset();
            }

            let (x, y) = cursor.place(fw, fh);
            let origin = Point2::new(x + pad, y + pad);
            let placement = place_panel(index, panel, rotation, origin, pw, ph, g.font_height);
            debug!(
                label = %placement.label,
                sheet = sheets.len() - 1,
                x = origin.x,
                y = origin.y,
                rotation = rotation.degrees(),
                "Placed panel"
            );
            if let Some(sheet) = sheets.last_mut() {
                sheet.placements.push(placement);
            }
        }

        let layout = Layout {
            sheets,
            padding: pad,
            font_height: g.font_height,
            panel_areas: panels.iter().map(Panel::area).collect(),
        };
        debug_assert!(layout.verify().is_ok(), "layout violates sheet limits");
        info!(
            panels = panels.len(),
            sheets = layout.sheets.len(),
            "Layout complete"
        );
        Ok(layout)
    }

    fn orientation(
        &self,
        panel: &Panel,
        w: f64,
        h: f64,
    ) -> Result<Rotation, UnplaceablePanelError> {
        let g = &self.geometry;
        let candidates: &[Rotation] = match self.rotation {
            RotationPolicy::None => &[Rotation::None],
            RotationPolicy::Auto if h > w => &[Rotation::Quarter, Rotation::None],
            RotationPolicy::Auto => &[Rotation::None, Rotation::Quarter],
        };

        candidates
            .iter()
            .copied()
            .find(|r| match r {
                Rotation::None => g.fits(w, h),
                Rotation::Quarter => g.fits(h, w),
            })
            .ok_or_else(|| UnplaceablePanelError {
                label: panel.label.clone(),
                width: Length::from_inches(w),
                height: Length::from_inches(h),
                inner_width: Length::from_inches(g.inner_width()),
                inner_height: Length::from_inches(g.inner_height()),
            })
    }
}

fn place_panel(
    index: usize,
    panel: &Panel,
    rotation: Rotation,
    origin: Point2,
    width: f64,
    height: f64,
    font_height: f64,
) -> Placement {
    let local_height = panel.height();
    let transform = |p: &Point2| -> Point2 {
        let p = match rotation {
            Rotation::None => *p,
            Rotation::Quarter => p.rotate_quarter().translate(local_height, 0.0),
        };
        p.translate(origin.x, origin.y)
    };

    Placement {
        panel: index,
        label: panel.label.clone(),
        rotation,
        origin,
        width,
        height,
        outline: panel.outline.iter().map(transform).collect(),
        inner_loops: panel
            .inner_loops
            .iter()
            .map(|l| l.iter().map(transform).collect())
            .collect(),
        label_anchor: origin.translate(font_height / 2.0, font_height / 2.0),
    }
}
