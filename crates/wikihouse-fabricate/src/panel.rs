//! Flattened panels ready for layout

use nalgebra::Matrix4;
use serde::Serialize;
use wikihouse_core::geometry::signed_area;
use wikihouse_core::{Bounds, Length, Point2};

/// One flat, fixed-thickness part cut from a sheet
///
/// The outline winds counter-clockwise, inner loops clockwise, and the outline's
/// bounding box starts at the origin. Coordinates are inches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    /// Identity label, empty until labels are assigned
    pub label: String,
    pub outline: Vec<Point2>,
    pub inner_loops: Vec<Vec<Point2>>,
    pub thickness: Length,
    /// Panel-local plane to model space
    #[serde(skip)]
    pub transform: Matrix4<f64>,
    pub tag: Option<String>,
    /// Slash-separated path of the source face in the model tree
    pub source: String,
}

impl Panel {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.outline).unwrap_or(Bounds::new(0.0, 0.0, 0.0, 0.0))
    }

    pub fn width(&self) -> f64 {
        self.bounds().width()
    }

    pub fn height(&self) -> f64 {
        self.bounds().height()
    }

    /// Material area: outline minus cut-outs
    pub fn area(&self) -> f64 {
        let holes: f64 = self.inner_loops.iter().map(|l| signed_area(l).abs()).sum();
        signed_area(&self.outline).abs() - holes
    }
}
