//! Panel extraction
//!
//! Walks the model tree depth-first and flattens every face into a [`Panel`].
//! Group transforms compose from the root down and a face without a tag
//! inherits the nearest ancestor's tag. Faces that are not flat, closed,
//! simple polygons of the configured sheet thickness are reported rather
//! than dropped silently.

use crate::model::{to_point, Face, ModelEntity};
use crate::panel::Panel;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use tracing::{debug, warn};
use wikihouse_core::geometry::{dedup_loop, is_simple, polygon_contains, signed_area};
use wikihouse_core::{
    Bounds, GeometryError, GeometryErrorKind, GeometryResult, Length, PlaneFrame, Point2, EPSILON,
};
use wikihouse_settings::Settings;

/// Largest vertex distance from the fitted plane, in inches
pub const PLANARITY_TOLERANCE: f64 = 0.01;

/// Allowed difference between face thickness and sheet depth, in inches
pub const THICKNESS_TOLERANCE: f64 = 0.01;

/// Vertices closer than this are merged
const VERTEX_TOLERANCE: f64 = 1e-6;

/// Panels extracted from a model, plus the entities that were rejected
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub panels: Vec<Panel>,
    pub failures: Vec<GeometryError>,
}

impl ExtractionReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// The panels, or the first failure if any entity was rejected
    pub fn into_panels(self) -> Result<Vec<Panel>, GeometryError> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure),
            None => Ok(self.panels),
        }
    }
}

/// Flatten every face of `entities` into panels
pub fn extract_panels(entities: &[ModelEntity], settings: &Settings) -> ExtractionReport {
    let mut walker = Walker {
        sheet_depth: settings.sheet_depth(),
        report: ExtractionReport::default(),
    };
    walker.visit_all(entities, &Matrix4::identity(), None, "");
    debug!(
        panels = walker.report.panels.len(),
        failures = walker.report.failures.len(),
        "Extraction finished"
    );
    walker.report
}

struct Walker {
    sheet_depth: Length,
    report: ExtractionReport,
}

impl Walker {
    fn visit_all(
        &mut self,
        entities: &[ModelEntity],
        transform: &Matrix4<f64>,
        tag: Option<&str>,
        parent: &str,
    ) {
        for (i, entity) in entities.iter().enumerate() {
            let segment = ModelEntity::path_segment(entities, i);
            let path = if parent.is_empty() {
                segment
            } else {
                format!("{parent}/{segment}")
            };

            match entity {
                ModelEntity::Group(group) => {
                    let local = group.matrix();
                    if let Err(kind) = check_transform(&local) {
                        self.reject(path, kind);
                        continue;
                    }
                    let tag = group.tag.as_deref().or(tag);
                    self.visit_all(&group.children, &(transform * local), tag, &path);
                }
                ModelEntity::Face(face) => {
                    let tag = face.tag.as_deref().or(tag);
                    match flatten_face(face, transform, self.sheet_depth) {
                        Ok(mut panel) => {
                            panel.tag = tag.map(str::to_string);
                            panel.source = path;
                            self.report.panels.push(panel);
                        }
                        Err(kind) => self.reject(path, kind),
                    }
                }
            }
        }
    }

    fn reject(&mut self, path: String, kind: GeometryErrorKind) {
        let failure = GeometryError::new(path, kind);
        warn!(%failure, "Entity rejected");
        self.report.failures.push(failure);
    }
}

fn linear_part(m: &Matrix4<f64>) -> Matrix3<f64> {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

fn check_transform(m: &Matrix4<f64>) -> GeometryResult<()> {
    if !m.iter().all(|v| v.is_finite()) {
        return Err(GeometryErrorKind::NonFinite);
    }
    if linear_part(m).determinant().abs() < EPSILON {
        return Err(GeometryErrorKind::SingularTransform);
    }
    Ok(())
}

fn transform_loop(points: &[[f64; 3]], m: &Matrix4<f64>) -> GeometryResult<Vec<Point3<f64>>> {
    let out: Vec<Point3<f64>> = points
        .iter()
        .map(|p| m.transform_point(&to_point(p)))
        .collect();
    if out.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
        return Err(GeometryErrorKind::NonFinite);
    }
    Ok(out)
}

fn distinct_points(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    let mut out: Vec<Point3<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_some_and(|last| (*last - *p).norm() <= VERTEX_TOLERANCE) {
            continue;
        }
        out.push(*p);
    }
    while out.len() > 1 && (out[0] - out[out.len() - 1]).norm() <= VERTEX_TOLERANCE {
        out.pop();
    }
    out
}

/// Thickness of the face once its parent transforms are applied
fn model_thickness(
    face: &Face,
    local: &[Point3<f64>],
    frame: &PlaneFrame,
    m: &Matrix4<f64>,
) -> GeometryResult<Length> {
    let local_normal = PlaneFrame::fit(local)?.normal;
    let mapped: Vector3<f64> = linear_part(m) * local_normal;
    Ok(face.thickness * mapped.dot(&frame.normal).abs())
}

fn project_loop(frame: &PlaneFrame, points: &[Point3<f64>]) -> GeometryResult<Vec<Point2>> {
    let deviation = frame.max_deviation(points);
    if deviation > PLANARITY_TOLERANCE {
        return Err(GeometryErrorKind::NonPlanar {
            deviation: Length::from_inches(deviation),
        });
    }
    let flat: Vec<Point2> = points.iter().map(|p| frame.project(p)).collect();
    let flat = dedup_loop(&flat, VERTEX_TOLERANCE);
    if flat.len() < 3 {
        return Err(GeometryErrorKind::TooFewVertices { count: flat.len() });
    }
    Ok(flat)
}

fn flatten_face(
    face: &Face,
    transform: &Matrix4<f64>,
    sheet_depth: Length,
) -> GeometryResult<Panel> {
    if !face.thickness.is_finite() {
        return Err(GeometryErrorKind::NonFinite);
    }
    let local = distinct_points(&face.outline.iter().map(to_point).collect::<Vec<_>>());
    if local.len() < 3 {
        return Err(GeometryErrorKind::TooFewVertices { count: local.len() });
    }

    let model = distinct_points(&transform_loop(&face.outline, transform)?);
    let frame = PlaneFrame::fit(&model)?;

    let mut outline = project_loop(&frame, &model)?;
    let area = signed_area(&outline);
    if area.abs() < EPSILON {
        return Err(GeometryErrorKind::ZeroArea);
    }
    if !is_simple(&outline) {
        return Err(GeometryErrorKind::SelfIntersecting);
    }
    if area < 0.0 {
        outline.reverse();
    }

    let thickness = model_thickness(face, &local, &frame, transform)?;
    if !thickness.approx_eq(sheet_depth, Length::from_inches(THICKNESS_TOLERANCE)) {
        return Err(GeometryErrorKind::ThicknessMismatch {
            expected: sheet_depth,
            actual: thickness,
        });
    }

    let mut inner_loops = Vec::with_capacity(face.inner_loops.len());
    for (index, inner) in face.inner_loops.iter().enumerate() {
        let mut flat = project_loop(&frame, &transform_loop(inner, transform)?)?;
        if !is_simple(&flat) {
            return Err(GeometryErrorKind::SelfIntersecting);
        }
        if !polygon_contains(&outline, &flat) {
            return Err(GeometryErrorKind::LoopOutsideOutline { index });
        }
        if signed_area(&flat) > 0.0 {
            flat.reverse();
        }
        inner_loops.push(flat);
    }

    let bounds = Bounds::from_points(&outline).ok_or(GeometryErrorKind::ZeroArea)?;
    let (dx, dy) = (-bounds.min.x, -bounds.min.y);
    let outline = outline.into_iter().map(|p| p.translate(dx, dy)).collect();
    let inner_loops = inner_loops
        .into_iter()
        .map(|l: Vec<Point2>| l.into_iter().map(|p| p.translate(dx, dy)).collect())
        .collect();

    let shift = Matrix4::new_translation(&Vector3::new(bounds.min.x, bounds.min.y, 0.0));
    let to_model = frame.local_to_model() * shift;

    Ok(Panel {
        label: String::new(),
        outline,
        inner_loops,
        thickness,
        transform: to_model,
        tag: None,
        source: String::new(),
    })
}
