//! Model entity tree
//!
//! The host modeller exports its selection as a tree of groups and faces.
//! Coordinates and thicknesses are in inches, the modeller's native unit.
//!
//! ```json
//! {
//!   "title": "Skylark 200",
//!   "entities": [
//!     { "type": "group", "name": "wall-1", "transform": [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,0,1],
//!       "children": [
//!         { "type": "face", "name": "stud", "thickness": 0.708661,
//!           "outline": [[0,0,0], [10,0,0], [10,40,0], [0,40,0]] }
//!       ] }
//!   ]
//! }
//! ```

use crate::error::{FabricationError, FabricationResult};
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wikihouse_core::Length;

/// Column-major 4x4 identity
pub const IDENTITY_TRANSFORM: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

fn identity_transform() -> [f64; 16] {
    IDENTITY_TRANSFORM
}

/// A node of the model tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelEntity {
    Face(Face),
    Group(Group),
}

impl ModelEntity {
    pub fn name(&self) -> &str {
        match self {
            Self::Face(face) => &face.name,
            Self::Group(group) => &group.name,
        }
    }

    /// Path segment for the entity at `index` of `siblings`
    ///
    /// Unnamed entities are numbered by kind (`face-3`). A name shared with
    /// another sibling gets its 1-based position appended (`stud[2]`) so every
    /// path names exactly one entity.
    pub(crate) fn path_segment(siblings: &[ModelEntity], index: usize) -> String {
        let position = index + 1;
        match &siblings[index] {
            Self::Face(face) if face.name.is_empty() => format!("face-{position}"),
            Self::Group(group) if group.name.is_empty() => format!("group-{position}"),
            entity => {
                let name = entity.name();
                if siblings.iter().filter(|e| e.name() == name).count() > 1 {
                    format!("{name}[{position}]")
                } else {
                    name.to_string()
                }
            }
        }
    }
}

/// A flat face of a fixed-thickness part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    #[serde(default)]
    pub name: String,
    /// Closed outer loop in the parent's coordinate space
    pub outline: Vec<[f64; 3]>,
    /// Cut-outs lying inside the outline
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inner_loops: Vec<Vec<[f64; 3]>>,
    /// Material thickness of the part
    pub thickness: Length,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Face {
    pub fn new(name: impl Into<String>, outline: Vec<[f64; 3]>, thickness: Length) -> Self {
        Self {
            name: name.into(),
            outline,
            inner_loops: Vec::new(),
            thickness,
            tag: None,
        }
    }

    pub fn with_inner_loop(mut self, inner: Vec<[f64; 3]>) -> Self {
        self.inner_loops.push(inner);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// A transformed container of entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub name: String,
    /// Column-major 4x4 matrix mapping children into the parent's space
    #[serde(default = "identity_transform")]
    pub transform: [f64; 16],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub children: Vec<ModelEntity>,
}

impl Group {
    pub fn new(name: impl Into<String>, children: Vec<ModelEntity>) -> Self {
        Self {
            name: name.into(),
            transform: IDENTITY_TRANSFORM,
            tag: None,
            children,
        }
    }

    pub fn with_transform(mut self, transform: Matrix4<f64>) -> Self {
        self.transform.copy_from_slice(transform.as_slice());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn matrix(&self) -> Matrix4<f64> {
        Matrix4::from_column_slice(&self.transform)
    }
}

/// An exported model: a title and its top-level entities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub title: String,
    pub entities: Vec<ModelEntity>,
}

impl ModelDocument {
    pub fn from_json(json: &str) -> FabricationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> FabricationResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| FabricationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

pub(crate) fn to_point(p: &[f64; 3]) -> Point3<f64> {
    Point3::new(p[0], p[1], p[2])
}
