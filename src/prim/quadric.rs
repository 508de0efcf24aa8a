//! Implicit quadric surfaces and their tessellation.

use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use rayon::prelude::*;

use super::{AttributeSet, PolygonMesh, Primitive, PrimitiveHandle, Refiner};
use crate::array::{CountArray, DataArray, DataArrayExt, DataArrayHandle, NumericArray};
use crate::attrib::{AttributeList, AttributeListHandle};
use crate::parms::RefineParms;
use crate::util::{mat4_from_slice, BBox3f, Error, Mat4, Result, TypeInfo, Vec3};

/// Elements above which a quadric mesh builds its quadrics in parallel.
const PARALLEL_QUADRICS: usize = 256;

/// Unit shape of a quadric, placed by its transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QuadricKind {
    /// Radius 1 around the origin
    Sphere,
    /// Open tube along Y from -0.5 to 0.5, radius 1 at the bottom and
    /// `taper` at the top
    Tube { taper: f32 },
    /// Radius 1 disc in the XY plane
    Circle,
}

impl QuadricKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Tube { .. } => "tube",
            Self::Circle => "circle",
        }
    }

    /// Bounds of the untransformed shape.
    pub fn unit_bounds(&self) -> BBox3f {
        match *self {
            Self::Sphere => BBox3f::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
            Self::Tube { taper } => {
                let r = taper.abs().max(1.0);
                BBox3f::new(Vec3::new(-r, -0.5, -r), Vec3::new(r, 0.5, r))
            }
            Self::Circle => BBox3f::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0)),
        }
    }

    /// Points and face vertex counts/indices with `divisions` segments around.
    fn tessellate(&self, divisions: usize) -> (Vec<[f32; 3]>, Vec<i64>, Vec<i32>) {
        let n = divisions.max(3);
        let ring = |y: f32, radius: f32| {
            (0..n).map(move |j| {
                let phi = TAU * j as f32 / n as f32;
                [radius * phi.cos(), y, radius * phi.sin()]
            })
        };
        let mut points = Vec::new();
        let mut counts = Vec::new();
        let mut indices = Vec::new();
        match *self {
            Self::Sphere => {
                let rows = (n / 2).max(2);
                points.push([0.0, 1.0, 0.0]);
                for r in 1..rows {
                    let theta = PI * r as f32 / rows as f32;
                    points.extend(ring(theta.cos(), theta.sin()));
                }
                points.push([0.0, -1.0, 0.0]);
                let at = |r: usize, j: usize| (1 + (r - 1) * n + j % n) as i32;
                let bottom = (points.len() - 1) as i32;
                for j in 0..n {
                    counts.push(3);
                    indices.extend([0, at(1, j + 1), at(1, j)]);
                }
                for r in 1..rows - 1 {
                    for j in 0..n {
                        counts.push(4);
                        indices.extend([at(r, j), at(r, j + 1), at(r + 1, j + 1), at(r + 1, j)]);
                    }
                }
                for j in 0..n {
                    counts.push(3);
                    indices.extend([at(rows - 1, j), at(rows - 1, j + 1), bottom]);
                }
            }
            Self::Tube { taper } => {
                points.extend(ring(-0.5, 1.0));
                points.extend(ring(0.5, taper));
                let n32 = n as i32;
                for j in 0..n32 {
                    let k = (j + 1) % n32;
                    counts.push(4);
                    indices.extend([j, k, n32 + k, n32 + j]);
                }
            }
            Self::Circle => {
                points.extend((0..n).map(|j| {
                    let phi = TAU * j as f32 / n as f32;
                    [phi.cos(), phi.sin(), 0.0]
                }));
                counts.push(n as i64);
                indices.extend(0..n as i32);
            }
        }
        (points, counts, indices)
    }
}

/// One implicit surface.
#[derive(Clone, Debug)]
pub struct Quadric {
    pub(crate) kind: QuadricKind,
    pub(crate) attrs: AttributeSet,
    pub(crate) transform: Mat4,
}

impl Quadric {
    pub fn new(kind: QuadricKind, transform: Mat4) -> Self {
        Self {
            kind,
            attrs: AttributeSet::default(),
            transform,
        }
    }

    pub fn with_detail(mut self, detail: AttributeListHandle) -> Self {
        self.attrs.detail = Some(detail);
        self
    }

    pub fn kind(&self) -> QuadricKind {
        self.kind
    }

    /// Polygon approximation with the quadric's detail attributes.
    pub fn to_polygon_mesh(&self, divisions: usize) -> PolygonMesh {
        let (points, counts, indices) = self.kind.tessellate(divisions);
        let p: DataArrayHandle =
            Arc::new(NumericArray::from_tuples(&points).with_type_info(TypeInfo::Point));
        let mut mesh = PolygonMesh::new(
            CountArray::new(&counts),
            Arc::new(NumericArray::new(indices, 1).with_type_info(TypeInfo::Index)),
            Arc::new(AttributeList::from_arrays([("P", p)])),
        )
        .with_transform(self.transform);
        mesh.attrs.detail = self.attrs.detail.clone();
        mesh
    }

    pub(crate) fn refine(&self, refiner: &mut dyn Refiner, parms: &RefineParms) -> bool {
        let mesh = self.to_polygon_mesh(parms.quadric_divisions());
        refiner.add_primitive(mesh.into_primitive());
        true
    }
}

/// Many quadrics of one kind, one per element transform.
///
/// Uniform attributes hold one value per element; each refined quadric gets
/// its element's values as detail attributes, overriding the shared detail.
#[derive(Clone, Debug)]
pub struct QuadricMesh {
    pub(crate) kind: QuadricKind,
    pub(crate) transforms: DataArrayHandle,
    pub(crate) attrs: AttributeSet,
    pub(crate) transform: Mat4,
}

impl QuadricMesh {
    /// `transforms` must hold one 16-component column-major matrix per element.
    pub fn new(kind: QuadricKind, transforms: DataArrayHandle) -> Result<Self> {
        if transforms.tuple_size() != 16 {
            return Err(Error::TupleSizeMismatch {
                expected: 16,
                actual: transforms.tuple_size(),
            });
        }
        if !transforms.storage().is_numeric() {
            return Err(Error::other("quadric transforms must be numeric"));
        }
        Ok(Self {
            kind,
            transforms,
            attrs: AttributeSet::default(),
            transform: Mat4::IDENTITY,
        })
    }

    /// Build from glam matrices.
    pub fn from_matrices(kind: QuadricKind, matrices: &[Mat4]) -> Self {
        let data: Vec<f32> = matrices.iter().flat_map(|m| m.to_cols_array()).collect();
        Self {
            kind,
            transforms: Arc::new(NumericArray::new(data, 16).with_type_info(TypeInfo::Matrix)),
            attrs: AttributeSet::default(),
            transform: Mat4::IDENTITY,
        }
    }

    pub fn with_uniform(mut self, uniform: AttributeListHandle) -> Self {
        self.attrs.uniform = Some(uniform);
        self
    }

    pub fn with_detail(mut self, detail: AttributeListHandle) -> Self {
        self.attrs.detail = Some(detail);
        self
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn kind(&self) -> QuadricKind {
        self.kind
    }

    pub fn element_count(&self) -> usize {
        self.transforms.entries()
    }

    /// Transform of element `i` in the mesh's space.
    pub fn element_transform(&self, i: usize) -> Mat4 {
        let mut m = [0f32; 16];
        self.transforms.import_tuple(i, &mut m[..]);
        mat4_from_slice(&m).unwrap_or(Mat4::IDENTITY)
    }

    /// Quadric for element `i`, placed in the mesh's parent space.
    pub fn element(&self, i: usize) -> Quadric {
        let detail = match &self.attrs.uniform {
            Some(uniform) => {
                let base = self
                    .attrs
                    .detail
                    .as_deref()
                    .cloned()
                    .unwrap_or_else(AttributeList::empty);
                Some(Arc::new(base.merge_constant_from(uniform, i)))
            }
            None => self.attrs.detail.clone(),
        };
        Quadric {
            kind: self.kind,
            attrs: AttributeSet {
                detail,
                ..Default::default()
            },
            transform: self.transform * self.element_transform(i),
        }
    }

    pub(crate) fn bounds(&self) -> BBox3f {
        let unit = self.kind.unit_bounds();
        let mut bounds = BBox3f::EMPTY;
        for i in 0..self.element_count() {
            bounds.expand_by_box(&unit.transformed(&(self.transform * self.element_transform(i))));
        }
        bounds
    }

    pub(crate) fn refine(&self, refiner: &mut dyn Refiner, _parms: &RefineParms) -> bool {
        let n = self.element_count();
        if refiner.allow_threading() && n > PARALLEL_QUADRICS {
            let quadrics: Vec<PrimitiveHandle> = (0..n)
                .into_par_iter()
                .map(|i| Arc::new(Primitive::Quadric(self.element(i))))
                .collect();
            for q in quadrics {
                refiner.add_primitive(q);
            }
        } else {
            for i in 0..n {
                refiner.add_primitive(Arc::new(Primitive::Quadric(self.element(i))));
            }
        }
        true
    }
}
