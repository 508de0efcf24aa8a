//! Primitives and the refinement protocol.
//!
//! A primitive either draws as is (terminal) or refines into simpler
//! primitives handed to a [`Refiner`]:
//!
//! - [`PointMesh`], [`CurveMesh`] - always terminal
//! - [`PolygonMesh`] - splits while it has more faces than `max_poly_mesh_size`
//! - [`Quadric`] - tessellates into a polygon mesh
//! - [`QuadricMesh`] - one quadric per element
//! - [`Instance`] - one placed copy of its source per transform
//! - [`Collection`] - its children
//!
//! [`refine_to_fixed_point`] drives refinement until only terminal
//! primitives are left.

mod mesh;
mod quadric;
mod instance;
mod refiner;
mod refine;

pub use mesh::*;
pub use quadric::*;
pub use instance::*;
pub use refiner::*;
pub use refine::*;

use std::sync::Arc;

use crate::array::{harden, DataArray, DataArrayExt, DataArrayHandle};
use crate::attrib::{AttributeList, AttributeListHandle, Owner};
use crate::parms::{RefineParms, ViewportLod};
use crate::util::{BBox3f, Mat4, Vec3};

pub type PrimitiveHandle = Arc<Primitive>;

/// Attribute lists of a primitive, one per owner class.
#[derive(Clone, Debug, Default)]
pub struct AttributeSet {
    pub vertex: Option<AttributeListHandle>,
    pub point: Option<AttributeListHandle>,
    pub uniform: Option<AttributeListHandle>,
    pub detail: Option<AttributeListHandle>,
}

impl AttributeSet {
    /// Lookup order of [`find`](Self::find).
    pub const OWNERS: [Owner; 4] = [Owner::Vertex, Owner::Point, Owner::Primitive, Owner::Detail];

    pub fn get(&self, owner: Owner) -> Option<&AttributeListHandle> {
        match owner {
            Owner::Vertex => self.vertex.as_ref(),
            Owner::Point => self.point.as_ref(),
            Owner::Primitive => self.uniform.as_ref(),
            Owner::Detail => self.detail.as_ref(),
            Owner::Invalid => None,
        }
    }

    fn slot_mut(&mut self, owner: Owner) -> Option<&mut Option<AttributeListHandle>> {
        match owner {
            Owner::Vertex => Some(&mut self.vertex),
            Owner::Point => Some(&mut self.point),
            Owner::Primitive => Some(&mut self.uniform),
            Owner::Detail => Some(&mut self.detail),
            Owner::Invalid => None,
        }
    }

    /// Entries of the arrays of one owner class, 0 without a list.
    pub fn entries(&self, owner: Owner) -> usize {
        self.get(owner)
            .and_then(|l| l.array_entries())
            .unwrap_or(0)
    }

    /// First array named `name`, searching vertex, point, uniform, detail.
    pub fn find(&self, name: &str) -> Option<(Owner, &DataArrayHandle)> {
        Self::OWNERS
            .iter()
            .find_map(|&owner| Some((owner, self.get(owner)?.find(name)?)))
    }

    /// Most motion segments of any list.
    pub fn motion_segments(&self) -> usize {
        Self::OWNERS
            .iter()
            .filter_map(|&o| self.get(o))
            .map(|l| l.segments())
            .max()
            .unwrap_or(1)
    }

    pub fn harden(&self) -> AttributeSet {
        let h = |l: &Option<AttributeListHandle>| l.as_ref().map(|l| Arc::new(l.harden_all_arrays()));
        AttributeSet {
            vertex: h(&self.vertex),
            point: h(&self.point),
            uniform: h(&self.uniform),
            detail: h(&self.detail),
        }
    }

    /// Detail attributes with `overrides` taking priority.
    pub fn with_detail_override(&self, overrides: &AttributeList) -> AttributeSet {
        let detail = match &self.detail {
            Some(detail) => overrides.merge(detail),
            None => overrides.clone(),
        };
        AttributeSet {
            detail: Some(Arc::new(detail)),
            ..self.clone()
        }
    }

    /// Copy `names` from `src`, keeping each one's owner class.
    ///
    /// Returns `None` if none of the names exist in `src`.
    pub fn copy_named(&self, src: &AttributeSet, names: &[&str]) -> Option<AttributeSet> {
        let mut out = self.clone();
        let mut copied = 0;
        for name in names {
            let Some((owner, array)) = src.find(name) else {
                continue;
            };
            if let Some(slot) = out.slot_mut(owner) {
                let list = match slot.as_deref() {
                    Some(list) => list.add_attribute(name, Arc::clone(array), true),
                    None => AttributeList::from_arrays([(*name, Arc::clone(array))]),
                };
                *slot = Some(Arc::new(list));
                copied += 1;
            }
        }
        (copied > 0).then_some(out)
    }

    /// Bounds of the `P` attribute.
    pub fn position_bounds(&self) -> BBox3f {
        let mut bounds = BBox3f::EMPTY;
        let Some((_, p)) = self.find("P") else {
            return bounds;
        };
        if p.tuple_size() < 3 || !p.storage().is_numeric() {
            return bounds;
        }
        for i in 0..p.entries() {
            bounds.expand_by_point(Vec3::new(p.get_f32(i, 0), p.get_f32(i, 1), p.get_f32(i, 2)));
        }
        bounds
    }
}

/// Ordering that strictly decreases across a refinement step.
///
/// `rank` orders primitive kinds (points below curves and polygons below
/// quadrics below their containers); `elements` breaks ties within a rank,
/// so a polygon mesh split into pieces still decreases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Complexity {
    pub rank: u32,
    pub elements: usize,
}

/// A renderable or refinable geometric entity.
#[derive(Clone, Debug)]
pub enum Primitive {
    PointMesh(PointMesh),
    CurveMesh(CurveMesh),
    PolygonMesh(PolygonMesh),
    Quadric(Quadric),
    QuadricMesh(QuadricMesh),
    Instance(Instance),
    Collection(Collection),
}

impl Primitive {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::PointMesh(_) => "point_mesh",
            Self::CurveMesh(_) => "curve_mesh",
            Self::PolygonMesh(_) => "polygon_mesh",
            Self::Quadric(_) => "quadric",
            Self::QuadricMesh(_) => "quadric_mesh",
            Self::Instance(_) => "instance",
            Self::Collection(_) => "collection",
        }
    }

    fn parts(&self) -> (&AttributeSet, &Mat4) {
        match self {
            Self::PointMesh(p) => (&p.attrs, &p.transform),
            Self::CurveMesh(p) => (&p.attrs, &p.transform),
            Self::PolygonMesh(p) => (&p.attrs, &p.transform),
            Self::Quadric(p) => (&p.attrs, &p.transform),
            Self::QuadricMesh(p) => (&p.attrs, &p.transform),
            Self::Instance(p) => (&p.attrs, &p.transform),
            Self::Collection(p) => (&p.attrs, &p.transform),
        }
    }

    fn parts_mut(&mut self) -> (&mut AttributeSet, &mut Mat4) {
        match self {
            Self::PointMesh(p) => (&mut p.attrs, &mut p.transform),
            Self::CurveMesh(p) => (&mut p.attrs, &mut p.transform),
            Self::PolygonMesh(p) => (&mut p.attrs, &mut p.transform),
            Self::Quadric(p) => (&mut p.attrs, &mut p.transform),
            Self::QuadricMesh(p) => (&mut p.attrs, &mut p.transform),
            Self::Instance(p) => (&mut p.attrs, &mut p.transform),
            Self::Collection(p) => (&mut p.attrs, &mut p.transform),
        }
    }

    pub fn attributes(&self) -> &AttributeSet {
        self.parts().0
    }

    /// Object-to-parent transform.
    pub fn transform(&self) -> Mat4 {
        *self.parts().1
    }

    /// A copy with its transform replaced.
    pub fn with_transform(&self, transform: Mat4) -> Primitive {
        let mut out = self.clone();
        *out.parts_mut().1 = transform;
        out
    }

    /// A copy whose detail attributes are overridden by `overrides`.
    pub fn with_detail_override(&self, overrides: &AttributeList) -> Primitive {
        let mut out = self.clone();
        let attrs = out.parts_mut().0;
        *attrs = attrs.with_detail_override(overrides);
        out
    }

    /// First attribute called `name` on any owner class.
    pub fn find_attribute(&self, name: &str) -> Option<(Owner, &DataArrayHandle)> {
        self.attributes().find(name)
    }

    pub fn motion_segments(&self) -> usize {
        let own = self.attributes().motion_segments();
        match self {
            Self::Instance(i) => own.max(i.source.motion_segments()),
            Self::Collection(c) => c
                .children
                .iter()
                .map(|p| p.motion_segments())
                .fold(own, usize::max),
            _ => own,
        }
    }

    pub fn complexity(&self) -> Complexity {
        let (rank, elements) = match self {
            Self::PointMesh(p) => (0, p.point_count()),
            Self::CurveMesh(p) => (1, p.curve_count()),
            Self::PolygonMesh(p) => (1, p.face_count()),
            Self::Quadric(_) => (2, 1),
            Self::QuadricMesh(p) => (3, p.element_count()),
            Self::Instance(i) => (i.source.complexity().rank + 1, i.transforms.len()),
            Self::Collection(c) => (
                c.children
                    .iter()
                    .map(|p| p.complexity().rank + 1)
                    .max()
                    .unwrap_or(1),
                c.children.len(),
            ),
        };
        Complexity { rank, elements }
    }

    /// Bounds in the parent's space.
    pub fn bounds(&self) -> BBox3f {
        match self {
            Self::PointMesh(p) => p.attrs.position_bounds().transformed(&p.transform),
            Self::CurveMesh(p) => p.attrs.position_bounds().transformed(&p.transform),
            Self::PolygonMesh(p) => p.attrs.position_bounds().transformed(&p.transform),
            Self::Quadric(q) => q.kind.unit_bounds().transformed(&q.transform),
            Self::QuadricMesh(q) => q.bounds(),
            Self::Instance(i) => i.bounds(),
            Self::Collection(c) => c.bounds(),
        }
    }

    /// Add simpler primitives to `refiner`; `false` means terminal.
    pub fn refine(&self, refiner: &mut dyn Refiner, parms: &RefineParms) -> bool {
        let points_only = parms.viewport_lod() == ViewportLod::Points;
        match self {
            Self::PointMesh(_) => false,
            Self::CurveMesh(c) => {
                if !points_only {
                    return false;
                }
                refiner.add_primitive(Arc::new(Self::PointMesh(c.to_point_mesh())));
                true
            }
            Self::PolygonMesh(mesh) => {
                if points_only {
                    refiner.add_primitive(Arc::new(Self::PointMesh(mesh.to_point_mesh())));
                    return true;
                }
                let max = parms.max_poly_mesh_size();
                if mesh.face_count() <= max {
                    return false;
                }
                let mode = parms.faceset_mode();
                for mut piece in mesh.split(max) {
                    piece.apply_faceset_mode(mode);
                    refiner.add_primitive(piece.into_primitive());
                }
                true
            }
            Self::Quadric(q) => q.refine(refiner, parms),
            Self::QuadricMesh(q) => q.refine(refiner, parms),
            Self::Instance(i) => i.refine(refiner, parms),
            Self::Collection(c) => c.refine(refiner, parms),
        }
    }

    /// A copy with every array materialized.
    pub fn harden(&self) -> Primitive {
        let mut out = match self {
            Self::PolygonMesh(p) => Self::PolygonMesh(PolygonMesh {
                vertex_list: harden(&p.vertex_list),
                ..p.clone()
            }),
            Self::QuadricMesh(q) => Self::QuadricMesh(QuadricMesh {
                transforms: harden(&q.transforms),
                ..q.clone()
            }),
            Self::Instance(i) => Self::Instance(Instance {
                source: Arc::new(i.source.harden()),
                ..i.clone()
            }),
            Self::Collection(c) => Self::Collection(Collection {
                children: c.children.iter().map(|p| Arc::new(p.harden())).collect(),
                ..c.clone()
            }),
            other => other.clone(),
        };
        let attrs = out.parts_mut().0;
        *attrs = attrs.harden();
        out
    }
}

/// True when two primitives share element counts on every owner class.
fn topology_matches(a: &Primitive, b: &Primitive) -> bool {
    let same_entries = |owners: &[Owner]| {
        owners
            .iter()
            .all(|&o| a.attributes().entries(o) == b.attributes().entries(o))
    };
    match (a, b) {
        (Primitive::PointMesh(_), Primitive::PointMesh(_)) => same_entries(&[Owner::Point]),
        (Primitive::CurveMesh(x), Primitive::CurveMesh(y)) => x.counts == y.counts,
        (Primitive::PolygonMesh(x), Primitive::PolygonMesh(y)) => {
            x.counts == y.counts
                && x.vertex_list.entries() == y.vertex_list.entries()
                && same_entries(&[Owner::Point])
        }
        _ => false,
    }
}

/// `dest` with the attributes `names` copied from `src`.
///
/// Only meshes of the same kind and topology can exchange attributes;
/// anything else, or a merge that copies nothing, returns `dest` itself.
pub fn attribute_merge(dest: &PrimitiveHandle, src: &Primitive, names: &[&str]) -> PrimitiveHandle {
    if !topology_matches(dest, src) {
        tracing::debug!(
            "attribute merge from {} into {} not supported",
            src.kind_name(),
            dest.kind_name()
        );
        return Arc::clone(dest);
    }
    match dest.attributes().copy_named(src.attributes(), names) {
        Some(attrs) => {
            let mut out = (**dest).clone();
            *out.parts_mut().0 = attrs;
            Arc::new(out)
        }
        None => Arc::clone(dest),
    }
}
