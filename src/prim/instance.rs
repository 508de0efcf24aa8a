//! Primitives that refine into other primitives: instances and collections.

use std::sync::Arc;

use rayon::prelude::*;

use super::{AttributeSet, Primitive, PrimitiveHandle, Refiner};
use crate::attrib::{AttributeList, AttributeListHandle};
use crate::parms::RefineParms;
use crate::util::{BBox3f, Mat4};

/// Copies of one source primitive, one per transform.
///
/// Uniform attributes hold one value per copy and become detail attributes
/// of that copy, overriding the source's own values.
#[derive(Clone, Debug)]
pub struct Instance {
    pub(crate) source: PrimitiveHandle,
    pub(crate) transforms: Vec<Mat4>,
    pub(crate) attrs: AttributeSet,
    pub(crate) transform: Mat4,
}

impl Instance {
    pub fn new(source: PrimitiveHandle, transforms: Vec<Mat4>) -> Self {
        Self {
            source,
            transforms,
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

    pub fn source(&self) -> &PrimitiveHandle {
        &self.source
    }

    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    /// Attribute values for copy `i`, or `None` when copies add nothing.
    fn copy_attributes(&self, i: usize) -> Option<AttributeList> {
        let detail = self.attrs.detail.as_deref();
        match (&self.attrs.uniform, detail) {
            (Some(uniform), _) => Some(
                detail
                    .cloned()
                    .unwrap_or_else(AttributeList::empty)
                    .merge_constant_from(uniform, i),
            ),
            (None, Some(detail)) => Some(detail.clone()),
            (None, None) => None,
        }
    }

    /// Copy `i` of the source, placed and attributed.
    pub fn copy(&self, i: usize) -> Primitive {
        let placed = self.transform * self.transforms[i] * self.source.transform();
        let copy = self.source.with_transform(placed);
        match self.copy_attributes(i) {
            Some(overrides) => copy.with_detail_override(&overrides),
            None => copy,
        }
    }

    pub(crate) fn bounds(&self) -> BBox3f {
        let inner = self.source.bounds();
        let mut bounds = BBox3f::EMPTY;
        for t in &self.transforms {
            bounds.expand_by_box(&inner.transformed(&(self.transform * *t)));
        }
        bounds
    }

    pub(crate) fn refine(&self, refiner: &mut dyn Refiner, _parms: &RefineParms) -> bool {
        if refiner.allow_threading() && self.transforms.len() > 1 {
            let copies: Vec<Primitive> = (0..self.transforms.len())
                .into_par_iter()
                .map(|i| self.copy(i))
                .collect();
            for copy in copies {
                refiner.add_primitive(Arc::new(copy));
            }
        } else {
            for i in 0..self.transforms.len() {
                refiner.add_primitive(Arc::new(self.copy(i)));
            }
        }
        true
    }
}

/// Group of primitives refined together.
#[derive(Clone, Debug, Default)]
pub struct Collection {
    pub(crate) children: Vec<PrimitiveHandle>,
    pub(crate) attrs: AttributeSet,
    pub(crate) transform: Mat4,
}

impl Collection {
    pub fn new(children: Vec<PrimitiveHandle>) -> Self {
        Self {
            children,
            attrs: AttributeSet::default(),
            transform: Mat4::IDENTITY,
        }
    }

    pub fn push(&mut self, child: PrimitiveHandle) {
        self.children.push(child);
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn children(&self) -> &[PrimitiveHandle] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child `i` with the collection's transform and detail applied.
    fn placed_child(&self, i: usize) -> PrimitiveHandle {
        let child = &self.children[i];
        let identity = self.transform == Mat4::IDENTITY;
        match (&self.attrs.detail, identity) {
            (None, true) => Arc::clone(child),
            (detail, _) => {
                let mut placed = child.with_transform(self.transform * child.transform());
                if let Some(detail) = detail {
                    placed = placed.with_detail_override(detail);
                }
                Arc::new(placed)
            }
        }
    }

    pub(crate) fn bounds(&self) -> BBox3f {
        let mut bounds = BBox3f::EMPTY;
        for child in &self.children {
            bounds.expand_by_box(&child.bounds());
        }
        bounds.transformed(&self.transform)
    }

    pub(crate) fn refine(&self, refiner: &mut dyn Refiner, _parms: &RefineParms) -> bool {
        for i in 0..self.children.len() {
            refiner.add_primitive(self.placed_child(i));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{DataArrayExt, DataArrayHandle, NumericArray};
    use crate::prim::{CollectRefiner, Quadric, QuadricKind};
    use crate::util::Vec3;

    fn sphere() -> PrimitiveHandle {
        Arc::new(Primitive::Quadric(Quadric::new(QuadricKind::Sphere, Mat4::IDENTITY)))
    }

    #[test]
    fn test_instance_copies() {
        let ids: DataArrayHandle = Arc::new(NumericArray::new(vec![3i32, 4, 5], 1));
        let inst = Instance::new(
            sphere(),
            (0..3).map(|i| Mat4::from_translation(Vec3::X * i as f32)).collect(),
        )
        .with_uniform(Arc::new(AttributeList::from_arrays([("id", ids)])));
        let copy = inst.copy(2);
        assert_eq!(copy.transform().w_axis.x, 2.0);
        let (_, id) = copy.find_attribute("id").unwrap();
        assert_eq!(id.get_i32(0, 0), 5);
        assert_eq!(inst.bounds().max.x, 3.0);

        let mut refiner = CollectRefiner::new(false);
        assert!(inst.refine(&mut refiner, &RefineParms::new()));
        assert_eq!(refiner.len(), 3);
    }

    #[test]
    fn test_collection_children() {
        let group = Collection::new(vec![sphere(), sphere()])
            .with_transform(Mat4::from_translation(Vec3::Y));
        assert_eq!(group.bounds().max.y, 2.0);
        let mut refiner = CollectRefiner::new(false);
        assert!(group.refine(&mut refiner, &RefineParms::new()));
        let children = refiner.into_primitives();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].transform().w_axis.y, 1.0);
    }

    #[test]
    fn test_untransformed_collection_shares_children() {
        let child = sphere();
        let group = Collection::new(vec![Arc::clone(&child)]);
        assert!(Arc::ptr_eq(&group.placed_child(0), &child));
    }
}
