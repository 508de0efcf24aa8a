//! Terminal mesh primitives: points, curves and polygons.

use std::sync::Arc;

use super::{AttributeSet, Primitive};
use crate::array::{CountArray, DataArray, DataArrayExt, DataArrayHandle, SelectionArray, SubArray};
use crate::attrib::{AttributeListHandle, Owner};
use crate::parms::FacesetMode;
use crate::util::Mat4;

/// Unconnected points.
#[derive(Clone, Debug)]
pub struct PointMesh {
    pub(crate) attrs: AttributeSet,
    pub(crate) transform: Mat4,
}

impl PointMesh {
    pub fn new(points: AttributeListHandle, detail: Option<AttributeListHandle>) -> Self {
        Self {
            attrs: AttributeSet {
                point: Some(points),
                detail,
                ..Default::default()
            },
            transform: Mat4::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn point_count(&self) -> usize {
        self.attrs.entries(Owner::Point)
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attrs
    }
}

/// Curves with a variable number of vertices each.
#[derive(Clone, Debug)]
pub struct CurveMesh {
    pub(crate) counts: CountArray,
    pub(crate) periodic: bool,
    pub(crate) attrs: AttributeSet,
    pub(crate) transform: Mat4,
}

impl CurveMesh {
    /// `counts` holds the vertices of each curve; `vertex` has one entry per
    /// curve vertex.
    pub fn new(counts: CountArray, vertex: AttributeListHandle) -> Self {
        Self {
            counts,
            periodic: false,
            attrs: AttributeSet {
                vertex: Some(vertex),
                ..Default::default()
            },
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

    /// Closed curves wrap their last vertex back to the first.
    pub fn periodic(mut self, periodic: bool) -> Self {
        self.periodic = periodic;
        self
    }

    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    pub fn curve_count(&self) -> usize {
        self.counts.entries()
    }

    pub fn counts(&self) -> &CountArray {
        &self.counts
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attrs
    }

    /// The curve vertices as a point cloud.
    pub fn to_point_mesh(&self) -> PointMesh {
        PointMesh {
            attrs: AttributeSet {
                point: self.attrs.vertex.clone(),
                detail: self.attrs.detail.clone(),
                ..Default::default()
            },
            transform: self.transform,
        }
    }
}

/// Named group of faces.
#[derive(Clone, Debug)]
pub struct FaceSet {
    pub name: String,
    pub faces: Arc<SelectionArray>,
}

impl FaceSet {
    pub fn new(name: impl Into<String>, faces: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            faces: Arc::new(SelectionArray::new(faces)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.faces.entries() == 0
    }

    /// Faces in `start..start + length`, rebased to zero.
    fn slice(&self, start: usize, length: usize) -> FaceSet {
        let lo = start as i64;
        let hi = lo + length as i64;
        let faces = self.faces.indices();
        let from = faces.partition_point(|&f| f < lo);
        let to = faces.partition_point(|&f| f < hi);
        FaceSet::new(self.name.clone(), faces[from..to].iter().map(|f| f - lo).collect())
    }
}

/// Polygons indexing into a shared point list.
///
/// `counts` gives the vertices of each face; `vertex_list` maps every face
/// vertex to a point. Vertex attributes follow `vertex_list`, uniform
/// attributes follow the faces.
#[derive(Clone, Debug)]
pub struct PolygonMesh {
    pub(crate) counts: CountArray,
    pub(crate) vertex_list: DataArrayHandle,
    pub(crate) attrs: AttributeSet,
    pub(crate) face_sets: Vec<FaceSet>,
    pub(crate) transform: Mat4,
}

impl PolygonMesh {
    pub fn new(counts: CountArray, vertex_list: DataArrayHandle, points: AttributeListHandle) -> Self {
        debug_assert_eq!(counts.sum_counts() as usize, vertex_list.entries());
        Self {
            counts,
            vertex_list,
            attrs: AttributeSet {
                point: Some(points),
                ..Default::default()
            },
            face_sets: Vec::new(),
            transform: Mat4::IDENTITY,
        }
    }

    pub fn with_vertex(mut self, vertex: AttributeListHandle) -> Self {
        self.attrs.vertex = Some(vertex);
        self
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

    pub fn with_face_set(mut self, face_set: FaceSet) -> Self {
        self.face_sets.push(face_set);
        self
    }

    pub fn face_count(&self) -> usize {
        self.counts.entries()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_list.entries()
    }

    pub fn point_count(&self) -> usize {
        self.attrs.entries(Owner::Point)
    }

    pub fn counts(&self) -> &CountArray {
        &self.counts
    }

    pub fn vertex_list(&self) -> &DataArrayHandle {
        &self.vertex_list
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attrs
    }

    pub fn face_sets(&self) -> &[FaceSet] {
        &self.face_sets
    }

    /// Point indices of one face.
    pub fn face_points(&self, face: usize) -> impl Iterator<Item = i64> + '_ {
        let start = self.counts.offset(face) as usize;
        let count = self.counts.count(face) as usize;
        (start..start + count).map(move |v| self.vertex_list.get_i64(v, 0))
    }

    /// One face set per distinct value of a uniform attribute.
    ///
    /// String attributes name the sets by value; numeric ones by
    /// `<attrib>_<value>`. Unset strings are skipped.
    pub fn face_sets_from_attribute(&self, name: &str) -> Vec<FaceSet> {
        let Some(values) = self.attrs.uniform.as_ref().and_then(|u| u.find(name)) else {
            return Vec::new();
        };
        let mut sets: Vec<(String, Vec<i64>)> = Vec::new();
        for face in 0..self.face_count().min(values.entries()) {
            let key = if values.storage().is_string() {
                match values.get_string(face, 0) {
                    Some(s) => s.to_string(),
                    None => continue,
                }
            } else {
                format!("{}_{}", name, values.scalar(face, 0))
            };
            match sets.iter_mut().find(|(k, _)| *k == key) {
                Some((_, faces)) => faces.push(face as i64),
                None => sets.push((key, vec![face as i64])),
            }
        }
        sets.into_iter().map(|(k, f)| FaceSet::new(k, f)).collect()
    }

    /// Faces `start..start + length` as their own mesh.
    ///
    /// Vertex and uniform attributes are viewed over the range; points and
    /// detail are shared.
    pub fn piece(&self, start: usize, length: usize) -> PolygonMesh {
        let v0 = self.counts.offset(start) as usize;
        let v1 = self.counts.offset(start + length) as usize;
        let mut attrs = self.attrs.clone();
        attrs.vertex = self
            .attrs
            .vertex
            .as_ref()
            .map(|l| Arc::new(l.create_sub_array(v0, v1 - v0)));
        attrs.uniform = self
            .attrs
            .uniform
            .as_ref()
            .map(|l| Arc::new(l.create_sub_array(start, length)));
        PolygonMesh {
            counts: self.counts.slice(start, length),
            vertex_list: Arc::new(SubArray::new(Arc::clone(&self.vertex_list), v0, v1 - v0)),
            attrs,
            face_sets: self.face_sets.iter().map(|fs| fs.slice(start, length)).collect(),
            transform: self.transform,
        }
    }

    /// Consecutive pieces of at most `max_faces` faces.
    pub fn split(&self, max_faces: usize) -> Vec<PolygonMesh> {
        let max_faces = max_faces.max(1);
        let faces = self.face_count();
        (0..faces)
            .step_by(max_faces)
            .map(|start| self.piece(start, max_faces.min(faces - start)))
            .collect()
    }

    pub(crate) fn apply_faceset_mode(&mut self, mode: FacesetMode) {
        match mode {
            FacesetMode::None => self.face_sets.clear(),
            FacesetMode::NonEmpty => self.face_sets.retain(|fs| !fs.is_empty()),
            FacesetMode::All => {}
        }
    }

    /// The mesh points as a point cloud.
    pub fn to_point_mesh(&self) -> PointMesh {
        PointMesh {
            attrs: AttributeSet {
                point: self.attrs.point.clone(),
                detail: self.attrs.detail.clone(),
                ..Default::default()
            },
            transform: self.transform,
        }
    }

    pub(crate) fn into_primitive(self) -> Arc<Primitive> {
        Arc::new(Primitive::PolygonMesh(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{IndexedStringArray, NumericArray};
    use crate::attrib::AttributeList;

    /// A strip of `n` quads over `2n + 2` points.
    fn strip(n: usize) -> PolygonMesh {
        let mut points = Vec::new();
        for i in 0..=n {
            points.push([i as f32, 0.0, 0.0]);
            points.push([i as f32, 1.0, 0.0]);
        }
        let mut list = Vec::new();
        for f in 0..n as i32 {
            list.extend([2 * f, 2 * f + 2, 2 * f + 3, 2 * f + 1]);
        }
        let p: DataArrayHandle = Arc::new(NumericArray::from_tuples(&points));
        let uv: DataArrayHandle = Arc::new(NumericArray::new(vec![0.5f32; n * 8], 2));
        let id: DataArrayHandle = Arc::new(NumericArray::new((0..n as i32).collect(), 1));
        PolygonMesh::new(
            CountArray::uniform(n, 4),
            Arc::new(NumericArray::new(list, 1)),
            Arc::new(AttributeList::from_arrays([("P", p)])),
        )
        .with_vertex(Arc::new(AttributeList::from_arrays([("uv", uv)])))
        .with_uniform(Arc::new(AttributeList::from_arrays([("id", id)])))
    }

    #[test]
    fn test_counts() {
        let mesh = strip(5);
        assert_eq!(mesh.face_count(), 5);
        assert_eq!(mesh.vertex_count(), 20);
        assert_eq!(mesh.point_count(), 12);
        assert_eq!(mesh.face_points(1).collect::<Vec<_>>(), vec![2, 4, 5, 3]);
    }

    #[test]
    fn test_split_pieces() {
        let mesh = strip(5).with_face_set(FaceSet::new("tail", vec![4, 3]));
        let pieces = mesh.split(2);
        assert_eq!(pieces.iter().map(|p| p.face_count()).collect::<Vec<_>>(), vec![2, 2, 1]);
        let last = &pieces[2];
        assert_eq!(last.vertex_count(), 4);
        assert_eq!(last.face_points(0).collect::<Vec<_>>(), vec![8, 10, 11, 9]);
        let ids = last.attributes().find("id").unwrap().1;
        assert_eq!(ids.fill_all::<i32>(), vec![4]);
        assert_eq!(pieces[1].face_sets()[0].faces.indices(), &[1]);
        assert_eq!(last.face_sets()[0].faces.indices(), &[0]);
        assert!(pieces[0].face_sets()[0].is_empty());
    }

    #[test]
    fn test_faceset_mode() {
        let mut piece = strip(3)
            .with_face_set(FaceSet::new("empty", vec![]))
            .with_face_set(FaceSet::new("one", vec![1]));
        piece.apply_faceset_mode(FacesetMode::All);
        assert_eq!(piece.face_sets().len(), 2);
        piece.apply_faceset_mode(FacesetMode::NonEmpty);
        assert_eq!(piece.face_sets().len(), 1);
        piece.apply_faceset_mode(FacesetMode::None);
        assert!(piece.face_sets().is_empty());
    }

    #[test]
    fn test_face_sets_from_attribute() {
        let shaders: DataArrayHandle =
            Arc::new(IndexedStringArray::from_strings(["metal", "wood", "metal"], 1));
        let mesh = strip(3).with_uniform(Arc::new(AttributeList::from_arrays([("shader", shaders)])));
        let sets = mesh.face_sets_from_attribute("shader");
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].name, "metal");
        assert_eq!(sets[0].faces.indices(), &[0, 2]);
        assert!(mesh.face_sets_from_attribute("missing").is_empty());
    }

    #[test]
    fn test_point_views() {
        let mesh = strip(2);
        assert_eq!(mesh.to_point_mesh().point_count(), 6);
        let uv = mesh.attributes().vertex.clone().unwrap();
        let curves = CurveMesh::new(CountArray::new(&[3, 5]), uv);
        assert_eq!(curves.curve_count(), 2);
        assert_eq!(curves.to_point_mesh().point_count(), 8);
    }
}
