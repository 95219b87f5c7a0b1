/// Geometry primitives read back from binary STL records
use nalgebra::{Point3, Vector3};

/// One facet: a normal and three vertices in winding order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub normal: Vector3<f32>,
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(normal: Vector3<f32>, v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self {
            normal,
            vertices: [v0, v1, v2],
        }
    }

    /// Build a triangle from the 12 floats of a binary record.
    pub fn from_floats(values: &[f32; 12]) -> Self {
        Self::new(
            Vector3::new(values[0], values[1], values[2]),
            Point3::new(values[3], values[4], values[5]),
            Point3::new(values[6], values[7], values[8]),
            Point3::new(values[9], values[10], values[11]),
        )
    }

    /// The 12 floats in record order: normal, then each vertex.
    pub fn to_floats(&self) -> [f32; 12] {
        let [a, b, c] = self.vertices;
        [
            self.normal.x,
            self.normal.y,
            self.normal.z,
            a.x,
            a.y,
            a.z,
            b.x,
            b.y,
            b.z,
            c.x,
            c.y,
            c.z,
        ]
    }
}

/// Axis-aligned bounds of a set of triangles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Bounds of all vertices, or `None` for an empty mesh.
    pub fn of(triangles: &[Triangle]) -> Option<Self> {
        let mut points = triangles.iter().flat_map(|t| t.vertices.iter());
        let first = *points.next()?;
        Some(points.fold(
            Self {
                min: first,
                max: first,
            },
            |bounds, p| Self {
                min: bounds.min.inf(p),
                max: bounds.max.sup(p),
            },
        ))
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}
