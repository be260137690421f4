use crate::{Aabb, Mat4, Vec3};

/// Plane in `normal . p + d = 0` form; positive half-space is "inside".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }

    #[inline]
    fn normalized(self) -> Plane {
        let len = self.normal.length();
        if len > 0.0 {
            Plane {
                normal: self.normal / len,
                d: self.d / len,
            }
        } else {
            self
        }
    }
}

/// Six-plane view frustum extracted from a combined projection * view matrix
/// (Gribb-Hartmann row combinations, planes normalized).
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    pub fn from_view_proj(vp: &Mat4) -> Frustum {
        // Row i of the column-major matrix.
        let row = |i: usize| -> [f32; 4] {
            [vp.m[i], vp.m[4 + i], vp.m[8 + i], vp.m[12 + i]]
        };
        let r0 = row(0);
        let r1 = row(1);
        let r2 = row(2);
        let r3 = row(3);
        let plane = |a: [f32; 4], b: [f32; 4], sub: bool| -> Plane {
            let s = if sub { -1.0 } else { 1.0 };
            Plane {
                normal: Vec3::new(a[0] * s + b[0], a[1] * s + b[1], a[2] * s + b[2]),
                d: a[3] * s + b[3],
            }
            .normalized()
        };
        Frustum {
            planes: [
                plane(r0, r3, false), // left:   r3 + r0
                plane(r0, r3, true),  // right:  r3 - r0
                plane(r1, r3, false), // bottom: r3 + r1
                plane(r1, r3, true),  // top:    r3 - r1
                plane(r2, r3, false), // near:   r3 + r2
                plane(r2, r3, true),  // far:    r3 - r2
            ],
        }
    }

    /// AABB test: the box is outside iff, for some plane, even its
    /// most-positive-along-normal corner sits behind that plane.
    pub fn contains_bounding_box(&self, bbox: &Aabb) -> bool {
        for pl in &self.planes {
            let corner = Vec3::new(
                if pl.normal.x >= 0.0 { bbox.max.x } else { bbox.min.x },
                if pl.normal.y >= 0.0 { bbox.max.y } else { bbox.min.y },
                if pl.normal.z >= 0.0 { bbox.max.z } else { bbox.min.z },
            );
            if pl.distance(corner) < 0.0 {
                return false;
            }
        }
        true
    }

    /// Per-instance variant with a tolerance margin (in world units).
    pub fn contains_point_with_margin(&self, p: Vec3, margin: f32) -> bool {
        self.planes.iter().all(|pl| pl.distance(p) >= -margin)
    }
}
