use lode_geom::{Aabb, Frustum, Mat4, Vec3};
use proptest::num::f32::NORMAL;
use proptest::prelude::*;

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn bounded_f32() -> impl Strategy<Value = f32> {
    NORMAL.prop_filter("bounded", |v| v.is_finite() && v.abs() <= 1e5)
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (bounded_f32(), bounded_f32(), bounded_f32()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_aabb() -> impl Strategy<Value = Aabb> {
    (arb_vec3(), arb_vec3()).prop_map(|(a, b)| {
        Aabb::new(
            Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        )
    })
}

proptest! {
    #[test]
    fn vec3_add_commutative(a in arb_vec3(), b in arb_vec3()) {
        let ab = a + b;
        let ba = b + a;
        prop_assert!(approx(ab.x, ba.x, 1e-3) && approx(ab.y, ba.y, 1e-3) && approx(ab.z, ba.z, 1e-3));
    }

    #[test]
    fn vec3_dot_symmetric(a in arb_vec3(), b in arb_vec3()) {
        let d1 = a.dot(b);
        let d2 = b.dot(a);
        let scale = d1.abs().max(d2.abs()).max(1.0);
        prop_assert!((d1 - d2).abs() <= 1e-3 * scale);
    }

    #[test]
    fn normalized_has_unit_length(v in arb_vec3()) {
        prop_assume!(v.length() > 1e-3);
        prop_assert!(approx(v.normalized().length(), 1.0, 1e-4));
    }

    #[test]
    fn aabb_center_inside(bbox in arb_aabb()) {
        prop_assert!(bbox.contains_point(bbox.center()));
    }

    #[test]
    fn translation_matrices_commute(a in arb_vec3(), b in arb_vec3()) {
        let ab = Mat4::translation(a).mul(&Mat4::translation(b)).translation_part();
        let ba = Mat4::translation(b).mul(&Mat4::translation(a)).translation_part();
        let tol = 1e-2 * (a.length() + b.length()).max(1.0);
        prop_assert!(approx(ab.x, ba.x, tol) && approx(ab.y, ba.y, tol) && approx(ab.z, ba.z, tol));
    }

    // A point strictly inside an accepted box is itself accepted (with any margin >= 0).
    #[test]
    fn frustum_box_accept_implies_center_accept(
        cx in -40.0f32..40.0,
        cy in -40.0f32..40.0,
        cz in -90.0f32..-2.0,
        half in 0.1f32..2.0,
    ) {
        let proj = Mat4::perspective(70.0, 1.0, 0.1, 100.0);
        let view = Mat4::look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::UP);
        let f = Frustum::from_view_proj(&proj.mul(&view));
        let c = Vec3::new(cx, cy, cz);
        let b = Aabb::new(c - Vec3::new(half, half, half), c + Vec3::new(half, half, half));
        if f.contains_point_with_margin(c, 0.0) {
            prop_assert!(f.contains_bounding_box(&b));
        }
    }
}
