use lode_geom::Vec3;

/// First occupied cell along a ray: the block itself, the cell the ray came
/// from, and the face normal (negated last step).
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub bx: i32,
    pub by: i32,
    pub bz: i32,
    pub px: i32,
    pub py: i32,
    pub pz: i32,
    pub nx: i32,
    pub ny: i32,
    pub nz: i32,
}

#[inline]
fn inv_or_max(v: f32) -> f32 {
    if v.abs() < 1e-8 { f32::MAX } else { 1.0 / v.abs() }
}

/// Classic voxel DDA: walk cell to cell along the axis with the smallest
/// accumulated boundary distance, up to `max_dist`. `is_solid` answers
/// occupancy in world cells; unloaded chunks should answer false so the ray
/// passes through them.
///
/// Cells are unit cubes centered on their integer coordinates, so cell `b`
/// spans `[b - 0.5, b + 0.5)` on each axis.
pub fn raycast_first_hit_with_face<F>(
    origin: Vec3,
    dir: Vec3,
    max_dist: f32,
    mut is_solid: F,
) -> Option<RayHit>
where
    F: FnMut(i32, i32, i32) -> bool,
{
    let mut d = dir;
    let len = (d.x * d.x + d.y * d.y + d.z * d.z).sqrt();
    if len < 1e-6 {
        return None;
    }
    d.x /= len;
    d.y /= len;
    d.z /= len;

    // Shift into a frame where cell boundaries sit on the integers.
    let origin = origin + Vec3::new(0.5, 0.5, 0.5);

    let mut vx = origin.x.floor() as i32;
    let mut vy = origin.y.floor() as i32;
    let mut vz = origin.z.floor() as i32;

    let stepx = if d.x > 0.0 {
        1
    } else if d.x < 0.0 {
        -1
    } else {
        0
    };
    let stepy = if d.y > 0.0 {
        1
    } else if d.y < 0.0 {
        -1
    } else {
        0
    };
    let stepz = if d.z > 0.0 {
        1
    } else if d.z < 0.0 {
        -1
    } else {
        0
    };

    let invx = inv_or_max(d.x);
    let invy = inv_or_max(d.y);
    let invz = inv_or_max(d.z);
    let tdx = if stepx == 0 { f32::MAX } else { invx };
    let tdy = if stepy == 0 { f32::MAX } else { invy };
    let tdz = if stepz == 0 { f32::MAX } else { invz };

    let fx = origin.x - origin.x.floor();
    let fy = origin.y - origin.y.floor();
    let fz = origin.z - origin.z.floor();
    let mut tmx = if stepx > 0 {
        (1.0 - fx) * invx
    } else if stepx < 0 {
        fx * invx
    } else {
        f32::MAX
    };
    let mut tmy = if stepy > 0 {
        (1.0 - fy) * invy
    } else if stepy < 0 {
        fy * invy
    } else {
        f32::MAX
    };
    let mut tmz = if stepz > 0 {
        (1.0 - fz) * invz
    } else if stepz < 0 {
        fz * invz
    } else {
        f32::MAX
    };

    let mut prevx = vx;
    let mut prevy = vy;
    let mut prevz = vz;
    let mut t = 0.0f32;

    for _ in 0..512 {
        if t > max_dist {
            break;
        }
        if is_solid(vx, vy, vz) {
            let dx = vx - prevx;
            let dy = vy - prevy;
            let dz = vz - prevz;
            let (mut nx, mut ny, mut nz) = (0, 0, 0);
            if dx == 1 {
                nx = -1;
            } else if dx == -1 {
                nx = 1;
            } else if dy == 1 {
                ny = -1;
            } else if dy == -1 {
                ny = 1;
            } else if dz == 1 {
                nz = -1;
            } else if dz == -1 {
                nz = 1;
            }
            return Some(RayHit {
                bx: vx,
                by: vy,
                bz: vz,
                px: prevx,
                py: prevy,
                pz: prevz,
                nx,
                ny,
                nz,
            });
        }
        prevx = vx;
        prevy = vy;
        prevz = vz;
        if tmx < tmy {
            if tmx < tmz {
                vx += stepx;
                t = tmx;
                tmx += tdx;
            } else {
                vz += stepz;
                t = tmz;
                tmz += tdz;
            }
        } else if tmy < tmz {
            vy += stepy;
            t = tmy;
            tmy += tdy;
        } else {
            vz += stepz;
            t = tmz;
            tmz += tdz;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_a_wall_straight_ahead() {
        let hit = raycast_first_hit_with_face(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            10.0,
            |x, _, _| x == 5,
        )
        .unwrap();
        assert_eq!((hit.bx, hit.by, hit.bz), (5, 0, 0));
        assert_eq!((hit.px, hit.py, hit.pz), (4, 0, 0));
        assert_eq!((hit.nx, hit.ny, hit.nz), (-1, 0, 0));
    }

    #[test]
    fn respects_max_distance() {
        let hit = raycast_first_hit_with_face(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            3.0,
            |x, _, _| x == 5,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn zero_direction_misses() {
        assert!(
            raycast_first_hit_with_face(Vec3::ZERO, Vec3::ZERO, 10.0, |_, _, _| true).is_none()
        );
    }

    #[test]
    fn downward_ray_reports_top_face() {
        let hit = raycast_first_hit_with_face(
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            20.0,
            |_, y, _| y <= 3,
        )
        .unwrap();
        assert_eq!(hit.by, 3);
        assert_eq!(hit.py, 4);
        assert_eq!((hit.nx, hit.ny, hit.nz), (0, 1, 0));
    }

    #[test]
    fn negative_coordinates_traverse_correctly() {
        let hit = raycast_first_hit_with_face(
            Vec3::ZERO,
            Vec3::new(-1.0, 0.0, 0.0),
            10.0,
            |x, _, _| x == -4,
        )
        .unwrap();
        assert_eq!(hit.bx, -4);
        assert_eq!(hit.px, -3);
        assert_eq!(hit.nx, 1);
    }
}
