use crate::core::models::frame::SimulationBox;
use nalgebra::{Point3, Vector3};

/// Displacement from `a` to `b`, wrapped to the nearest periodic image when a box is given.
pub fn minimum_image_vector(
    a: &Point3<f64>,
    b: &Point3<f64>,
    simulation_box: Option<&SimulationBox>,
) -> Vector3<f64> {
    let mut d = b - a;
    if let Some(bx) = simulation_box {
        for k in 0..3 {
            let l = bx.lengths[k];
            d[k] -= l * (d[k] / l).round();
        }
    }
    d
}

pub fn minimum_image_distance(
    a: &Point3<f64>,
    b: &Point3<f64>,
    simulation_box: Option<&SimulationBox>,
) -> f64 {
    minimum_image_vector(a, b, simulation_box).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn distance_without_box_is_euclidean() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert!(f64_approx_equal(minimum_image_distance(&a, &b, None), 5.0));
    }

    #[test]
    fn distance_across_periodic_boundary_uses_nearest_image() {
        let bx = SimulationBox::new(10.0, 10.0, 10.0);
        let a = Point3::new(0.5, 5.0, 5.0);
        let b = Point3::new(9.5, 5.0, 5.0);
        assert!(f64_approx_equal(minimum_image_distance(&a, &b, Some(&bx)), 1.0));
    }

    #[test]
    fn minimum_image_vector_points_through_the_boundary() {
        let bx = SimulationBox::new(10.0, 20.0, 30.0);
        let a = Point3::new(1.0, 1.0, 1.0);
        let b = Point3::new(9.0, 1.0, 29.0);
        let d = minimum_image_vector(&a, &b, Some(&bx));
        assert!(f64_approx_equal(d.x, -2.0));
        assert!(f64_approx_equal(d.y, 0.0));
        assert!(f64_approx_equal(d.z, -2.0));
    }
}
