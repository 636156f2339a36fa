use nalgebra::Point3;

/// True when any point of `a` lies within `radius_squared` of any point of `b`.
pub fn any_within(a: &[Point3<f64>], b: &[Point3<f64>], radius_squared: f64) -> bool {
    a.iter().any(|p| {
        b.iter()
            .any(|q| nalgebra::distance_squared(p, q) <= radius_squared)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_within_uses_closest_pair() {
        let a = [Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)];
        let b = [Point3::new(13.0, 0.0, 0.0)];
        assert!(any_within(&a, &b, 9.0));
        assert!(!any_within(&a, &b, 8.99));
    }

    #[test]
    fn any_within_is_false_for_empty_sets() {
        let a = [Point3::new(0.0, 0.0, 0.0)];
        assert!(!any_within(&a, &[], 100.0));
        assert!(!any_within(&[], &a, 100.0));
    }
}
