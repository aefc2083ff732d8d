//! Inverse-distance weighting and nearest-neighbor resolution, grounded in
//! `original_source/meteostat/interpolation/idw.py` and
//! `tests/unit/test_idw.py`.

/// Weight stations by `1 / effective_distance^power` and combine their
/// non-`NaN` values. A station sitting exactly on the target
/// (`effective_distance == 0.0`) short-circuits to its own value.
/// Returns `NaN` — never `0.0` — whenever no station contributes a finite,
/// non-zero weight.
pub fn inverse_distance_weighting(effective_distances: &[f64], values: &[Option<f64>], power: f64) -> f64 {
    debug_assert_eq!(effective_distances.len(), values.len());

    for (distance, value) in effective_distances.iter().zip(values) {
        if *distance == 0.0 {
            return value.unwrap_or(f64::NAN);
        }
    }

    let mut weight_sum = 0.0_f64;
    let mut weighted_value_sum = 0.0_f64;
    let mut any_value_present = false;

    for (distance, value) in effective_distances.iter().zip(values) {
        let Some(v) = value else { continue };
        any_value_present = true;

        let weight = 1.0 / distance.powf(power);
        if !weight.is_finite() || weight == 0.0 {
            continue;
        }
        weight_sum += weight;
        weighted_value_sum += weight * v;
    }

    if !any_value_present || weight_sum == 0.0 || !weight_sum.is_finite() {
        return f64::NAN;
    }

    let result = weighted_value_sum / weight_sum;
    if result.is_finite() {
        result
    } else {
        f64::NAN
    }
}

/// Categorical resolution: the value from the station with the smallest
/// `effective_distance` among those with a present value.
pub fn nearest_neighbor(effective_distances: &[f64], values: &[Option<f64>]) -> Option<f64> {
    effective_distances
        .iter()
        .zip(values)
        .filter_map(|(d, v)| v.map(|value| (*d, value)))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_short_circuits_to_station_value() {
        let v = inverse_distance_weighting(&[0.0, 10.0], &[Some(5.0), Some(25.0)], 2.0);
        assert_eq!(v, 5.0);
    }

    #[test]
    fn all_nan_column_returns_nan() {
        let v = inverse_distance_weighting(&[10.0, 20.0], &[None, None], 2.0);
        assert!(v.is_nan());
    }

    #[test]
    fn underflow_weights_return_nan_not_zero() {
        let v = inverse_distance_weighting(&[1e160, 1e160, 1e160], &[Some(20.0), Some(22.0), Some(24.0)], 2.0);
        assert!(v.is_nan());
    }

    #[test]
    fn normal_case_produces_finite_weighted_average() {
        let v = inverse_distance_weighting(&[10.0, 20.0, 30.0], &[Some(20.0), Some(22.0), Some(24.0)], 2.0);
        assert!(v.is_finite());
        assert!(v > 19.0 && v < 25.0);
    }

    #[test]
    fn nearest_neighbor_skips_missing_values() {
        let v = nearest_neighbor(&[5.0, 1.0, 2.0], &[Some(1.0), None, Some(3.0)]);
        assert_eq!(v, Some(3.0));
    }

    #[test]
    fn nearest_neighbor_all_missing_is_none() {
        assert_eq!(nearest_neighbor(&[1.0, 2.0], &[None, None]), None);
    }
}
