use serde::{Deserialize, Serialize};

/// One keyframe of an elevation curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub in_tangent: f32,
    #[serde(default)]
    pub out_tangent: f32,
}

impl CurveKey {
    pub fn new(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

/// Maps a normalized height in [0,1] to an elevation factor.
///
/// Keys are interpolated with cubic Hermite splines using each key's
/// tangents. Inputs are clamped to [0,1] and then to the key range, so the
/// curve is defined for every input. A curve without keys is the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationCurve {
    keys: Vec<CurveKey>,
}

impl Default for ElevationCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl ElevationCurve {
    /// Build a curve from arbitrary keys, sorted by time
    pub fn new(mut keys: Vec<CurveKey>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Identity mapping over [0,1]
    pub fn linear() -> Self {
        Self::new(vec![
            CurveKey::new(0.0, 0.0, 1.0, 1.0),
            CurveKey::new(1.0, 1.0, 1.0, 1.0),
        ])
    }

    /// Piecewise-linear curve through the given (time, value) points.
    /// Tangents are set to the neighbouring segment slopes.
    pub fn from_points(points: &[(f32, f32)]) -> Self {
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let slope = |a: (f32, f32), b: (f32, f32)| {
            let dt = b.0 - a.0;
            if dt.abs() <= f32::EPSILON {
                0.0
            } else {
                (b.1 - a.1) / dt
            }
        };

        let keys = sorted
            .iter()
            .enumerate()
            .map(|(i, &(time, value))| {
                let in_tangent = if i > 0 { slope(sorted[i - 1], sorted[i]) } else { 0.0 };
                let out_tangent = if i + 1 < sorted.len() {
                    slope(sorted[i], sorted[i + 1])
                } else {
                    0.0
                };
                CurveKey::new(time, value, in_tangent, out_tangent)
            })
            .collect();

        Self { keys }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Restore the sorted-by-time invariant after deserialization
    pub(crate) fn sort_keys(&mut self) {
        self.keys.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.keys.iter().all(|k| {
            k.time.is_finite()
                && k.value.is_finite()
                && k.in_tangent.is_finite()
                && k.out_tangent.is_finite()
        })
    }

    /// Evaluate the curve at `t`
    pub fn evaluate(&self, t: f32) -> f32 {
        // NaN would slip past both boundary checks below
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return t,
        };

        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; guaranteed to be in 1..len here
        let next = self.keys.partition_point(|k| k.time <= t);
        let k0 = &self.keys[next - 1];
        let k1 = &self.keys[next];

        let dt = k1.time - k0.time;
        if dt <= f32::EPSILON {
            return k1.value;
        }

        let s = (t - k0.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * k0.value + h10 * dt * k0.out_tangent + h01 * k1.value + h11 * dt * k1.in_tangent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_curve_is_identity() {
        let curve = ElevationCurve::linear();
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            assert!((curve.evaluate(t) - t).abs() < 1e-5, "t = {}", t);
        }
    }

    #[test]
    fn test_input_outside_unit_range_is_clamped() {
        let curve = ElevationCurve::linear();
        assert_eq!(curve.evaluate(-3.0), 0.0);
        assert_eq!(curve.evaluate(7.5), 1.0);
        assert_eq!(curve.evaluate(f32::INFINITY), 1.0);
    }

    #[test]
    fn test_nan_input_reads_as_zero() {
        assert_eq!(ElevationCurve::linear().evaluate(f32::NAN), 0.0);

        let curve = ElevationCurve::from_points(&[(0.0, 0.2), (0.4, 0.0), (1.0, 1.0)]);
        assert!((curve.evaluate(f32::NAN) - 0.2).abs() < 1e-6);
        assert_eq!(ElevationCurve::new(Vec::new()).evaluate(f32::NAN), 0.0);
    }

    #[test]
    fn test_empty_curve_passes_through() {
        let curve = ElevationCurve::new(Vec::new());
        assert_eq!(curve.evaluate(0.3), 0.3);
    }

    #[test]
    fn test_piecewise_points_hit_keys() {
        // Flat water up to 0.4, then a ramp
        let curve = ElevationCurve::from_points(&[(0.0, 0.0), (0.4, 0.0), (1.0, 1.0)]);
        assert!(curve.evaluate(0.2).abs() < 1e-6);
        assert!((curve.evaluate(0.4)).abs() < 1e-6);
        assert!((curve.evaluate(0.7) - 0.5).abs() < 1e-5);
        assert!((curve.evaluate(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_keys_are_sorted() {
        let curve = ElevationCurve::new(vec![
            CurveKey::new(1.0, 1.0, 0.0, 0.0),
            CurveKey::new(0.0, 0.0, 0.0, 0.0),
        ]);
        assert_eq!(curve.keys()[0].time, 0.0);
        // Zero tangents give a smoothstep between the keys
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!(curve.evaluate(0.25) < 0.25);
    }
}
