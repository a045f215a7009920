/// Knots of the IEC 268-18 meter curve as (dB below the ceiling, fraction of the bar).
///
/// The curve is piecewise linear between knots and flat at zero below the first one.
const IEC_KNOTS: [(f32, f32); 7] = [
    (-70.0, 0.0),
    (-60.0, 0.025),
    (-50.0, 0.075),
    (-40.0, 0.15),
    (-30.0, 0.30),
    (-20.0, 0.50),
    (0.0, 1.0),
];

/// The curve used to map a level onto the meter bar.
///
/// All scales map `floor` to `0.0` and `ceiling` to `1.0` and are monotonic in
/// between, so a segment's position always grows with its level.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Scale {
    /// Evenly spaced: `(value - floor) / (ceiling - floor)`.
    #[default]
    Linear,
    /// IEC 268-18 dB scaling, relative to the ceiling. More room for the loud end.
    Iec,
    /// The linear fraction raised to the given exponent. Exponents above one
    /// increase the resolution of the meter at higher values.
    Power(f32),
}

impl Scale {
    /// Map `value` to a fraction of the bar in `[0, 1]`.
    ///
    /// Values outside `[floor, ceiling]` saturate. NaN maps to `0.0`.
    pub fn normalize(&self, value: f32, floor: f32, ceiling: f32) -> f32 {
        if value.is_nan() {
            return 0.0;
        }
        let value = value.clamp(floor, ceiling);
        let fraction = match self {
            Scale::Linear => linear_fraction(value, floor, ceiling),
            Scale::Power(exponent) => linear_fraction(value, floor, ceiling).powf(*exponent),
            Scale::Iec => {
                let bottom = iec_fraction(floor - ceiling);
                let span = 1.0 - bottom;
                if span <= 0.0 {
                    linear_fraction(value, floor, ceiling)
                } else {
                    (iec_fraction(value - ceiling) - bottom) / span
                }
            }
        };
        fraction.clamp(0.0, 1.0)
    }

    /// Inverse of [`Scale::normalize`]: the level shown at `fraction` of the bar.
    pub fn denormalize(&self, fraction: f32, floor: f32, ceiling: f32) -> f32 {
        let fraction = fraction.clamp(0.0, 1.0);
        let value = match self {
            Scale::Linear => floor + fraction * (ceiling - floor),
            Scale::Power(exponent) => floor + fraction.powf(1.0 / *exponent) * (ceiling - floor),
            Scale::Iec => {
                let bottom = iec_fraction(floor - ceiling);
                let span = 1.0 - bottom;
                if span <= 0.0 {
                    floor + fraction * (ceiling - floor)
                } else {
                    ceiling + iec_db(bottom + fraction * span)
                }
            }
        };
        value.clamp(floor, ceiling)
    }

    /// Position of `value` along a bar of `segments` segments, in segment units.
    ///
    /// The linear scale multiplies before dividing, in `f64`, so levels on an
    /// exact segment boundary or half boundary land on it exactly.
    pub fn segment_position(&self, value: f32, floor: f32, ceiling: f32, segments: usize) -> f64 {
        let segments = segments as f64;
        match self {
            Scale::Linear if !value.is_nan() => {
                let value = f64::from(value.clamp(floor, ceiling));
                let (floor, ceiling) = (f64::from(floor), f64::from(ceiling));
                ((value - floor) * segments / (ceiling - floor)).clamp(0.0, segments)
            }
            _ => f64::from(self.normalize(value, floor, ceiling)) * segments,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        match self {
            Scale::Power(exponent) => exponent.is_finite() && *exponent > 0.0,
            Scale::Linear | Scale::Iec => true,
        }
    }
}

fn linear_fraction(value: f32, floor: f32, ceiling: f32) -> f32 {
    (value - floor) / (ceiling - floor)
}

/// Fraction of the bar for a level `db` relative to the ceiling (`db <= 0`).
fn iec_fraction(db: f32) -> f32 {
    let (first_db, _) = IEC_KNOTS[0];
    if db < first_db {
        return 0.0;
    }
    for pair in IEC_KNOTS.windows(2) {
        let (db0, f0) = pair[0];
        let (db1, f1) = pair[1];
        if db < db1 {
            return f0 + (db - db0) * (f1 - f0) / (db1 - db0);
        }
    }
    1.0
}

/// Inverse of [`iec_fraction`].
fn iec_db(fraction: f32) -> f32 {
    let (first_db, first_fraction) = IEC_KNOTS[0];
    if fraction <= first_fraction {
        return first_db;
    }
    for pair in IEC_KNOTS.windows(2) {
        let (db0, f0) = pair[0];
        let (db1, f1) = pair[1];
        if fraction < f1 {
            return db0 + (fraction - f0) * (db1 - db0) / (f1 - f0);
        }
    }
    0.0
}

/// Convert a linear sample amplitude (0.0 to 1.0) to decibels relative to full scale.
///
/// Silence maps to negative infinity, which a meter clamps to its floor.
pub fn amplitude_to_db(sample_amplitude: f32) -> f32 {
    if sample_amplitude > 0.0 {
        20.0 * sample_amplitude.log10()
    } else {
        f32::NEG_INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn linear_maps_bounds_and_midpoint() {
        assert!((Scale::Linear.normalize(-60.0, -60.0, 0.0) - 0.0).abs() < EPSILON);
        assert!((Scale::Linear.normalize(0.0, -60.0, 0.0) - 1.0).abs() < EPSILON);
        assert!((Scale::Linear.normalize(-42.0, -60.0, 0.0) - 0.3).abs() < EPSILON);
    }

    #[test]
    fn normalize_saturates_out_of_range() {
        for scale in [Scale::Linear, Scale::Iec, Scale::Power(2.0)] {
            assert_eq!(scale.normalize(12.0, -60.0, 0.0), 1.0);
            assert_eq!(scale.normalize(-200.0, -60.0, 0.0), 0.0);
            assert_eq!(scale.normalize(f32::NEG_INFINITY, -60.0, 0.0), 0.0);
            assert_eq!(scale.normalize(f32::NAN, -60.0, 0.0), 0.0);
        }
    }

    #[test]
    fn iec_matches_reference_points() {
        // Floor far below the curve so no rescaling happens.
        let n = |db| Scale::Iec.normalize(db, -100.0, 0.0);
        assert!((n(-20.0) - 0.5).abs() < EPSILON);
        assert!((n(-30.0) - 0.3).abs() < EPSILON);
        assert!((n(-10.0) - 0.75).abs() < EPSILON);
        assert!((n(-80.0) - 0.0).abs() < EPSILON);
    }

    #[test]
    fn iec_floor_maps_to_zero() {
        assert!(Scale::Iec.normalize(-60.0, -60.0, 0.0).abs() < EPSILON);
        assert!((Scale::Iec.normalize(0.0, -60.0, 0.0) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn iec_is_relative_to_ceiling() {
        let a = Scale::Iec.normalize(-20.0, -70.0, 0.0);
        let b = Scale::Iec.normalize(-10.0, -60.0, 10.0);
        assert!((a - b).abs() < EPSILON);
    }

    #[test]
    fn denormalize_inverts_normalize() {
        for scale in [Scale::Linear, Scale::Iec, Scale::Power(2.0)] {
            for db in [-60.0, -45.0, -20.0, -6.0, 0.0] {
                let fraction = scale.normalize(db, -60.0, 0.0);
                let back = scale.denormalize(fraction, -60.0, 0.0);
                assert!((db - back).abs() < 1e-3, "{scale:?}: db {db}, back {back}");
            }
        }
    }

    #[test]
    fn scales_are_monotonic() {
        for scale in [Scale::Linear, Scale::Iec, Scale::Power(2.0)] {
            let mut previous = -1.0;
            for step in 0..=60 {
                let fraction = scale.normalize(-60.0 + step as f32, -60.0, 0.0);
                assert!(fraction >= previous, "{scale:?} not monotonic at step {step}");
                previous = fraction;
            }
        }
    }

    #[test]
    fn power_scale_compresses_low_end() {
        let linear = Scale::Linear.normalize(-30.0, -60.0, 0.0);
        let power = Scale::Power(2.0).normalize(-30.0, -60.0, 0.0);
        assert!((power - linear * linear).abs() < EPSILON);
        assert!(power < linear);
    }

    #[test]
    fn linear_segment_position_is_exact_on_half_boundaries() {
        // (35 / 60) * 54 rounds below 31.5 when the fraction is formed first.
        assert_eq!(Scale::Linear.segment_position(-25.0, -60.0, 0.0, 54), 31.5);
        assert_eq!(Scale::Linear.segment_position(-28.5, -60.0, 0.0, 60), 31.5);
        assert_eq!(Scale::Linear.segment_position(5.0, -60.0, 0.0, 10), 10.0);
        assert_eq!(Scale::Linear.segment_position(f32::NAN, -60.0, 0.0, 10), 0.0);
    }

    #[test]
    fn power_scale_validity() {
        assert!(Scale::Power(2.0).is_valid());
        assert!(!Scale::Power(0.0).is_valid());
        assert!(!Scale::Power(f32::NAN).is_valid());
    }

    #[test]
    fn amplitude_to_db_bounds() {
        assert_eq!(amplitude_to_db(0.0), f32::NEG_INFINITY);
        assert!((amplitude_to_db(1.0) - 0.0).abs() < EPSILON);
        assert!((amplitude_to_db(0.5) + 6.0206).abs() < 1e-3);
        assert!(amplitude_to_db(0.001) < -50.0);
    }
}
