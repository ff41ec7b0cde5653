use std::f64::consts::PI;

const GRAVITY: f64 = 9.81;

/// Deep water wavelength in meters for a wave with the given period in seconds, L = gT^2 / 2pi.
/// Non-finite or negative periods yield 0.
pub fn deep_water_wavelength(period: f64) -> f64 {
    if !period.is_finite() || period <= 0.0 {
        return 0.0;
    }
    GRAVITY * period.powi(2) / (2.0 * PI)
}
