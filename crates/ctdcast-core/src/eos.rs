//! Reference equation-of-state implementation behind the [`EquationOfState`]
//! seam: PSS-78 practical salinity, UNESCO (1983) pressure-to-depth with
//! latitude-dependent gravity, and EOS-80 sigma-t density anomaly.
//!
//! Conductivity is expected in mS/cm, pressure in dbar (gauge), temperature
//! in degrees C (ITS-68 for coefficient purposes), latitude in degrees.

use crate::derived::{DerivedSample, EquationOfState};

/// Conductivity of standard seawater, C(35, 15, 0), in mS/cm.
const C35_15_0_MS_CM: f64 = 42.914;

pub struct Pss78;

impl EquationOfState for Pss78 {
    fn derive(
        &self,
        pressure: f64,
        conductivity: f64,
        temperature: f64,
        latitude: f64,
    ) -> DerivedSample {
        let salinity = practical_salinity(conductivity, temperature, pressure);
        DerivedSample {
            depth: depth_from_pressure(pressure, latitude),
            salinity,
            density_anomaly: sigma_t(salinity, temperature),
        }
    }
}

/// PSS-78 practical salinity from the conductivity ratio (Fofonoff &
/// Millard, UNESCO Technical Papers in Marine Science 44).
pub fn practical_salinity(conductivity: f64, temperature: f64, pressure: f64) -> f64 {
    let t = temperature;
    let p = pressure;
    let r = conductivity / C35_15_0_MS_CM;

    let rt_t = 0.6766097
        + 2.00564e-2 * t
        + 1.104259e-4 * t.powi(2)
        - 6.9698e-7 * t.powi(3)
        + 1.0031e-9 * t.powi(4);

    let rp = 1.0
        + p * (2.070e-5 - 6.370e-10 * p + 3.989e-15 * p.powi(2))
            / (1.0 + 3.426e-2 * t + 4.464e-4 * t.powi(2) + (4.215e-1 - 3.107e-3 * t) * r);

    let rt = r / (rp * rt_t);
    let sqrt_rt = rt.max(0.0).sqrt();

    let s_base = 0.0080 - 0.1692 * sqrt_rt + 25.3851 * rt + 14.0941 * sqrt_rt.powi(3)
        - 7.0261 * rt.powi(2)
        + 2.7081 * sqrt_rt.powi(5);

    let dt = t - 15.0;
    let correction = (dt / (1.0 + 0.0162 * dt))
        * (0.0005 - 0.0056 * sqrt_rt - 0.0066 * rt - 0.0375 * sqrt_rt.powi(3)
            + 0.0636 * rt.powi(2)
            - 0.0144 * sqrt_rt.powi(5));

    s_base + correction
}

/// UNESCO (1983) depth in meters from sea pressure (dbar) and latitude.
pub fn depth_from_pressure(pressure: f64, latitude: f64) -> f64 {
    let p = pressure;
    let x = latitude.to_radians().sin().powi(2);
    let gravity = 9.780318 * (1.0 + (5.2788e-3 + 2.36e-5 * x) * x) + 2.184e-6 * 0.5 * p;
    let numerator = (((-1.82e-15 * p + 2.279e-10) * p - 2.2512e-5) * p + 9.72659) * p;
    numerator / gravity
}

/// EOS-80 density anomaly sigma-t (kg/m3 minus 1000) at atmospheric
/// pressure (Millero & Poisson, 1981).
pub fn sigma_t(salinity: f64, temperature: f64) -> f64 {
    let t = temperature;
    let s = salinity;

    let rho_w = 999.842594 + 6.793952e-2 * t - 9.095290e-3 * t.powi(2) + 1.001685e-4 * t.powi(3)
        - 1.120083e-6 * t.powi(4)
        + 6.536332e-9 * t.powi(5);

    let a = 8.24493e-1 - 4.0899e-3 * t + 7.6438e-5 * t.powi(2) - 8.2467e-7 * t.powi(3)
        + 5.3875e-9 * t.powi(4);
    let b = -5.72466e-3 + 1.0227e-4 * t - 1.6546e-6 * t.powi(2);
    let c = 4.8314e-4;

    rho_w + a * s + b * s.max(0.0).sqrt().powi(3) + c * s.powi(2) - 1000.0
}
