//! Maximal-overlap discrete wavelet transform (MODWT) smooths.
//!
//! Only the scaling (low-pass) branch is needed: the level-J multiresolution
//! smooth `S_J` is obtained by running the pyramid forward J levels and back
//! again with every detail band set to zero. Series are reflection-extended to
//! length 2N before the circular filtering, and the first N samples are kept.

use serde::{Deserialize, Serialize};

/// Orthonormal scaling filters (DWT normalization, coefficients sum to √2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveletFilter {
    Haar,
    /// Daubechies extremal phase, 4 taps
    D4,
    /// Least asymmetric, 8 taps (symlet 4)
    La8,
    /// Coiflet, 6 taps
    Coif1,
    /// Coiflet, 30 taps
    #[default]
    Coif5,
}

impl WaveletFilter {
    pub fn scaling_coefficients(&self) -> Vec<f64> {
        match self {
            WaveletFilter::Haar => vec![std::f64::consts::FRAC_1_SQRT_2; 2],
            WaveletFilter::D4 => {
                let s3 = 3f64.sqrt();
                let denom = 4.0 * std::f64::consts::SQRT_2;
                vec![
                    (1.0 + s3) / denom,
                    (3.0 + s3) / denom,
                    (3.0 - s3) / denom,
                    (1.0 - s3) / denom,
                ]
            }
            WaveletFilter::La8 => vec![
                -0.07576571478927333,
                -0.02963552764599851,
                0.49761866763201545,
                0.8037387518059161,
                0.29785779560527736,
                -0.09921954357684722,
                -0.012603967262037833,
                0.0322231006040427,
            ],
            WaveletFilter::Coif1 => vec![
                -0.01565572813546454,
                -0.0727326195128539,
                0.38486484686420286,
                0.8525720202122554,
                0.3378976624578092,
                -0.0727326195128539,
            ],
            WaveletFilter::Coif5 => vec![
                -9.604010112806016e-08,
                -1.6237995172083452e-07,
                2.0612203985869764e-06,
                3.7007277113474083e-06,
                -2.127022167259806e-05,
                -4.121986192435274e-05,
                0.00014035632812426692,
                0.00030185794166887427,
                -0.000637558926128312,
                -0.0016616273039334133,
                0.002431575442546696,
                0.006761520220635367,
                -0.009159507338700084,
                -0.01975839160101079,
                0.03267479946711725,
                0.04128753047221535,
                -0.10556315130748072,
                -0.06203775157513177,
                0.4379823066596449,
                0.7742936228597733,
                0.42157126673115686,
                -0.05204667025368427,
                -0.09192158806016604,
                0.028169744270603175,
                0.023408322118946914,
                -0.01013158484692596,
                -0.004159312627581897,
                0.002178294377851255,
                0.00035857774116203025,
                -0.0002120818620680384,
            ],
        }
    }
}

// ─── Pyramid ─────────────────────────────────────────────────────────────────

/// One forward MODWT scaling level (upsampled by `2^(level-1)`).
fn forward_level(v: &[f64], g: &[f64], level: u32) -> Vec<f64> {
    let m = v.len();
    let stride = 1usize << (level - 1);
    (0..m)
        .map(|t| {
            g.iter()
                .enumerate()
                .map(|(l, &c)| c * v[(t + m - (stride * l) % m) % m])
                .sum()
        })
        .collect()
}

/// Inverse of [`forward_level`] with the detail band at this level zeroed.
fn inverse_level(v: &[f64], g: &[f64], level: u32) -> Vec<f64> {
    let m = v.len();
    let stride = 1usize << (level - 1);
    (0..m)
        .map(|t| {
            g.iter()
                .enumerate()
                .map(|(l, &c)| c * v[(t + stride * l) % m])
                .sum()
        })
        .collect()
}

/// Level-`level` multiresolution smooth of `x`.
pub fn modwt_smooth(x: &[f64], level: u32, filter: WaveletFilter) -> Vec<f64> {
    let n = x.len();
    if n == 0 || level == 0 {
        return x.to_vec();
    }

    let g: Vec<f64> = filter
        .scaling_coefficients()
        .iter()
        .map(|c| c * std::f64::consts::FRAC_1_SQRT_2)
        .collect();

    let mut v: Vec<f64> = x.iter().chain(x.iter().rev()).copied().collect();
    for j in 1..=level {
        v = forward_level(&v, &g, j);
    }
    for j in (1..=level).rev() {
        v = inverse_level(&v, &g, j);
    }
    v.truncate(n);
    v
}

/// Difference between a shallow and a deep smooth: keeps the scales between
/// the two levels, removing fast noise and slow drift.
pub fn band_between(x: &[f64], shallow: u32, deep: u32, filter: WaveletFilter) -> Vec<f64> {
    let fine = modwt_smooth(x, shallow, filter);
    let coarse = modwt_smooth(x, deep, filter);
    fine.iter().zip(&coarse).map(|(a, b)| a - b).collect()
}
