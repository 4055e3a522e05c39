pub mod colour_reconnection;
pub mod jet_separation;
pub mod quark_pairs;

use crate::errors::Result;
use crate::histogram::HistogramSet;
use std::f64::consts::PI;
use vector::LorentzVector;

/// Wrap an azimuthal difference into `[-pi, pi]`.
pub fn wrap_delta_phi(mut dphi: f64) -> f64 {
    if !dphi.is_finite() {
        return dphi;
    }
    while dphi > PI {
        dphi -= 2. * PI;
    }
    while dphi < -PI {
        dphi += 2. * PI;
    }
    dphi
}

/// Angular separation of two momenta in polar angle, azimuth and (eta, phi) distance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PairSeparation {
    pub delta_theta: f64,
    pub delta_phi: f64,
    pub delta_r: f64,
}

impl PairSeparation {
    pub fn between(p1: &LorentzVector<f64>, p2: &LorentzVector<f64>) -> PairSeparation {
        let delta_theta = (p1.theta() - p2.theta()).abs();
        let delta_phi = wrap_delta_phi(p1.phi() - p2.phi());
        let delta_eta = p1.pseudorapidity() - p2.pseudorapidity();
        PairSeparation {
            delta_theta,
            delta_phi,
            delta_r: (delta_eta * delta_eta + delta_phi * delta_phi).sqrt(),
        }
    }
}

/// The `<prefix>_deltaTheta`, `<prefix>_deltaPhi` and `<prefix>_deltaR` histograms.
#[derive(Debug, Copy, Clone)]
pub(crate) struct SeparationHistograms {
    delta_theta: usize,
    delta_phi: usize,
    delta_r: usize,
}

impl SeparationHistograms {
    pub(crate) fn book(set: &mut HistogramSet, prefix: &str) -> Result<SeparationHistograms> {
        Ok(SeparationHistograms {
            delta_theta: set.book(&format!("{}_deltaTheta", prefix), 50, 0.0, PI)?,
            delta_phi: set.book(&format!("{}_deltaPhi", prefix), 50, -PI, PI)?,
            delta_r: set.book(&format!("{}_deltaR", prefix), 50, 0.0, 6.0)?,
        })
    }

    /// Fill once for every unordered pair of `momenta`.
    pub(crate) fn fill_pairs<'a, I>(&self, set: &mut HistogramSet, momenta: I, weight: f64)
    where
        I: IntoIterator<Item = &'a LorentzVector<f64>>,
    {
        let momenta: Vec<&LorentzVector<f64>> = momenta.into_iter().collect();
        for (i, p1) in momenta.iter().enumerate() {
            for p2 in &momenta[i + 1..] {
                let sep = PairSeparation::between(p1, p2);
                set.fill(self.delta_theta, sep.delta_theta, weight);
                set.fill(self.delta_phi, sep.delta_phi, weight);
                set.fill(self.delta_r, sep.delta_r, weight);
            }
        }
    }
}
