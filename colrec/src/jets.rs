use crate::event::Jet;
use vector::LorentzVector;

/// Default upper bound on the jet resolution of the last clustering step.
pub const DEFAULT_Y_CUT_MAX: f64 = 0.01;

/// Resolution of the last merging step `j1 + j2 -> jet`:
/// `y = 2 E_2^2 (1 - cos theta_12) / E_jet^2`.
///
/// Returns `None` when the jet has no clustering history or zero energy.
pub fn y_cut(jet: &Jet) -> Option<f64> {
    let (j1, j2) = jet.parents.as_ref()?;
    merging_resolution(&jet.momentum, j1, j2)
}

fn merging_resolution(
    jet: &LorentzVector<f64>,
    j1: &LorentzVector<f64>,
    j2: &LorentzVector<f64>,
) -> Option<f64> {
    if jet.t == 0. {
        return None;
    }
    Some(2. * j2.t * j2.t * (1. - j1.angle(j2).cos()) / (jet.t * jet.t))
}

/// Keeps the jets whose last merging step was resolved below `y_cut_max`.
/// Jets without clustering history are dropped. Input order is preserved.
pub fn resolved_jets(jets: &[Jet], y_cut_max: f64) -> Vec<Jet> {
    jets.iter()
        .filter(|j| matches!(y_cut(j), Some(y) if y < y_cut_max))
        .cloned()
        .collect()
}
