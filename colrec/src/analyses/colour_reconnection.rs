//! Dijet masses of four-jet e+e- -> W+W- -> 4q events.
//!
//! Only jets whose last clustering step is resolved below `y_cut_max` count.
//! The selected pairing of an accepted event fills one histogram per pair
//! slot, `dijet_mass_1` for the first pair and `dijet_mass_2` for the second.

use crate::analysis::{Analysis, Veto};
use crate::dijet::{DijetPairSelector, SelectionResult};
use crate::errors::Result;
use crate::event::Event;
use crate::histogram::HistogramSet;
use crate::jets::resolved_jets;
use crate::settings_card::SettingsCard;
use log::debug;

pub struct ColourReconnection {
    selector: DijetPairSelector,
    y_cut_max: f64,
    histograms: HistogramSet,
    h_dijet_mass_1: usize,
    h_dijet_mass_2: usize,
}

impl ColourReconnection {
    pub const NAME: &'static str = "MC_COLORRECONNECTION";

    pub fn new(settings: &SettingsCard) -> Result<ColourReconnection> {
        let mut histograms = HistogramSet::new();
        let h_dijet_mass_1 = histograms.book("dijet_mass_1", 40, 0., 120.)?;
        let h_dijet_mass_2 = histograms.book("dijet_mass_2", 40, 0., 120.)?;

        Ok(ColourReconnection {
            selector: DijetPairSelector::new(settings.dijet),
            y_cut_max: settings.y_cut_max,
            histograms,
            h_dijet_mass_1,
            h_dijet_mass_2,
        })
    }
}

impl Analysis for ColourReconnection {
    fn name(&self) -> &'static str {
        ColourReconnection::NAME
    }

    fn analyze(&mut self, event: &Event) -> std::result::Result<(), Veto> {
        let jets = resolved_jets(&event.jets, self.y_cut_max);

        match self.selector.select(&jets) {
            SelectionResult::Accepted(pairing) => {
                debug!("event {}: {}", event.number, SelectionResult::Accepted(pairing));
                self.histograms
                    .fill(self.h_dijet_mass_1, pairing.masses[0], event.weight);
                self.histograms
                    .fill(self.h_dijet_mass_2, pairing.masses[1], event.weight);
                Ok(())
            }
            SelectionResult::Rejected(reason) => Err(Veto(reason.label())),
        }
    }

    fn histograms(&self) -> &HistogramSet {
        &self.histograms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Jet;
    use vector::LorentzVector;

    /// Jet at azimuth `phi_deg` built from two collinear halves, so it always passes the y-cut.
    fn resolved(e: f64, phi_deg: f64) -> Jet {
        let phi = phi_deg.to_radians();
        let half = LorentzVector::from_args(e / 2., e / 2. * phi.cos(), e / 2. * phi.sin(), 0.);
        Jet::with_parents(half, half)
    }

    #[test]
    fn fills_both_mass_slots() {
        let mut analysis = ColourReconnection::new(&SettingsCard::default()).unwrap();
        let event = Event::new(
            1,
            vec![
                resolved(40., 0.),
                resolved(50., 30.),
                resolved(45., 135.),
                resolved(35., 165.),
            ],
        );

        assert_eq!(analysis.analyze(&event), Ok(()));
        let h = analysis.histograms();
        assert_eq!(h.get("dijet_mass_1").unwrap().entries(), 1);
        assert_eq!(h.get("dijet_mass_2").unwrap().entries(), 1);
    }

    #[test]
    fn unresolved_jets_do_not_count() {
        let mut analysis = ColourReconnection::new(&SettingsCard::default()).unwrap();
        let mut jets = vec![
            resolved(40., 0.),
            resolved(50., 30.),
            resolved(45., 135.),
        ];
        // fourth jet without clustering history
        jets.push(Jet::from_components(35., 35. * 165f64.to_radians().cos(), 35. * 165f64.to_radians().sin(), 0.));

        assert_eq!(analysis.analyze(&Event::new(2, jets)), Err(Veto("wrong_jet_count")));
        assert_eq!(analysis.histograms().get("dijet_mass_1").unwrap().entries(), 0);
    }
}
