use crate::analyses::SeparationHistograms;
use crate::analysis::{Analysis, Veto};
use crate::errors::Result;
use crate::event::{Event, Jet};
use crate::histogram::HistogramSet;
use crate::settings_card::SettingsCard;
use std::cmp::Ordering;

/// Jet multiplicity, jet pT and pairwise jet and quark separations.
pub struct JetSeparation {
    jet_min_pt: f64,
    histograms: HistogramSet,
    h_jet_pt: usize,
    h_n_jets: usize,
    jet_pairs: SeparationHistograms,
    quark_pairs: SeparationHistograms,
}

impl JetSeparation {
    pub const NAME: &'static str = "MY_ANALYSIS";

    pub fn new(settings: &SettingsCard) -> Result<JetSeparation> {
        let mut histograms = HistogramSet::new();
        let h_jet_pt = histograms.book("jet_pT", 50, 0., 200.)?;
        let h_n_jets = histograms.book("nJets", 6, 1., 6.)?;
        let jet_pairs = SeparationHistograms::book(&mut histograms, "jet")?;
        let quark_pairs = SeparationHistograms::book(&mut histograms, "quark")?;

        Ok(JetSeparation {
            jet_min_pt: settings.jet_min_pt,
            histograms,
            h_jet_pt,
            h_n_jets,
            jet_pairs,
            quark_pairs,
        })
    }

    /// Jets above the pT threshold, hardest first.
    fn selected_jets<'a>(&self, event: &'a Event) -> Vec<&'a Jet> {
        let mut jets: Vec<&Jet> = event
            .jets
            .iter()
            .filter(|j| j.momentum.pt() > self.jet_min_pt)
            .collect();
        jets.sort_by(|a, b| {
            b.momentum
                .pt()
                .partial_cmp(&a.momentum.pt())
                .unwrap_or(Ordering::Equal)
        });
        jets
    }
}

impl Analysis for JetSeparation {
    fn name(&self) -> &'static str {
        JetSeparation::NAME
    }

    fn analyze(&mut self, event: &Event) -> std::result::Result<(), Veto> {
        let w = event.weight;
        let jets = self.selected_jets(event);

        self.histograms.fill(self.h_n_jets, jets.len() as f64, w);
        for j in &jets {
            self.histograms.fill(self.h_jet_pt, j.momentum.pt(), w);
        }
        self.jet_pairs
            .fill_pairs(&mut self.histograms, jets.iter().map(|j| &j.momentum), w);

        self.quark_pairs
            .fill_pairs(&mut self.histograms, event.quarks().map(|q| &q.momentum), w);

        Ok(())
    }

    fn finalize(&mut self) {
        self.histograms.normalize_all(1.);
    }

    fn histograms(&self) -> &HistogramSet {
        &self.histograms
    }
}
