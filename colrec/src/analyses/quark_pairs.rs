use crate::analyses::SeparationHistograms;
use crate::analysis::{Analysis, Veto};
use crate::errors::Result;
use crate::event::Event;
use crate::histogram::HistogramSet;
use log::debug;

/// Pairwise separations of the final-state quarks of parton-level events.
pub struct QuarkPairs {
    histograms: HistogramSet,
    pairs: SeparationHistograms,
}

impl QuarkPairs {
    pub const NAME: &'static str = "QUARK_PAIRS";

    pub fn new() -> Result<QuarkPairs> {
        let mut histograms = HistogramSet::new();
        let pairs = SeparationHistograms::book(&mut histograms, "quark")?;
        Ok(QuarkPairs { histograms, pairs })
    }
}

impl Analysis for QuarkPairs {
    fn name(&self) -> &'static str {
        QuarkPairs::NAME
    }

    fn analyze(&mut self, event: &Event) -> std::result::Result<(), Veto> {
        debug!(
            "event {} has {} quarks",
            event.number,
            event.quarks().count()
        );
        self.pairs.fill_pairs(
            &mut self.histograms,
            event.quarks().map(|q| &q.momentum),
            event.weight,
        );
        Ok(())
    }

    fn finalize(&mut self) {
        self.histograms.normalize_all(1.);
    }

    fn histograms(&self) -> &HistogramSet {
        &self.histograms
    }
}
