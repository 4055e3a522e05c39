//! Per-event analysis plumbing: the `Analysis` trait, cut-flow accounting and
//! the handler that drives a set of analyses over an event stream.

use crate::analyses::colour_reconnection::ColourReconnection;
use crate::analyses::jet_separation::JetSeparation;
use crate::analyses::quark_pairs::QuarkPairs;
use crate::errors::{Error, Result};
use crate::event::Event;
use crate::histogram::{Histo1D, HistogramSet};
use crate::settings_card::SettingsCard;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

pub const ALL_ANALYSES: [&str; 3] = [
    ColourReconnection::NAME,
    JetSeparation::NAME,
    QuarkPairs::NAME,
];

/// An event that an analysis skipped, with the reason used in the cut-flow.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Veto(pub &'static str);

pub trait Analysis {
    fn name(&self) -> &'static str;

    fn analyze(&mut self, event: &Event) -> std::result::Result<(), Veto>;

    /// Called once after the last event.
    fn finalize(&mut self) {}

    fn histograms(&self) -> &HistogramSet;
}

pub fn build(name: &str, settings: &SettingsCard) -> Result<Box<dyn Analysis>> {
    match name {
        ColourReconnection::NAME => Ok(Box::new(ColourReconnection::new(settings)?)),
        JetSeparation::NAME => Ok(Box::new(JetSeparation::new(settings)?)),
        QuarkPairs::NAME => Ok(Box::new(QuarkPairs::new()?)),
        _ => Err(Error::UnknownAnalysis(name.to_owned())),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cutflow {
    pub events: usize,
    pub passed: usize,
    pub sum_weights: f64,
    pub sum_weights_passed: f64,
    pub vetoes: BTreeMap<String, usize>,
}

impl Cutflow {
    pub fn record(&mut self, outcome: &std::result::Result<(), Veto>, weight: f64) {
        self.events += 1;
        self.sum_weights += weight;
        match outcome {
            Ok(()) => {
                self.passed += 1;
                self.sum_weights_passed += weight;
            }
            Err(Veto(reason)) => *self.vetoes.entry((*reason).to_owned()).or_insert(0) += 1,
        }
    }

    pub fn efficiency(&self) -> f64 {
        if self.events == 0 {
            0.
        } else {
            self.passed as f64 / self.events as f64
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub name: String,
    pub cutflow: Cutflow,
    pub histograms: Vec<Histo1D>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub events: usize,
    pub jet_radius: f64,
    pub y_cut_max: f64,
    pub analyses: Vec<AnalysisSummary>,
}

/// Runs a fixed set of analyses over the same events.
pub struct AnalysisHandler {
    settings: SettingsCard,
    analyses: Vec<(Box<dyn Analysis>, Cutflow)>,
    events: usize,
    finalized: bool,
}

impl AnalysisHandler {
    pub fn new(settings: SettingsCard) -> Result<AnalysisHandler> {
        let mut analyses: Vec<(Box<dyn Analysis>, Cutflow)> =
            Vec::with_capacity(settings.analyses.len());
        for name in &settings.analyses {
            if analyses.iter().any(|(a, _)| a.name() == name.as_str()) {
                warn!("analysis {} requested twice, running it once", name);
                continue;
            }
            analyses.push((build(name, &settings)?, Cutflow::default()));
        }

        info!(
            "initialised {} analyses: {}",
            analyses.len(),
            settings.analyses.join(", ")
        );

        Ok(AnalysisHandler {
            settings,
            analyses,
            events: 0,
            finalized: false,
        })
    }

    pub fn analyze(&mut self, event: &Event) {
        self.events += 1;
        for (analysis, cutflow) in self.analyses.iter_mut() {
            let outcome = analysis.analyze(event);
            if let Err(Veto(reason)) = outcome {
                trace!("{}: event {} vetoed ({})", analysis.name(), event.number, reason);
            }
            cutflow.record(&outcome, event.weight);
        }
    }

    /// Feed events until the stream ends or `max_events` have been analysed.
    /// Returns the number of events analysed so far.
    pub fn run<I>(&mut self, events: I, max_events: Option<usize>) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Event>>,
    {
        let mut events = events.into_iter();
        while max_events.map_or(true, |n| self.events < n) {
            let event = match events.next() {
                Some(event) => event?,
                None => return Ok(self.events),
            };
            self.analyze(&event);

            if self.events % 1000 == 0 {
                info!("processed {} events", self.events);
            }
        }
        info!("reached the requested {} events", self.events);
        Ok(self.events)
    }

    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        for (analysis, cutflow) in self.analyses.iter_mut() {
            analysis.finalize();
            info!(
                "{}: {} of {} events passed ({:.2}%)",
                analysis.name(),
                cutflow.passed,
                cutflow.events,
                100. * cutflow.efficiency()
            );
        }
        self.finalized = true;
    }

    pub fn events(&self) -> usize {
        self.events
    }

    pub fn cutflow(&self, name: &str) -> Option<&Cutflow> {
        self.analyses
            .iter()
            .find(|(a, _)| a.name() == name)
            .map(|(_, c)| c)
    }

    pub fn histograms(&self, name: &str) -> Option<&HistogramSet> {
        self.analyses
            .iter()
            .find(|(a, _)| a.name() == name)
            .map(|(a, _)| a.histograms())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            events: self.events,
            jet_radius: self.settings.jet_radius,
            y_cut_max: self.settings.y_cut_max,
            analyses: self
                .analyses
                .iter()
                .map(|(a, c)| AnalysisSummary {
                    name: a.name().to_owned(),
                    cutflow: c.clone(),
                    histograms: a.histograms().iter().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Write `<analysis>.dat` histogram files and `summary.yaml` into `dir`.
    pub fn write(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        for (analysis, _) in &self.analyses {
            let path = dir.join(format!("{}.dat", analysis.name()));
            analysis.histograms().write_to_file(&path)?;
        }

        let path = dir.join("summary.yaml");
        let f = File::create(&path).map_err(|e| Error::io(&path, e))?;
        serde_yaml::to_writer(BufWriter::new(f), &self.summary())
            .map_err(|e| Error::yaml(format!("summary {}", path.display()), e))?;
        debug!("wrote run summary to {}", path.display());
        Ok(())
    }
}
