use crate::analysis::ALL_ANALYSES;
use crate::dijet::DijetCuts;
use crate::errors::{Error, Result};
use crate::jets::DEFAULT_Y_CUT_MAX;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Analysis-side settings. Every field is optional in the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsCard {
    pub y_cut_max: f64,
    /// Radius the external clustering was run with; only recorded in the summary.
    pub jet_radius: f64,
    pub jet_min_pt: f64,
    pub dijet: DijetCuts,
    pub analyses: Vec<String>,
    pub output_dir: String,
}

impl Default for SettingsCard {
    fn default() -> SettingsCard {
        SettingsCard {
            y_cut_max: DEFAULT_Y_CUT_MAX,
            jet_radius: 0.7,
            jet_min_pt: 20.,
            dijet: DijetCuts::default(),
            analyses: ALL_ANALYSES.iter().map(|s| s.to_string()).collect(),
            output_dir: "colrec_output".to_owned(),
        }
    }
}

impl SettingsCard {
    pub fn new(filename: &Path) -> Result<SettingsCard> {
        let f = File::open(filename).map_err(|e| Error::io(filename, e))?;
        let reader = BufReader::new(f);
        let card: SettingsCard = serde_yaml::from_reader(reader)
            .map_err(|e| Error::yaml(format!("settings card {}", filename.display()), e))?;
        card.validate()?;
        Ok(card)
    }

    pub fn from_yaml(input: &str) -> Result<SettingsCard> {
        let card: SettingsCard =
            serde_yaml::from_str(input).map_err(|e| Error::yaml("settings card", e))?;
        card.validate()?;
        Ok(card)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidCard {
            card: "settings",
            reason,
        };

        if !(self.y_cut_max > 0.) {
            return Err(invalid(format!("y_cut_max must be positive, got {}", self.y_cut_max)));
        }
        if self.jet_min_pt < 0. {
            return Err(invalid(format!("jet_min_pt must not be negative, got {}", self.jet_min_pt)));
        }
        let d = &self.dijet;
        if !(d.narrow_angle_max.is_finite() && d.narrow_angle_max > 0.) {
            return Err(invalid(format!(
                "narrow_angle_max must be a positive angle, got {}",
                d.narrow_angle_max
            )));
        }
        if !(d.wide_angle_min <= d.wide_angle_max) {
            return Err(invalid(format!(
                "empty wide-angle window [{}, {}]",
                d.wide_angle_min, d.wide_angle_max
            )));
        }
        if let Some(unknown) = self
            .analyses
            .iter()
            .find(|a| !ALL_ANALYSES.contains(&a.as_str()))
        {
            return Err(Error::UnknownAnalysis(unknown.clone()));
        }
        Ok(())
    }
}
