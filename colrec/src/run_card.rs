//! Generator run card for e+e- -> W+W- with hadronic W decays.
//!
//! The card is rendered into the `Key = value` command strings the generator
//! reads at start-up. The defaults reproduce the 240 GeV colour-reconnection
//! reference run.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunCard {
    pub nevents: usize,
    pub beam_a: i32,
    pub beam_b: i32,
    pub e_cm: f64,
    pub lepton_pdf: bool,
    pub isr: bool,
    /// Quark flavours the W bosons are allowed to decay into.
    pub w_decay_quarks: Vec<u8>,
    pub colour_reconnection: bool,
    pub colour_reconnection_mode: u8,
    pub force_resonance: bool,
    pub hadronize: bool,
    pub decay: bool,
    pub quiet: bool,
    pub seed: Option<u32>,
    pub hepmc_output: String,
    /// Extra raw commands appended after the generated ones.
    pub extra: Vec<String>,
}

impl Default for RunCard {
    fn default() -> RunCard {
        RunCard {
            nevents: 4000,
            beam_a: -11,
            beam_b: 11,
            e_cm: 240.,
            lepton_pdf: false,
            isr: true,
            w_decay_quarks: vec![1, 2, 3, 4, 5],
            colour_reconnection: true,
            colour_reconnection_mode: 1,
            force_resonance: true,
            hadronize: false,
            decay: false,
            quiet: true,
            seed: None,
            hepmc_output: "main131.hepmc".to_owned(),
            extra: vec![],
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

impl RunCard {
    pub fn new(filename: &Path) -> Result<RunCard> {
        let f = File::open(filename).map_err(|e| Error::io(filename, e))?;
        let reader = BufReader::new(f);
        let card: RunCard = serde_yaml::from_reader(reader)
            .map_err(|e| Error::yaml(format!("run card {}", filename.display()), e))?;
        card.validate()?;
        Ok(card)
    }

    pub fn from_yaml(input: &str) -> Result<RunCard> {
        let card: RunCard = serde_yaml::from_str(input).map_err(|e| Error::yaml("run card", e))?;
        card.validate()?;
        Ok(card)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidCard {
            card: "run",
            reason,
        };

        if !(self.e_cm > 0.) {
            return Err(invalid(format!("e_cm must be positive, got {}", self.e_cm)));
        }
        if self.nevents == 0 {
            return Err(invalid("nevents must be at least 1".to_owned()));
        }
        if self.w_decay_quarks.is_empty() {
            return Err(invalid("w_decay_quarks must not be empty".to_owned()));
        }
        if let Some(q) = self.w_decay_quarks.iter().find(|q| !(1..=6).contains(*q)) {
            return Err(invalid(format!("{} is not a quark id", q)));
        }
        if self.hepmc_output.is_empty() {
            return Err(invalid("hepmc_output must not be empty".to_owned()));
        }
        Ok(())
    }

    /// Generator commands in the order they have to be read.
    pub fn commands(&self) -> Vec<String> {
        let mut cmds = vec![
            format!("Main:numberOfEvents = {}", self.nevents),
            format!("Beams:idA = {}", self.beam_a),
            format!("Beams:idB = {}", self.beam_b),
            format!("Beams:eCM = {}", self.e_cm),
            format!("PDF:lepton = {}", on_off(self.lepton_pdf)),
        ];
        if !self.isr {
            cmds.push("PartonLevel:ISR = off".to_owned());
        }

        cmds.push("WeakDoubleBoson:ffbar2WW = on".to_owned());
        cmds.push("24:onMode = off".to_owned());
        let channels: Vec<String> = self.w_decay_quarks.iter().map(|q| q.to_string()).collect();
        cmds.push(format!("24:onIfAny = {}", channels.join(" ")));

        cmds.push(format!(
            "ColourReconnection:reconnect = {}",
            on_off(self.colour_reconnection)
        ));
        if self.colour_reconnection {
            cmds.push(format!(
                "ColourReconnection:mode = {}",
                self.colour_reconnection_mode
            ));
            cmds.push(format!(
                "ColourReconnection:forceResonance = {}",
                on_off(self.force_resonance)
            ));
        }

        cmds.push(format!("Print:quiet = {}", on_off(self.quiet)));
        cmds.push(format!("HadronLevel:Hadronize = {}", on_off(self.hadronize)));
        cmds.push(format!("HadronLevel:Decay = {}", on_off(self.decay)));

        if let Some(seed) = self.seed {
            cmds.push("Random:setSeed = on".to_owned());
            cmds.push(format!("Random:seed = {}", seed));
        }

        cmds.extend(self.extra.iter().cloned());
        cmds
    }

    /// Write the command file, with the event record destination as a comment header.
    pub fn write<W: Write>(&self, f: &mut W) -> std::io::Result<()> {
        writeln!(f, "! e+e- -> W+W- run, events written to {}", self.hepmc_output)?;
        for c in self.commands() {
            writeln!(f, "{}", c)?;
        }
        Ok(())
    }
}
