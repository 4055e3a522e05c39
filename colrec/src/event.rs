//! Event record consumed by the analyses.
//!
//! Events arrive already clustered: each jet carries its four-momentum and,
//! when known, the two pseudojets of its last clustering step. Files hold one
//! YAML document per event.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use vector::LorentzVector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jet {
    pub momentum: LorentzVector<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<(LorentzVector<f64>, LorentzVector<f64>)>,
}

impl Jet {
    pub fn new(momentum: LorentzVector<f64>) -> Jet {
        Jet {
            momentum,
            parents: None,
        }
    }

    pub fn with_parents(p1: LorentzVector<f64>, p2: LorentzVector<f64>) -> Jet {
        Jet {
            momentum: p1 + p2,
            parents: Some((p1, p2)),
        }
    }

    pub fn from_components(e: f64, px: f64, py: f64, pz: f64) -> Jet {
        Jet::new(LorentzVector::from_args(e, px, py, pz))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pid: i32,
    pub momentum: LorentzVector<f64>,
}

impl Particle {
    #[inline]
    pub fn is_quark(&self) -> bool {
        (1..=6).contains(&self.pid.abs())
    }
}

fn default_weight() -> f64 {
    1.
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub number: u64,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub jets: Vec<Jet>,
    #[serde(default)]
    pub particles: Vec<Particle>,
}

impl Event {
    pub fn new(number: u64, jets: Vec<Jet>) -> Event {
        Event {
            number,
            weight: 1.,
            jets,
            particles: vec![],
        }
    }

    pub fn quarks(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_quark())
    }
}

/// Iterates over the events of a multi-document YAML file.
///
/// The whole input is read and parsed into documents up front; events are
/// then deserialized one document at a time.
pub struct EventReader {
    documents: serde_yaml::Deserializer<'static>,
    source: String,
    read: usize,
}

impl EventReader {
    pub fn open(path: &Path) -> Result<EventReader> {
        let f = File::open(path).map_err(|e| Error::io(path, e))?;
        Ok(EventReader::from_reader(
            BufReader::new(f),
            path.display().to_string(),
        ))
    }

    pub fn from_reader<R: io::Read + 'static>(reader: R, source: impl Into<String>) -> EventReader {
        EventReader {
            documents: serde_yaml::Deserializer::from_reader(reader),
            source: source.into(),
            read: 0,
        }
    }

    pub fn parse_str(input: &str) -> EventReader {
        EventReader::from_reader(io::Cursor::new(input.to_owned()), "<string>")
    }

    /// Number of documents consumed so far.
    pub fn events_read(&self) -> usize {
        self.read
    }
}

impl Iterator for EventReader {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Result<Event>> {
        let document = self.documents.next()?;
        self.read += 1;
        Some(Event::deserialize(document).map_err(|e| {
            Error::yaml(format!("event {} in {}", self.read, self.source), e)
        }))
    }
}
