use crate::errors::{Error, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub sum_w: f64,
    pub sum_w2: f64,
    pub entries: usize,
}

impl Bin {
    #[inline]
    fn fill(&mut self, weight: f64) {
        self.sum_w += weight;
        self.sum_w2 += weight * weight;
        self.entries += 1;
    }

    #[inline]
    fn scale(&mut self, factor: f64) {
        self.sum_w *= factor;
        self.sum_w2 *= factor * factor;
    }

    #[inline]
    pub fn error(&self) -> f64 {
        self.sum_w2.sqrt()
    }
}

/// One-dimensional histogram with equal-width bins plus under- and overflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histo1D {
    pub name: String,
    pub x_min: f64,
    pub x_max: f64,
    pub bins: Vec<Bin>,
    pub underflow: Bin,
    pub overflow: Bin,
}

impl Histo1D {
    pub fn new(name: impl Into<String>, n_bins: usize, x_min: f64, x_max: f64) -> Result<Histo1D> {
        let name = name.into();
        if n_bins == 0 || !(x_max > x_min) {
            return Err(Error::InvalidInput(format!(
                "histogram {} needs at least one bin and x_min < x_max (got {} bins on [{}, {}])",
                name, n_bins, x_min, x_max
            )));
        }

        Ok(Histo1D {
            name,
            x_min,
            x_max,
            bins: vec![Bin::default(); n_bins],
            underflow: Bin::default(),
            overflow: Bin::default(),
        })
    }

    #[inline]
    pub fn n_bins(&self) -> usize {
        self.bins.len()
    }

    /// Lower and upper edge of bin `i`.
    pub fn bin_edges(&self, i: usize) -> (f64, f64) {
        let n = self.bins.len() as f64;
        let lo = (self.x_max - self.x_min) * i as f64 / n + self.x_min;
        let hi = (self.x_max - self.x_min) * (i + 1) as f64 / n + self.x_min;
        (lo, hi)
    }

    /// Bin containing `x`, if it is inside `[x_min, x_max)`.
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        if !(x >= self.x_min && x < self.x_max) {
            return None;
        }
        let index = ((x - self.x_min) / (self.x_max - self.x_min) * self.bins.len() as f64) as usize;
        Some(index.min(self.bins.len() - 1))
    }

    pub fn fill(&mut self, x: f64, weight: f64) {
        if x.is_nan() {
            debug!("{}: ignoring NaN fill", self.name);
            return;
        }

        match self.find_bin(x) {
            Some(i) => self.bins[i].fill(weight),
            None if x < self.x_min => self.underflow.fill(weight),
            None => self.overflow.fill(weight),
        }
    }

    pub fn entries(&self) -> usize {
        self.bins.iter().map(|b| b.entries).sum::<usize>() + self.underflow.entries + self.overflow.entries
    }

    /// Sum of weights, optionally including under- and overflow.
    pub fn integral(&self, include_overflows: bool) -> f64 {
        let binned: f64 = self.bins.iter().map(|b| b.sum_w).sum();
        if include_overflows {
            binned + self.underflow.sum_w + self.overflow.sum_w
        } else {
            binned
        }
    }

    pub fn scale(&mut self, factor: f64) {
        for b in self.bins.iter_mut() {
            b.scale(factor);
        }
        self.underflow.scale(factor);
        self.overflow.scale(factor);
    }

    /// Rescale so that the total sum of weights, flows included, equals `norm`.
    /// An empty histogram is left alone.
    pub fn normalize(&mut self, norm: f64) {
        let current = self.integral(true);
        if current == 0. {
            warn!("{}: cannot normalize an empty histogram", self.name);
            return;
        }
        self.scale(norm / current);
    }

    pub fn write<W: Write>(&self, f: &mut W) -> std::io::Result<()> {
        writeln!(f, "##& xmin & xmax & central value & dy &\n")?;
        writeln!(
            f,
            "<histogram> {} \"{} |X_AXIS@LIN |Y_AXIS@LIN |TYPE@AL\"",
            self.bins.len(),
            self.name
        )?;

        for (i, b) in self.bins.iter().enumerate() {
            let (c1, c2) = self.bin_edges(i);
            writeln!(
                f,
                "  {:.8e}   {:.8e}   {:.8e}   {:.8e}",
                c1,
                c2,
                b.sum_w,
                b.error(),
            )?;
        }

        writeln!(f, "<\\histogram>")
    }
}

/// Histograms booked by one analysis, keyed by name in booking order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistogramSet {
    histograms: Vec<Histo1D>,
}

impl HistogramSet {
    pub fn new() -> HistogramSet {
        HistogramSet::default()
    }

    /// Book a new histogram and return its slot.
    pub fn book(&mut self, name: &str, n_bins: usize, x_min: f64, x_max: f64) -> Result<usize> {
        if self.get(name).is_some() {
            return Err(Error::InvalidInput(format!("histogram {} booked twice", name)));
        }
        self.histograms.push(Histo1D::new(name, n_bins, x_min, x_max)?);
        Ok(self.histograms.len() - 1)
    }

    #[inline]
    pub fn fill(&mut self, slot: usize, x: f64, weight: f64) {
        self.histograms[slot].fill(x, weight);
    }

    pub fn get(&self, name: &str) -> Option<&Histo1D> {
        self.histograms.iter().find(|h| h.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Histo1D> {
        self.histograms.iter()
    }

    pub fn normalize_all(&mut self, norm: f64) {
        for h in self.histograms.iter_mut() {
            h.normalize(norm);
        }
    }

    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    /// Write every histogram of the set to `path`, one block after the other.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut f = BufWriter::new(file);
        for h in &self.histograms {
            h.write(&mut f).map_err(|e| Error::io(path, e))?;
        }
        f.flush().map_err(|e| Error::io(path, e))?;
        info!("wrote {} histograms to {}", self.histograms.len(), path.display());
        Ok(())
    }
}
