//! KPI post-processing.
//!
//! A kpi file holds, per transmitter, one sample per grid point with a
//! value for every kpi name. Processing turns it into per-transmitter
//! series plus the derived best, worst, mean and sum series that the
//! heatmaps draw.

use std::fmt;

use cgviz_core::{DVec3, EntityKind, ValueRange, VizError};
use indexmap::IndexMap;

/// One grid point of one transmitter.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiSample {
    pub position: DVec3,
    /// Missing or null values are `None`.
    pub values: IndexMap<String, Option<f64>>,
}

/// Decoded kpi file, transmitters in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawKpis {
    pub names: Vec<String>,
    /// Keyed by the raw transmitter tag, e.g. `Tx01`.
    pub transmitters: IndexMap<String, Vec<KpiSample>>,
}

/// Per-point extreme values and the transmitter that reached them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extremes {
    pub values: Vec<Option<f64>>,
    pub ids: Vec<Option<String>>,
}

impl Extremes {
    fn with_len(n: usize) -> Self {
        Self {
            values: vec![None; n],
            ids: vec![None; n],
        }
    }

    fn offer(&mut self, index: usize, value: f64, id: &str, better: impl Fn(f64, f64) -> bool) {
        let replace = match self.values[index] {
            Some(current) => better(value, current),
            None => true,
        };
        if replace {
            self.values[index] = Some(value);
            self.ids[index] = Some(id.to_string());
        }
    }

    /// Transmitter ids as numbers, for coverage maps.
    fn numeric_ids(&self) -> Vec<Option<f64>> {
        self.ids
            .iter()
            .map(|id| id.as_deref().and_then(|s| s.parse().ok()))
            .collect()
    }
}

/// Which series of a kpi a heatmap shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KpiSource {
    /// One transmitter, by id (digits of its tag).
    Transmitter(String),
    Best,
    Worst,
    Mean,
    Sum,
    /// Id of the best transmitter per point.
    Coverage,
    /// Id of the worst transmitter per point.
    Acoverage,
}

impl KpiSource {
    /// Parse a source label; anything that is not a derived series names a transmitter.
    pub fn parse(label: &str) -> Self {
        match label {
            "Best" => KpiSource::Best,
            "Worst" => KpiSource::Worst,
            "Mean" => KpiSource::Mean,
            "Sum" => KpiSource::Sum,
            "Coverage" => KpiSource::Coverage,
            "Acoverage" => KpiSource::Acoverage,
            id => KpiSource::Transmitter(id.to_string()),
        }
    }

    pub fn is_coverage(&self) -> bool {
        matches!(self, KpiSource::Coverage | KpiSource::Acoverage)
    }
}

impl fmt::Display for KpiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiSource::Transmitter(id) => f.write_str(id),
            KpiSource::Best => f.write_str("Best"),
            KpiSource::Worst => f.write_str("Worst"),
            KpiSource::Mean => f.write_str("Mean"),
            KpiSource::Sum => f.write_str("Sum"),
            KpiSource::Coverage => f.write_str("Coverage"),
            KpiSource::Acoverage => f.write_str("Acoverage"),
        }
    }
}

/// Processed kpis of one scenario.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiTable {
    pub names: Vec<String>,
    /// Grid points, taken from the first transmitter.
    pub coords: Vec<DVec3>,
    /// `tx[id][kpi]`
    pub tx: IndexMap<String, IndexMap<String, Vec<Option<f64>>>>,
    pub best: IndexMap<String, Extremes>,
    pub worst: IndexMap<String, Extremes>,
    pub mean: IndexMap<String, Vec<f64>>,
    pub sum: IndexMap<String, Vec<f64>>,
    /// `[min(worst), max(best)]` per kpi.
    pub ranges: IndexMap<String, ValueRange>,
}

impl KpiTable {
    /// Build the per-transmitter and derived series.
    ///
    /// Null samples are skipped by best and worst but count as zero in the
    /// sum, and the mean divides by the number of transmitters.
    pub fn process(raw: &RawKpis) -> Self {
        let coords: Vec<DVec3> = raw
            .transmitters
            .values()
            .next()
            .map(|samples| samples.iter().map(|s| s.position).collect())
            .unwrap_or_default();
        let n = coords.len();

        let mut tx: IndexMap<String, IndexMap<String, Vec<Option<f64>>>> = IndexMap::new();
        for (tag, samples) in &raw.transmitters {
            let id: String = tag.chars().filter(|c| c.is_ascii_digit()).collect();
            let series = raw
                .names
                .iter()
                .map(|name| {
                    let values = (0..n)
                        .map(|i| samples.get(i).and_then(|s| s.values.get(name).copied().flatten()))
                        .collect();
                    (name.clone(), values)
                })
                .collect();
            tx.insert(id, series);
        }

        let n_tx = tx.len();
        let mut table = KpiTable {
            names: raw.names.clone(),
            coords,
            ..Default::default()
        };

        for name in &raw.names {
            let mut best = Extremes::with_len(n);
            let mut worst = Extremes::with_len(n);
            let mut sum = vec![0.0; n];

            for (id, series) in &tx {
                let Some(values) = series.get(name) else { continue };
                for (i, value) in values.iter().enumerate() {
                    let Some(value) = *value else { continue };
                    best.offer(i, value, id, |a, b| a > b);
                    worst.offer(i, value, id, |a, b| a < b);
                    sum[i] += value;
                }
            }

            let mean = if n_tx == 0 {
                vec![0.0; n]
            } else {
                sum.iter().map(|s| s / n_tx as f64).collect()
            };

            let mut range = ValueRange::EMPTY;
            if let Some(min) = worst.values.iter().flatten().copied().reduce(f64::min) {
                range.min = min;
            }
            if let Some(max) = best.values.iter().flatten().copied().reduce(f64::max) {
                range.max = max;
            }

            table.best.insert(name.clone(), best);
            table.worst.insert(name.clone(), worst);
            table.mean.insert(name.clone(), mean);
            table.sum.insert(name.clone(), sum);
            table.ranges.insert(name.clone(), range);
        }

        log::info!(
            "Processed {} kpis over {} transmitters and {} points",
            table.names.len(),
            n_tx,
            n
        );
        table.tx = tx;
        table
    }

    fn unknown(&self, scenario: &str, kind: EntityKind, name: impl Into<String>) -> VizError {
        VizError::unknown(kind, scenario, name)
    }

    /// The series a heatmap of `kpi` from `source` shows.
    pub fn values(
        &self,
        scenario: &str,
        kpi: &str,
        source: &KpiSource,
    ) -> Result<Vec<Option<f64>>, VizError> {
        if !self.names.iter().any(|n| n == kpi) {
            return Err(self.unknown(scenario, EntityKind::Kpi, kpi));
        }
        let missing = || self.unknown(scenario, EntityKind::KpiSource, format!("{}_{}", kpi, source));

        let values = match source {
            KpiSource::Transmitter(id) => self
                .tx
                .get(id)
                .and_then(|series| series.get(kpi))
                .cloned()
                .ok_or_else(missing)?,
            KpiSource::Best => self.best.get(kpi).ok_or_else(missing)?.values.clone(),
            KpiSource::Worst => self.worst.get(kpi).ok_or_else(missing)?.values.clone(),
            KpiSource::Mean => self.mean.get(kpi).ok_or_else(missing)?.iter().copied().map(Some).collect(),
            KpiSource::Sum => self.sum.get(kpi).ok_or_else(missing)?.iter().copied().map(Some).collect(),
            KpiSource::Coverage => self.best.get(kpi).ok_or_else(missing)?.numeric_ids(),
            KpiSource::Acoverage => self.worst.get(kpi).ok_or_else(missing)?.numeric_ids(),
        };
        Ok(values)
    }

    /// The color domain of a heatmap of `kpi` from `source`.
    ///
    /// Coverage maps span the transmitter ids, every other source spans the
    /// kpi range.
    pub fn range(&self, scenario: &str, kpi: &str, source: &KpiSource) -> Result<ValueRange, VizError> {
        if source.is_coverage() {
            return Ok(self.tx.keys().filter_map(|id| id.parse::<f64>().ok()).collect());
        }
        self.ranges
            .get(kpi)
            .copied()
            .ok_or_else(|| self.unknown(scenario, EntityKind::Kpi, kpi))
    }
}
