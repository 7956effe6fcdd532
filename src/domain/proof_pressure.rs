// Row merge and gap filling for the proof-pressure charts
use super::frame::SensorFrame;

/// A frame row picked by a merge, tagged with the source column it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRow {
    pub row: usize,
    pub source: usize,
}

/// Pick, for each source column, the rows whose reading exceeds `sill`, then
/// interleave them by timestamp. Rows sharing a timestamp keep source order.
pub fn merge_above(frame: &SensorFrame, sources: &[&[f64]], sill: f64) -> Vec<MergedRow> {
    let mut merged: Vec<MergedRow> = sources
        .iter()
        .enumerate()
        .flat_map(|(source, values)| {
            values
                .iter()
                .enumerate()
                .filter(move |(_, v)| **v > sill)
                .map(move |(row, _)| MergedRow { row, source })
        })
        .collect();

    let timestamps = frame.timestamps();
    merged.sort_by_key(|m| timestamps[m.row]);
    merged
}

/// Spread one source column over the merged rows, leaving `NaN` on rows that
/// belong to another source.
pub fn spread(merged: &[MergedRow], source: usize, values: &[f64]) -> Vec<f64> {
    merged
        .iter()
        .map(|m| if m.source == source { values[m.row] } else { f64::NAN })
        .collect()
}

/// Fill `NaN` gaps linearly by row position.
///
/// Interior gaps are interpolated between their neighbours, trailing gaps
/// repeat the last known value and leading gaps stay empty.
pub fn interpolate_linear(values: &mut [f64]) {
    let mut last_known: Option<usize> = None;

    for i in 0..values.len() {
        if values[i].is_nan() {
            continue;
        }
        if let Some(prev) = last_known {
            let span = (i - prev) as f64;
            let (start, end) = (values[prev], values[i]);
            for (step, j) in (prev + 1..i).enumerate() {
                values[j] = start + (end - start) * (step + 1) as f64 / span;
            }
        }
        last_known = Some(i);
    }

    if let Some(last) = last_known {
        let fill = values[last];
        for v in &mut values[last + 1..] {
            *v = fill;
        }
    }
}
