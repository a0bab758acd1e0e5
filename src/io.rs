use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::Array2;
use tracing::{debug, info};

use crate::error::{Result, TrainerError};
use crate::recording::Recording;

const TIME_COLUMN: &str = "time";

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> TrainerError + '_ {
    move |source| TrainerError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> TrainerError + '_ {
    move |source| TrainerError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads a recording whose first column is `time` in seconds and whose other
/// columns are channels. The sample rate is the mean rate over the time column.
pub fn read_csv(path: &Path) -> Result<Recording> {
    let invalid = |reason: String| TrainerError::InvalidRecording {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(io_error(path))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let headers = reader.headers().map_err(csv_error(path))?.clone();
    match headers.get(0) {
        Some(first) if first.trim() == TIME_COLUMN => {}
        other => {
            return Err(invalid(format!(
                "first column must be '{TIME_COLUMN}', found {other:?}"
            )))
        }
    }
    let ch_names: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();
    if ch_names.is_empty() {
        return Err(invalid("no channel columns".into()));
    }

    let mut times = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); ch_names.len()];
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error(path))?;
        let mut values = record.iter().map(|field| field.trim().parse::<f64>());
        let parse_failed = |col: usize| invalid(format!("row {}: column {col} is not a number", row + 2));

        times.push(
            values
                .next()
                .and_then(|v| v.ok())
                .ok_or_else(|| parse_failed(0))?,
        );
        for (col, column) in columns.iter_mut().enumerate() {
            let value = values
                .next()
                .and_then(|v| v.ok())
                .ok_or_else(|| parse_failed(col + 1))?;
            column.push(value);
        }
    }

    if times.len() < 2 {
        return Err(invalid(format!("need at least 2 samples, found {}", times.len())));
    }
    if let Some(w) = times.windows(2).find(|w| !(w[1] > w[0])) {
        return Err(invalid(format!(
            "time must increase, found {} after {}",
            w[1], w[0]
        )));
    }
    let sfreq = (times.len() - 1) as f64 / (times[times.len() - 1] - times[0]);

    let n_samples = times.len();
    let data = Array2::from_shape_vec((ch_names.len(), n_samples), columns.concat())
        .map_err(|e| invalid(e.to_string()))?;

    info!(
        path = %path.display(),
        channels = ch_names.len(),
        samples = n_samples,
        sfreq,
        "recording loaded"
    );
    Recording::new(sfreq, ch_names, data)
}

/// Writes `recording` in the layout [`read_csv`] expects.
pub fn write_csv(recording: &Recording, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(path))?;
    }
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    let mut header = vec![TIME_COLUMN.to_string()];
    header.extend(recording.ch_names().iter().cloned());
    writer.write_record(&header).map_err(csv_error(path))?;

    let sfreq = recording.sfreq();
    for (i, column) in recording.data().columns().into_iter().enumerate() {
        let mut row = Vec::with_capacity(column.len() + 1);
        row.push((i as f64 / sfreq).to_string());
        row.extend(column.iter().map(|v| format!("{v:.4}")));
        writer.write_record(&row).map_err(csv_error(path))?;
    }
    writer.flush().map_err(io_error(path))?;
    debug!(path = %path.display(), "recording written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn reads_channels_and_sample_rate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.csv");
        fs::write(
            &path,
            "time,EEG 001,EOG 061\n0.00,1.5,10\n0.01,2.5,20\n0.02,3.5,30\n",
        )
        .unwrap();

        let rec = read_csv(&path).unwrap();

        assert_eq!(rec.ch_names(), &["EEG 001", "EOG 061"]);
        assert!((rec.sfreq() - 100.0).abs() < 1e-9);
        assert_eq!(rec.n_samples(), 3);
        assert_eq!(rec.channel("EOG 061").unwrap().to_vec(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn written_file_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache").join("rec.csv");
        let rec = Recording::new(
            50.0,
            vec!["A".into(), "B".into()],
            array![[1.0, -2.0, 3.25], [0.5, 0.0, -0.125]],
        )
        .unwrap();

        write_csv(&rec, &path).unwrap();
        let back = read_csv(&path).unwrap();

        assert_eq!(back.ch_names(), rec.ch_names());
        assert!((back.sfreq() - 50.0).abs() < 1e-6);
        assert_eq!(back.data(), rec.data());
    }

    #[test]
    fn rejects_missing_time_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.csv");
        fs::write(&path, "EEG 001,EOG 061\n1,2\n3,4\n").unwrap();
        assert_matches!(read_csv(&path), Err(TrainerError::InvalidRecording { .. }));
    }

    #[test]
    fn rejects_single_sample() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.csv");
        fs::write(&path, "time,EEG 001\n0.0,1\n").unwrap();
        assert_matches!(read_csv(&path), Err(TrainerError::InvalidRecording { .. }));
    }

    #[test]
    fn rejects_time_going_backwards() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.csv");
        fs::write(&path, "time,EEG 001\n0.0,1\n0.1,2\n0.05,3\n").unwrap();
        assert_matches!(read_csv(&path), Err(TrainerError::InvalidRecording { .. }));
    }

    #[test]
    fn rejects_non_numeric_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.csv");
        fs::write(&path, "time,EEG 001\n0.0,1\n0.1,oops\n").unwrap();
        assert_matches!(
            read_csv(&path),
            Err(TrainerError::InvalidRecording { reason, .. }) if reason.contains("row 3")
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        assert_matches!(
            read_csv(&dir.path().join("nope.csv")),
            Err(TrainerError::Io { .. })
        );
    }
}
