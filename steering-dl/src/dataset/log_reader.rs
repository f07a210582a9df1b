use super::Record;
use crate::common::*;

/// Appends the rows of a driving log to `records` and returns the extended list.
///
/// Every line is parsed as data; there is no header row. Referenced image
/// files are not checked here.
pub fn read_driving_log(path: impl AsRef<Path>, mut records: Vec<Record>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open driving log '{}'", path.display()))?;

    let num_orig = records.len();

    for row in reader.records() {
        let row = row.with_context(|| format!("failed to read driving log '{}'", path.display()))?;
        let record = Record::from_csv_row(&row).with_context(|| {
            let line = row.position().map(|pos| pos.line()).unwrap_or(0);
            format!("invalid row at line {} in '{}'", line, path.display())
        })?;
        records.push(record);
    }

    debug!(
        "read {} records from '{}'",
        records.len() - num_orig,
        path.display()
    );

    Ok(records)
}

/// Reads several driving logs into one combined record list, in the given order.
pub fn read_driving_logs<P>(paths: impl IntoIterator<Item = P>) -> Result<Vec<Record>>
where
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .try_fold(vec![], |records, path| read_driving_log(path, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_log(dir: &Path, name: &str, num_rows: usize) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        for index in 0..num_rows {
            writeln!(
                file,
                "{name}/center_{index}.jpg, {name}/left_{index}.jpg, {name}/right_{index}.jpg, {}, 0.0, 0.0, 30.0",
                index as f64 / 100.0,
            )
            .unwrap();
        }
        path
    }

    #[test]
    fn concatenate_driving_logs() {
        let dir = TempDir::new().unwrap();
        let forward = write_log(dir.path(), "forward", 100);
        let reverse = write_log(dir.path(), "reverse", 50);

        let records = read_driving_log(&forward, vec![]).unwrap();
        assert_eq!(records.len(), 100);
        let records = read_driving_log(&reverse, records).unwrap();
        assert_eq!(records.len(), 150);

        assert_eq!(records[0].center, Path::new("forward/center_0.jpg"));
        assert_eq!(records[0].left, Path::new("forward/left_0.jpg"));
        assert_eq!(records[100].right, Path::new("reverse/right_0.jpg"));
        assert_eq!(records[149].steering, 0.49);

        let combined = read_driving_logs([&forward, &reverse]).unwrap();
        assert_eq!(combined, records);
    }

    #[test]
    fn repeated_reads_do_not_share_state() {
        let dir = TempDir::new().unwrap();
        let path = write_log(dir.path(), "log", 3);

        let first = read_driving_log(&path, vec![]).unwrap();
        let second = read_driving_log(&path, vec![]).unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn first_line_is_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "a.jpg,b.jpg,c.jpg,0.5\n").unwrap();

        let records = read_driving_log(&path, vec![]).unwrap();
        assert_eq!(
            records,
            vec![Record {
                center: "a.jpg".into(),
                left: "b.jpg".into(),
                right: "c.jpg".into(),
                steering: 0.5,
            }]
        );
    }

    #[test]
    fn missing_log_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = read_driving_log(dir.path().join("missing.csv"), vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_row_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "a.jpg,b.jpg,c.jpg,0.5\na.jpg,b.jpg,c.jpg,straight\n").unwrap();

        let err = read_driving_log(&path, vec![]).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }
}
