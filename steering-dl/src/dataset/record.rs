use crate::common::*;
use csv::StringRecord;

/// One row of a driving log: three camera frames and the recorded steering angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub center: PathBuf,
    pub left: PathBuf,
    pub right: PathBuf,
    pub steering: f64,
}

impl Record {
    /// Builds a record from the leading `center,left,right,steering` columns of a CSV row.
    ///
    /// Trailing columns, such as throttle, brake and speed written by the
    /// simulator, are ignored.
    pub fn from_csv_row(row: &StringRecord) -> Result<Self> {
        ensure!(
            row.len() >= 4,
            "expect at least 4 columns, but found {}",
            row.len()
        );

        let steering: f64 = row[3]
            .parse()
            .with_context(|| format!("invalid steering value '{}'", &row[3]))?;

        Ok(Self {
            center: row[0].into(),
            left: row[1].into(),
            right: row[2].into(),
            steering,
        })
    }
}
