use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const MIN_ROWS: usize = 2;

#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("could not open data file {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing {column} at row {row}")]
    MissingField { column: &'static str, row: usize },
    #[error("could not parse {column} '{value}' at row {row}")]
    Parse { column: &'static str, value: String, row: usize },
    #[error("non-finite {column} at row {row}")]
    NonFinite { column: &'static str, row: usize },
    #[error("insufficient data: got {got} rows, need at least {needed}")]
    NotEnoughRows { got: usize, needed: usize },
    #[error("invalid data: negative mileage {value} at row {row}")]
    NegativeMileage { value: f64, row: usize },
    #[error("invalid data: non-positive price {value} at row {row}")]
    NonPositivePrice { value: f64, row: usize },
}

/// Mileage/price observations, one entry per CSV row.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dataset {
    pub mileage: Vec<f64>,
    pub price: Vec<f64>,
}

pub fn mk_rdr<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().delimiter(b',').has_headers(true).trim(csv::Trim::All).from_reader(reader)
}

fn parse_field(
    record: &csv::StringRecord,
    idx: usize,
    column: &'static str,
    row: usize,
) -> Result<f64, DataError> {
    let raw = record.get(idx).filter(|s| !s.is_empty()).ok_or(DataError::MissingField { column, row })?;
    let value: f64 =
        raw.parse().map_err(|_| DataError::Parse { column, value: raw.to_string(), row })?;
    if !value.is_finite() {
        return Err(DataError::NonFinite { column, row });
    }
    Ok(value)
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.mileage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mileage.is_empty()
    }

    /// Reads a headed two-column CSV: mileage first, price second. Extra
    /// columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = mk_rdr(reader);
        let mut data = Dataset::default();

        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            // header is row 1
            let row = i + 2;
            data.mileage.push(parse_field(&record, 0, "mileage", row)?);
            data.price.push(parse_field(&record, 1, "price", row)?);
        }

        if data.len() < MIN_ROWS {
            return Err(DataError::NotEnoughRows { got: data.len(), needed: MIN_ROWS });
        }
        Ok(data)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|source| DataError::Io { path: path.display().to_string(), source })?;
        let data = Self::from_reader(file)?;
        log::debug!("loaded {} rows from {}", data.len(), path.display());
        Ok(data)
    }

    /// Training needs non-negative mileage and strictly positive prices.
    pub fn validate_for_training(&self) -> Result<(), DataError> {
        for (i, (&m, &p)) in self.mileage.iter().zip(&self.price).enumerate() {
            let row = i + 2;
            if m < 0.0 {
                return Err(DataError::NegativeMileage { value: m, row });
            }
            if p <= 0.0 {
                return Err(DataError::NonPositivePrice { value: p, row });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "km,price\n240000,3650\n139800,3800\n150500,4400\n185530,4450\n";

    #[test]
    fn test_reads_two_columns() {
        let data = Dataset::from_reader(DATA.as_bytes()).unwrap();
        assert_eq!(data.mileage, vec![240000., 139800., 150500., 185530.]);
        assert_eq!(data.price, vec![3650., 3800., 4400., 4450.]);
        assert!(!data.is_empty());
        assert!(data.validate_for_training().is_ok());
        assert!(Dataset::default().is_empty());
    }

    #[test]
    fn test_whitespace_and_extra_columns() {
        let data = Dataset::from_reader("km, price, note\n 10 , 100 ,a\n20,90,b\n".as_bytes()).unwrap();
        assert_eq!(data.mileage, vec![10., 20.]);
        assert_eq!(data.price, vec![100., 90.]);
    }

    #[test]
    fn test_rejects_unparseable_cell() {
        let err = Dataset::from_reader("km,price\n10,100\nabc,90\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Parse { column: "mileage", row: 3, .. }), "{err}");
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = Dataset::from_reader("km,price\n10,100\n20,inf\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::NonFinite { column: "price", row: 3 }), "{err}");

        let err = Dataset::from_reader("km,price\nNaN,100\n20,90\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::NonFinite { column: "mileage", row: 2 }), "{err}");
    }

    #[test]
    fn test_missing_field() {
        let err = Dataset::from_reader("km,price\n10,100\n20,\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingField { column: "price", row: 3 }), "{err}");
    }

    #[test]
    fn test_not_enough_rows() {
        let err = Dataset::from_reader("km,price\n10,100\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::NotEnoughRows { got: 1, needed: 2 }));
    }

    #[test]
    fn test_training_validation() {
        let data = Dataset { mileage: vec![10., -1.], price: vec![100., 90.] };
        assert!(matches!(
            data.validate_for_training(),
            Err(DataError::NegativeMileage { row: 3, .. })
        ));

        let data = Dataset { mileage: vec![10., 20.], price: vec![0., 90.] };
        assert!(matches!(
            data.validate_for_training(),
            Err(DataError::NonPositivePrice { row: 2, .. })
        ));
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut tmp = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        write!(tmp, "{DATA}").unwrap();
        tmp.flush().unwrap();

        let data = Dataset::from_file(tmp.path()).unwrap();
        assert_eq!(data.len(), 4);

        let err = Dataset::from_file(tmp.path().with_extension("missing")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
