use crate::stats::LinearModel;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_PARAMS_FILE: &str = "model_params.json";

#[derive(thiserror::Error, Debug)]
pub enum ParamsError {
    #[error("model parameters file {0} not found, train the model first")]
    Missing(PathBuf),
    #[error("malformed model parameters file {path}: {source}")]
    Malformed { path: PathBuf, source: serde_json::Error },
    #[error("model parameters are not finite: theta0 = {theta0}, theta1 = {theta1}")]
    NonFinite { theta0: f64, theta1: f64 },
    #[error("io error on {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

fn check_finite(model: &LinearModel) -> Result<(), ParamsError> {
    if model.is_finite() {
        Ok(())
    } else {
        Err(ParamsError::NonFinite { theta0: model.theta0, theta1: model.theta1 })
    }
}

/// Writes `{"theta0": .., "theta1": ..}` to `path`.
///
/// The document goes to a sibling temporary file first and is renamed into
/// place, an interrupted save leaves the previous file untouched.
pub fn save<P: AsRef<Path>>(path: P, model: &LinearModel) -> Result<(), ParamsError> {
    let path = path.as_ref();
    check_finite(model)?;

    let io_err = |source| ParamsError::Io { path: path.to_path_buf(), source };
    let json = serde_json::to_string_pretty(model)
        .map_err(|source| ParamsError::Malformed { path: path.to_path_buf(), source })?;

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    {
        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.write_all(b"\n").map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
    }
    fs::rename(&tmp, path).map_err(io_err)?;

    log::debug!("saved model parameters to {}", path.display());
    Ok(())
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<LinearModel, ParamsError> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ParamsError::Missing(path.to_path_buf()))
        },
        Err(source) => return Err(ParamsError::Io { path: path.to_path_buf(), source }),
    };

    let model: LinearModel = serde_json::from_str(&text)
        .map_err(|source| ParamsError::Malformed { path: path.to_path_buf(), source })?;
    check_finite(&model)?;

    log::debug!("loaded model parameters from {}: {}", path.display(), model);
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_PARAMS_FILE);
        let model = LinearModel::from_val(8499.599649933216, -0.0214489635917023);

        save(&path, &model).unwrap();
        assert_eq!(load(&path).unwrap(), model);

        // no temporary file left behind
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_document_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        save(&path, &LinearModel::from_val(1.5, -2.0)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["theta0"], 1.5);
        assert_eq!(value["theta1"], -2.0);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ParamsError::Missing(_)));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load(&path), Err(ParamsError::Malformed { .. })));

        fs::write(&path, r#"{"theta0": 1.0}"#).unwrap();
        assert!(matches!(load(&path), Err(ParamsError::Malformed { .. })));
    }

    #[test]
    fn test_refuses_non_finite_and_keeps_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let good = LinearModel::from_val(1.0, 2.0);
        save(&path, &good).unwrap();

        let err = save(&path, &LinearModel::from_val(f64::NAN, 2.0)).unwrap_err();
        assert!(matches!(err, ParamsError::NonFinite { .. }));
        assert_eq!(load(&path).unwrap(), good);
    }
}
