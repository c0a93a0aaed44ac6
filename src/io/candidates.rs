// src/io/candidates.rs

use crate::error::ExportError;
use crate::model::ProductCandidate;
use std::path::Path;
use tracing::info;

/// Writes candidates to CSV, one row per candidate in slice order.
pub fn write_candidates(
    path: impl AsRef<Path>,
    candidates: &[ProductCandidate],
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    for candidate in candidates {
        wtr.serialize(candidate)?;
    }
    wtr.flush()?;

    info!(rows = candidates.len(), path = %path.display(), "candidates exported");
    Ok(())
}

pub fn read_candidates(path: impl AsRef<Path>) -> Result<Vec<ProductCandidate>, ExportError> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path)?;
    let candidates = rdr
        .deserialize()
        .collect::<Result<Vec<ProductCandidate>, csv::Error>>()?;

    info!(rows = candidates.len(), path = %path.display(), "candidates loaded");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_written_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.csv");
        let candidates = vec![
            ProductCandidate {
                wholesale_price: 11.0,
                retail_price: 33.0,
                weight_g: 401.0,
                size_cm3: 1_001.0,
                shipping_cost_multiplier: 3.0,
                base_demand: 320.0,
            },
            ProductCandidate {
                wholesale_price: 1_001.0,
                retail_price: 1_751.75,
                weight_g: 5_001.0,
                size_cm3: 2_001.0,
                shipping_cost_multiplier: 1.0,
                base_demand: 160.0,
            },
        ];

        write_candidates(&path, &candidates).unwrap();
        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with(
            "wholesale_price,retail_price,weight_g,size_cm3,shipping_cost_multiplier,base_demand\n"
        ));
        assert_eq!(read_candidates(&path).unwrap(), candidates);
    }

    #[test]
    fn test_malformed_row_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "wholesale_price,retail_price,weight_g,size_cm3,shipping_cost_multiplier,base_demand"
        )
        .unwrap();
        writeln!(file, "10,thirty,500,1000,1,320").unwrap();
        file.flush().unwrap();

        assert!(matches!(read_candidates(file.path()), Err(ExportError::Csv(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_candidates(dir.path().join("absent.csv")).is_err());
    }
}
