use std::path::{Path, PathBuf};

use crate::utils::constants::{DEFAULT_OUTPUT_DIR, HISTORY_FILE, METRICS_FILE_STEM, RANKING_FILE};

/// Default output directory, relative to the working directory.
pub fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

/// `<dir>/median_price_growth_by_mesh_block.<extension>`
pub fn metrics_output_path(output_dir: &Path, extension: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", METRICS_FILE_STEM, extension))
}

pub fn ranking_output_path(output_dir: &Path) -> PathBuf {
    output_dir.join(RANKING_FILE)
}

pub fn history_output_path(output_dir: &Path) -> PathBuf {
    output_dir.join(HISTORY_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_output_path() {
        let path = metrics_output_path(&default_output_dir(), "csv");
        let path_str = path.to_string_lossy();

        assert!(path_str.starts_with("output"));
        assert!(path_str.ends_with("median_price_growth_by_mesh_block.csv"));

        let parquet = metrics_output_path(Path::new("/tmp/run"), "parquet");
        assert_eq!(
            parquet,
            PathBuf::from("/tmp/run/median_price_growth_by_mesh_block.parquet")
        );
    }

    #[test]
    fn test_chart_data_paths() {
        let dir = Path::new("results");
        assert_eq!(ranking_output_path(dir), PathBuf::from("results/top_growth_areas.csv"));
        assert_eq!(history_output_path(dir), PathBuf::from("results/top_price_history.csv"));
    }
}
