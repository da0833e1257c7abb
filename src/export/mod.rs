pub mod excel;
pub mod pdf;

use std::path::{Path, PathBuf};

/// 出力先がフォルダなら `{stem}.{extension}` を付ける
pub fn output_path_for(output: &Path, stem: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", stem, extension))
    } else {
        output.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("out"), "breakdown", "xlsx"),
            PathBuf::from("out/breakdown.xlsx")
        );
        assert_eq!(
            output_path_for(Path::new("out/custom.xlsx"), "breakdown", "xlsx"),
            PathBuf::from("out/custom.xlsx")
        );
    }
}
