// test_utils.rs

use std::env;
use std::path::{Path, PathBuf};

/// A scratch directory for tests. Set `KEEP_TEST_OUTPUT` to write under `test_output/` instead
/// of a temporary directory that is removed on drop.
pub struct TestDir {
    dir: PathBuf,
    #[allow(dead_code)]
    temp_dir: Option<tempfile::TempDir>,
}

impl TestDir {
    pub fn new(prefix: &str) -> std::io::Result<Self> {
        let keep_output = env::var("KEEP_TEST_OUTPUT").is_ok();
        if keep_output {
            let output_dir = env::current_dir()?.join("test_output").join(prefix);
            std::fs::create_dir_all(&output_dir)?;
            Ok(TestDir {
                dir: output_dir,
                temp_dir: None,
            })
        } else {
            let temp_dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
            let dir = temp_dir.path().to_path_buf();
            Ok(TestDir {
                dir,
                temp_dir: Some(temp_dir),
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}
