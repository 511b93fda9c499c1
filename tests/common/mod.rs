use std::sync::Mutex;

use finance_core::storage::JsonStore;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a file-backed store under a unique directory that outlives the test.
pub fn temp_store(name: &str) -> JsonStore {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join(format!("{name}.json"));
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    JsonStore::create(path, name).expect("create book store")
}
