use std::path::PathBuf;

pub fn fixtures_dir() -> String {
    format!("{}/tests/fixtures/scenarios", env!("CARGO_MANIFEST_DIR"))
}

#[allow(dead_code)]
pub fn fixture(name: &str) -> String {
    format!("{}/{}", fixtures_dir(), name)
}

/// Fresh per-process temp directory; callers remove it when done.
#[allow(dead_code)]
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("safetynet-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
