use std::path::Path;

/// Lay down a minimal `assetforge.toml` pointing every path-valued
/// setting at subdirectories of `path`, the way `butido`'s
/// `tests/common.rs` sets up a scratch `config.toml` per test.
pub fn write_config<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    let path = path.as_ref();
    let contents = format!(
        "cache_dir = \"{cache}\"\ngraph_store_path = \"{graph}\"\nlog_dir = \"{log}\"\n",
        cache = path.join("cache").display(),
        graph = path.join("graph.json").display(),
        log = path.join("log").display(),
    );
    std::fs::write(path.join("assetforge.toml"), contents)?;
    Ok(())
}
