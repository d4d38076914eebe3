use anyhow::Context;
use env_logger::{Builder, Env, Target};
use std::fs::File;
use std::path::Path;

/// Send log records to `path`, since anything written to stdout or stderr
/// would corrupt the TUI.  The filter is taken from `RUST_LOG`, defaulting to
/// `info`.
pub(crate) fn init_file_logger(path: &Path) -> anyhow::Result<()> {
    let fp = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(fp)))
        .format_timestamp_millis()
        .try_init()
        .context("failed to install logger")?;
    Ok(())
}
