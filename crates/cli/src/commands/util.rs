use std::path::Path;

use anyhow::Result;
use seminal_core::config::{load_slicer_config, load_target_lines, SlicerConfig, TargetLines};
use tracing::debug;

/// Load the slicer config at `path`, or the defaults when none is given.
pub fn load_config(path: Option<&str>) -> Result<SlicerConfig> {
    match path {
        Some(p) => load_slicer_config(Path::new(p)),
        None => Ok(SlicerConfig::default()),
    }
}

/// Merge `--line` values with a target file.
///
/// An explicit `--targets` file is always read (best-effort). Without one, and
/// with no `--line` values, the config's `targets_file` is read if it exists.
/// An empty result makes the analysis fall back to branch lines.
pub fn resolve_targets(
    config: &SlicerConfig,
    targets_file: Option<&str>,
    lines: &[u32],
) -> TargetLines {
    let mut targets = TargetLines::new(lines.iter().copied());
    match targets_file {
        Some(path) => targets.extend(load_target_lines(Path::new(path)).iter()),
        None if lines.is_empty() => {
            if let Some(default) = config.targets_file.as_deref() {
                let path = Path::new(default);
                if path.is_file() {
                    targets.extend(load_target_lines(path).iter());
                } else {
                    debug!(path = default, "no default target file");
                }
            }
        }
        None => {}
    }
    targets
}
