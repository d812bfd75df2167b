// SkySwitcher Input Layer - Device Filtering
// Device matching logic for autodetection and manual selection

/// Check if a device should be opened.
///
/// 1. If explicit names/paths are given, only devices matching one of them
///    by path or exact name are used, whatever they look like.
/// 2. Otherwise (autodetect) virtual devices, devices with a non-keyboard
///    name and devices lacking keyboard capabilities are excluded.
pub fn matches_device_filter(
    device_name: &str,
    device_path: &str,
    filter_names: &[String],
    is_keyboard: bool,
    is_virtual: bool,
    is_ignored: bool,
) -> bool {
    if !filter_names.is_empty() {
        return filter_names
            .iter()
            .any(|match_name| device_path == match_name || device_name == match_name);
    }

    !is_virtual && !is_ignored && is_keyboard
}

/// Resolve path entries of a device filter to the node they point at.
///
/// `/dev/input/by-id/...` and `/dev/input/by-path/...` are symlinks, while
/// enumeration reports `/dev/input/eventN`. Names and paths that cannot be
/// resolved are kept as given.
pub fn resolve_device_filter(filter_names: &[String]) -> Vec<String> {
    filter_names
        .iter()
        .map(|entry| {
            if !entry.starts_with('/') {
                return entry.clone();
            }
            match std::fs::canonicalize(entry) {
                Ok(resolved) => {
                    let resolved = resolved.display().to_string();
                    if resolved != *entry {
                        log::debug!("device {} resolves to {}", entry, resolved);
                    }
                    resolved
                }
                Err(_) => entry.clone(),
            }
        })
        .collect()
}
