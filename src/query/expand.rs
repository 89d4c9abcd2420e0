//! Expansion path normalization and prefix pruning.

/// Delimiter accepted in client-supplied paths
pub const INPUT_DELIMITER: char = '/';

/// Delimiter used when handing paths to the data-access handle
pub const TARGET_DELIMITER: char = '.';

/// Rewrite `orders/items` as `orders.items`
pub fn normalize_path(path: &str) -> String {
    path.replace(INPUT_DELIMITER, &TARGET_DELIMITER.to_string())
}

/// Normalize every path, then drop each path that is a strict, dot-bounded
/// prefix of another declared path. Survivors keep their declared order.
pub fn most_specific_paths<S: AsRef<str>>(paths: &[S]) -> Vec<String> {
    let normalized: Vec<String> = paths.iter().map(|p| normalize_path(p.as_ref())).collect();

    normalized
        .iter()
        .filter(|path| {
            let bounded = format!("{}{}", path, TARGET_DELIMITER);
            !normalized.iter().any(|other| other.starts_with(&bounded))
        })
        .cloned()
        .collect()
}
