//! Load-time filtering of the native command allowlist.

use crate::patterns::DANGEROUS_COMMAND_PATTERNS;

/// Drop blank entries and entries that embed a dangerous command fragment.
///
/// Dangerous patterns are searched anywhere in the entry, not only at its
/// start. A pattern that cannot be evaluated drops the entry. Survivors keep
/// their original order.
pub fn sanitize_allowlist<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .filter_map(|entry| {
            let entry = entry.as_ref();
            if entry.trim().is_empty() {
                return None;
            }
            if is_dangerous_entry(entry) {
                return None;
            }
            Some(entry.to_string())
        })
        .collect()
}

fn is_dangerous_entry(entry: &str) -> bool {
    for pattern in DANGEROUS_COMMAND_PATTERNS.iter() {
        match pattern.search(entry) {
            Ok(false) => {}
            Ok(true) => {
                tracing::warn!(
                    entry,
                    pattern = pattern.source(),
                    "Dropping allowlist entry matching dangerous pattern ({})",
                    pattern.description()
                );
                return true;
            }
            Err(e) => {
                tracing::error!(
                    entry,
                    pattern = pattern.source(),
                    error = %e,
                    "Could not evaluate dangerous pattern; dropping allowlist entry"
                );
                return true;
            }
        }
    }
    false
}
