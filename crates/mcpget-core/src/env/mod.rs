//! Placeholder resolution for launch config environment variables.
//!
//! A placeholder is an env value of the exact form `${NAME}`. The whole value
//! must be one placeholder, so `prefix-${NAME}` is a plain string. The name
//! match is greedy: `${A}${B}` names the variable `A}${B`.
//! Substitution is one-shot: a resolved value is never scanned again.

use std::collections::BTreeMap;

/// Name referenced by `value` if it is a single `${NAME}` placeholder.
pub fn placeholder_name(value: &str) -> Option<&str> {
    let name = value.strip_prefix("${")?.strip_suffix('}')?;
    if name.is_empty() || name.contains(['\n', '\r', '\u{2028}', '\u{2029}']) {
        return None;
    }
    Some(name)
}

/// Read a variable from the process environment. Empty values count as unset.
pub fn process_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Substitute placeholders from the process environment.
pub fn resolve_placeholders(env: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    resolve_placeholders_with(env, process_lookup)
}

/// Substitute placeholders using `lookup`; unresolved placeholders keep their literal form.
pub fn resolve_placeholders_with<F>(
    env: &BTreeMap<String, String>,
    lookup: F,
) -> BTreeMap<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    env.iter()
        .map(|(key, value)| {
            let resolved = placeholder_name(value)
                .and_then(&lookup)
                .unwrap_or_else(|| value.clone());
            (key.clone(), resolved)
        })
        .collect()
}

/// Names of placeholders with no value in the process environment.
pub fn find_unresolved(env: &BTreeMap<String, String>) -> Vec<String> {
    find_unresolved_with(env, process_lookup)
}

/// Names of placeholders `lookup` cannot resolve, in env order. Duplicates are kept.
pub fn find_unresolved_with<F>(env: &BTreeMap<String, String>, lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    env.values()
        .filter_map(|value| placeholder_name(value))
        .filter(|name| lookup(name).is_none())
        .map(str::to_string)
        .collect()
}
