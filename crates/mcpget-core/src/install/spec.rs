//! Parsing of package arguments (`name@version`) and `KEY=VALUE` env pairs.

use std::collections::BTreeMap;

/// Version requested when none is given.
pub const LATEST: &str = "latest";

/// A package name with the version to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: String,
}

impl PackageSpec {
    /// Parse `input`, falling back to `flag_version` and then to `latest`.
    ///
    /// `pkg@1.2.3` is split once on the first `@`; the inline version wins
    /// over `flag_version`. Names starting with `@` (scoped names) are never
    /// split. An empty inline version (`pkg@`) means `latest`.
    pub fn parse(input: &str, flag_version: Option<&str>) -> Self {
        let fallback = flag_version
            .filter(|v| !v.is_empty())
            .unwrap_or(LATEST)
            .to_string();

        if input.starts_with('@') {
            return Self {
                name: input.to_string(),
                version: fallback,
            };
        }

        match input.split_once('@') {
            Some((name, version)) => Self {
                name: name.to_string(),
                version: if version.is_empty() {
                    LATEST.to_string()
                } else {
                    version.to_string()
                },
            },
            None => Self {
                name: input.to_string(),
                version: fallback,
            },
        }
    }
}

/// Split `KEY=VALUE` on the first `=`. A pair without `=` sets an empty value.
pub fn parse_env_pair(pair: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
    if key.is_empty() {
        anyhow::bail!("Invalid environment variable '{}': expected KEY=VALUE", pair);
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse several pairs; later duplicates win.
pub fn parse_env_pairs<I, S>(pairs: I) -> anyhow::Result<BTreeMap<String, String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut env = BTreeMap::new();
    for pair in pairs {
        let (key, value) = parse_env_pair(pair.as_ref())?;
        env.insert(key, value);
    }
    Ok(env)
}
