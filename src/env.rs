use toml::Table;

use crate::descriptor::FlagDescriptor;
use crate::error::CommandError;

/// Environment variable bound to `flag` under `prefix`.
///
/// The flag name is upper-cased and hyphens become underscores:
/// prefix `APP`, flag `enable-https` → `APP_ENABLE_HTTPS`.
pub fn env_var_name(prefix: &str, flag: &str) -> String {
    format!("{prefix}_{}", flag.to_uppercase().replace('-', "_"))
}

/// Build a table keyed by flag name from the environment variables bound to
/// `descriptors`.
///
/// Values are coerced by flag kind, so `APP_PORT=abc` on an int flag is an
/// error rather than a silently dropped value. Empty values count as unset.
///
/// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
pub fn env_to_table(
    prefix: &str,
    descriptors: &[FlagDescriptor],
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<Table, CommandError> {
    let vars: Vec<(String, String)> = vars.into_iter().collect();
    let mut table = Table::new();

    for descriptor in descriptors {
        let var = env_var_name(prefix, &descriptor.name);
        let Some((_, raw)) = vars.iter().rev().find(|(key, _)| *key == var) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        let value = descriptor
            .kind
            .parse(raw)
            .map_err(|reason| CommandError::InvalidValue {
                key: var.clone(),
                reason,
            })?;
        table.insert(descriptor.name.clone(), value);
    }

    Ok(table)
}

/// The process environment, skipping variables that are not valid UTF-8.
pub fn process_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}
