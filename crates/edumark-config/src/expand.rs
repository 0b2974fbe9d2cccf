//! Environment variable expansion for configuration strings.
//!
//! - `${VAR}` expands to the value of VAR and errors if it is unset
//! - `${VAR:-default}` falls back to `default` when VAR is unset
//!
//! Bare `$VAR` is left alone so literal dollar signs in URLs survive.

use std::cell::RefCell;
use std::convert::Infallible;

use crate::ConfigError;

/// Expand `${...}` references in `value`. `field` names the config key in errors.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let unset = RefCell::new(Vec::new());
    let expanded = shellexpand::env_with_context(value, |var| -> Result<Option<String>, Infallible> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => {
                unset.borrow_mut().push(var.to_owned());
                Ok(None)
            }
        }
    })
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} could not be expanded", e.var_name),
    })?
    .into_owned();

    // An unset variable without a default is left verbatim by the expander
    if let Some(var) = unset
        .into_inner()
        .into_iter()
        .find(|var| expanded.contains(&format!("${{{var}}}")))
    {
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{var}}} not set"),
        });
    }

    Ok(expanded)
}
