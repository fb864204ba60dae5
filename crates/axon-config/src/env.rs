use std::sync::OnceLock;

use regex::Regex;

/// Expand `{{ env.VAR }}` placeholders in a raw TOML string
///
/// An optional fallback can be supplied as `{{ env.VAR | default("x") }}`;
/// it is used when the variable is unset. A placeholder without a fallback
/// referencing an unset variable is an error. Comment lines are passed
/// through untouched so commented-out secrets do not fail the load.
pub fn expand_env(input: &str) -> Result<String, String> {
    fn placeholder() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        // Group 1: dotted key (`env.VAR`); group 2: optional default text
        RE.get_or_init(|| {
            Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
                .expect("must be valid regex")
        })
    }

    let mut output = String::with_capacity(input.len());

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            output.push('\n');
        }

        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut last_end = 0;
        for captures in placeholder().captures_iter(line) {
            let overall = captures.get(0).expect("capture 0 always present");
            output.push_str(&line[last_end..overall.start()]);
            output.push_str(&resolve(
                captures.get(1).expect("key group").as_str(),
                captures.get(2).map(|m| m.as_str()),
            )?);
            last_end = overall.end();
        }
        output.push_str(&line[last_end..]);
    }

    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

/// Resolve a single `env.VAR` key against the process environment
fn resolve(key: &str, default_value: Option<&str>) -> Result<String, String> {
    let Some(var_name) = key.strip_prefix("env.") else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };
    if var_name.contains('.') {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    }

    match std::env::var(var_name) {
        Ok(value) => Ok(value),
        Err(_) => default_value
            .map(str::to_owned)
            .ok_or_else(|| format!("environment variable not found: `{var_name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_without_placeholders() {
        let input = "key = \"value\"";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn expands_set_variable() {
        temp_env::with_var("AXON_TEST_VAR", Some("hello"), || {
            let result = expand_env("key = \"{{ env.AXON_TEST_VAR }}\"").unwrap();
            assert_eq!(result, "key = \"hello\"");
        });
    }

    #[test]
    fn missing_variable_without_default_errors() {
        temp_env::with_var_unset("AXON_MISSING", || {
            let err = expand_env("key = \"{{ env.AXON_MISSING }}\"").unwrap_err();
            assert!(err.contains("AXON_MISSING"));
        });
    }

    #[test]
    fn missing_variable_with_default_uses_fallback() {
        temp_env::with_var_unset("AXON_MISSING", || {
            let result = expand_env("key = \"{{ env.AXON_MISSING | default(\"fallback\") }}\"").unwrap();
            assert_eq!(result, "key = \"fallback\"");
        });
    }

    #[test]
    fn set_variable_wins_over_default() {
        temp_env::with_var("AXON_SET", Some("actual"), || {
            let result = expand_env("key = \"{{ env.AXON_SET | default(\"fallback\") }}\"").unwrap();
            assert_eq!(result, "key = \"actual\"");
        });
    }

    #[test]
    fn unsupported_scope_errors() {
        let err = expand_env("key = \"{{ secrets.FOO }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn comment_lines_are_not_expanded() {
        temp_env::with_var_unset("AXON_MISSING", || {
            let input = "  # key = \"{{ env.AXON_MISSING }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
