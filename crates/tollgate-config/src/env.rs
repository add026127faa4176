use std::sync::LazyLock;

use regex::Regex;

/// Matches `{{ env.VAR }}` and `{{ env.VAR | default("fallback") }}`
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*env\.([A-Za-z0-9_]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
        .expect("placeholder pattern is valid")
});

/// Expand `{{ env.VAR }}` placeholders in a raw TOML string
///
/// Runs before deserialization so config structs use plain
/// `String`/`SecretString` fields. A placeholder without a `default(...)`
/// whose variable is unset is an error. TOML comment lines pass through
/// untouched.
pub fn expand_env(input: &str) -> Result<String, String> {
    expand_with(input, |var| std::env::var(var).ok())
}

fn expand_with<F>(input: &str, lookup: F) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line.trim_start().starts_with('#') {
            out.push_str(line);
            continue;
        }
        out.push_str(&expand_line(line, &lookup)?);
    }

    Ok(out)
}

fn expand_line<F>(line: &str, lookup: &F) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(line.len());
    let mut last_end = 0;

    for caps in PLACEHOLDER.captures_iter(line) {
        let whole = caps.get(0).expect("capture 0 always present");
        let var = &caps[1];
        let fallback = caps.get(2).map(|m| m.as_str());

        result.push_str(&line[last_end..whole.start()]);

        match lookup(var) {
            Some(value) => result.push_str(&value),
            None => match fallback {
                Some(value) => result.push_str(value),
                None => return Err(format!("environment variable {var} is not set")),
            },
        }

        last_end = whole.end();
    }

    result.push_str(&line[last_end..]);
    Ok(result)
}
