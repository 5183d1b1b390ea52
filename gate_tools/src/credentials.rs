use serde_json::Value;

/// Converts a stored session credential into a `Cookie` header value.
///
/// Browser exports store cookies as a JSON array of `{"name": .., "value": ..}` objects; those are joined as
/// `name=value; name2=value2`. Anything else is taken to be a ready-made cookie string and used as is.
pub fn cookie_header(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(cookies)) => cookies
            .iter()
            .filter_map(|c| {
                let name = c["name"].as_str()?;
                let value = match &c["value"] {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                Some(format!("{name}={value}"))
            })
            .collect::<Vec<String>>()
            .join("; "),
        _ => raw.trim().to_string(),
    }
}
