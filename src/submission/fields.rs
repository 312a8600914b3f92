use serde_json::Value;

use super::Submission;

pub const FIELD_NAMES: [&str; 3] = ["name", "email", "description"];

/// Pull the three submission fields out of a parsed body.
///
/// Strict mode requires every field to be present as a string. Otherwise
/// absent or null fields become empty strings and scalar values are
/// stringified.
pub fn extract(raw: &Value, strict: bool) -> Result<Submission, String> {
    let Some(obj) = raw.as_object() else {
        return Err("Request body must be a JSON object".to_string());
    };

    let mut values = Vec::with_capacity(FIELD_NAMES.len());
    let mut problems = Vec::new();

    for name in FIELD_NAMES {
        match (obj.get(name), strict) {
            (Some(Value::String(s)), _) => values.push(s.clone()),
            (None | Some(Value::Null), false) => values.push(String::new()),
            (Some(Value::Number(n)), false) => values.push(n.to_string()),
            (Some(Value::Bool(b)), false) => values.push(b.to_string()),
            (None | Some(Value::Null), true) => problems.push(format!("Missing required field: {name}")),
            (Some(_), _) => problems.push(format!("Field must be a string: {name}")),
        }
    }

    if !problems.is_empty() {
        return Err(problems.join("; "));
    }

    let mut values = values.into_iter();
    Ok(Submission {
        name: values.next().unwrap_or_default(),
        email: values.next().unwrap_or_default(),
        description: values.next().unwrap_or_default(),
    })
}

/// Soft checks on field content. Returns warnings (doesn't reject).
pub fn validate(submission: &Submission) -> Vec<String> {
    let mut warnings = Vec::new();

    if submission.name.trim().is_empty() {
        warnings.push("Empty field: name".to_string());
    }
    if submission.description.trim().is_empty() {
        warnings.push("Empty field: description".to_string());
    }
    if submission.email.trim().is_empty() {
        warnings.push("Empty field: email".to_string());
    } else if !submission.email.contains('@') {
        warnings.push("Invalid email format: email".to_string());
    }

    warnings
}
