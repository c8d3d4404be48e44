use serde_json::Value;

/// Top-level request shape violations. Messages are part of the wire
/// contract and are echoed verbatim in the error envelope.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Input data should be a dictionary with a key \"features\" containing a list of lists")]
    Features,
    #[error(
        "Input data should be a dictionary with keys \"features\" and \"labels\" containing lists of lists and lists respectively"
    )]
    FeaturesAndLabels,
    #[error("labels must be a list of integer class codes")]
    NonIntegerLabel,
}

/// Body check for /transform and /predict: `features` must be present
/// and must be a list. Row contents are checked later by the shaper.
pub fn features(body: &Value) -> Result<&Vec<Value>, ValidationError> {
    body.get("features")
        .and_then(Value::as_array)
        .ok_or(ValidationError::Features)
}

/// Body check for /accuracy: `features` and `labels` must both be lists,
/// and every label must be an integer class code.
pub fn features_and_labels(body: &Value) -> Result<(&Vec<Value>, Vec<i64>), ValidationError> {
    let features = body.get("features").and_then(Value::as_array);
    let labels = body.get("labels").and_then(Value::as_array);
    let (features, labels) = match (features, labels) {
        (Some(features), Some(labels)) => (features, labels),
        _ => return Err(ValidationError::FeaturesAndLabels),
    };
    let labels = labels
        .iter()
        .map(Value::as_i64)
        .collect::<Option<Vec<i64>>>()
        .ok_or(ValidationError::NonIntegerLabel)?;
    Ok((features, labels))
}
