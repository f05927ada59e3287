pub mod announce;
pub mod events_batch;
pub mod health;
pub mod heartbeat;
pub mod policy;

/// Validate `payload` against the named schema and turn any errors
/// into a 400 `validation_error` result, `;`-joined.
pub(crate) fn validate_or_reject(
    schemas: &crate::schema::SchemaRegistry,
    schema_name: &str,
    request_id: &str,
    payload: &serde_json::Value,
) -> Result<(), crate::error::AppError> {
    let errors = schemas.validate(schema_name, payload);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::error::AppError::validation(request_id.to_string(), errors.join("; ")))
    }
}

/// Validate an about-to-be-sent response body against its own schema
/// before handing it back to the caller. A passing request can only
/// ever produce a conforming `body` here, so a validation failure
/// means the collector itself built a bad envelope — a 500
/// `internal_error`, never a 4xx, matching the original's
/// `_validated_response_or_500`.
pub(crate) fn validate_outgoing<T: serde::Serialize>(
    schemas: &crate::schema::SchemaRegistry,
    schema_name: &str,
    request_id: &str,
    body: T,
) -> Result<T, crate::error::AppError> {
    let value = serde_json::to_value(&body).map_err(|err| {
        crate::error::AppError::internal(request_id.to_string(), format!("failed to serialize outgoing {schema_name}: {err}"))
    })?;
    let errors = schemas.validate(schema_name, &value);
    if errors.is_empty() {
        Ok(body)
    } else {
        Err(crate::error::AppError::internal(
            request_id.to_string(),
            format!("outgoing {schema_name} envelope failed schema validation: {}", errors.join("; ")),
        ))
    }
}
