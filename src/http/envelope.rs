use serde::Deserialize;
use serde_json::Value;

use super::{Document, FetchRequest};
use crate::errors::FetchError;

/// `{"res": bool, "data": "<html>" | ["<html>", ...]}` as served by the XHR endpoints
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    res: bool,
    #[serde(default)]
    data: Value,
}

/// Unwrap an XHR envelope into its HTML fragments.
///
/// `res: false` is a soft failure: the query has no data, callers stop paging
/// instead of retrying.
pub fn open(request: &FetchRequest, document: &Document) -> Result<Vec<Document>, FetchError> {
    let raw: RawEnvelope =
        serde_json::from_str(&document.body).map_err(|e| FetchError::InvalidEnvelope {
            request: request.clone(),
            reason: e.to_string(),
        })?;

    if !raw.res {
        return Err(FetchError::SoftEmpty {
            request: request.clone(),
        });
    }

    let bodies = match raw.data {
        Value::Null => Vec::new(),
        Value::String(body) => vec![body],
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(body) => body,
                _ => String::new(),
            })
            .collect(),
        other => {
            return Err(FetchError::InvalidEnvelope {
                request: request.clone(),
                reason: format!("unexpected data: {}", other),
            });
        }
    };

    Ok(bodies
        .into_iter()
        .map(|body| Document::new(document.source.clone(), body))
        .collect())
}
