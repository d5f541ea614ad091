//! Learning-path source client and document shaping.
//!
//! The upstream document is treated as opaque JSON: only the leading
//! `children` units are consumed (their `name` becomes the image prompt) and
//! everything else passes through verbatim.

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::enrich::EnrichedTitle;

/// Authenticated client for the learning-path source.
pub struct LearningPathClient {
    http: reqwest::Client,
    base_url: String,
}

impl LearningPathClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the learning-path document for the account behind `session_token`.
    pub async fn fetch(&self, session_token: &str) -> Result<Value> {
        let response = self
            .http
            .get(format!("{}/v2.1/learning-paths", self.base_url))
            .header("x-session-token", session_token)
            .send()
            .await
            .context("learning-path request failed")?;

        anyhow::ensure!(
            response.status().is_success(),
            "learning-path source returned HTTP {}",
            response.status()
        );

        response
            .json()
            .await
            .context("learning-path response was not valid JSON")
    }
}

/// Display names of the first `limit` units.
///
/// Every consumed unit must carry a string `name`; a nameless unit is a
/// malformed document, not something to skip. Skipping would break the
/// positional pairing [`attach_images`] relies on (the title list must be
/// exactly the consumed children prefix, in order).
pub fn unit_titles(doc: &Value, limit: usize) -> Result<Vec<String>> {
    let Some(children) = doc.get("children").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    children
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, child)| {
            child
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .with_context(|| format!("learning-path unit {i} has no string name"))
        })
        .collect()
}

/// Replace `children` with the consumed prefix, attaching an `image` field to
/// each unit (`null` when no artifact was resolved). Every other field of the
/// document is left untouched. `enriched` must correspond positionally to the
/// leading children, which [`unit_titles`] guarantees.
pub fn attach_images(mut doc: Value, enriched: &[EnrichedTitle]) -> Value {
    if let Some(children) = doc.get_mut("children").and_then(Value::as_array_mut) {
        children.truncate(enriched.len());
        for (child, result) in children.iter_mut().zip(enriched) {
            if let Some(obj) = child.as_object_mut() {
                let image = match &result.artifact {
                    Some(artifact) => json!(artifact),
                    None => Value::Null,
                };
                obj.insert("image".to_string(), image);
            }
        }
    }
    doc
}
