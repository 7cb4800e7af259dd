//! In-process transport serving canned responses, for tests and offline runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::client::Transport;
use super::request::FetchRequest;
use crate::errors::TransportError;

struct Rule {
    url: String,
    fields: Vec<(String, String)>,
    failures: u32,
    error: TransportError,
    body: Option<String>,
}

impl Rule {
    fn new(url: &str, fields: &[(&str, &str)]) -> Self {
        Self {
            url: url.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            failures: 0,
            error: TransportError::Status(500),
            body: None,
        }
    }

    fn matches(&self, request: &FetchRequest) -> bool {
        self.url == request.url && self.fields.iter().all(|field| request.form.contains(field))
    }
}

/// Responds by URL, optionally narrowed by form fields; the most specific
/// matching rule wins. Unknown requests answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, body: &str) {
        self.respond_to(url, &[], body);
    }

    pub fn respond_to(&self, url: &str, fields: &[(&str, &str)], body: &str) {
        self.with_rule(url, fields, |rule| rule.body = Some(body.to_string()));
    }

    pub fn fail_times(&self, url: &str, times: u32, error: TransportError) {
        self.with_rule(url, &[], |rule| {
            rule.failures = times;
            rule.error = error;
        });
    }

    pub fn calls(&self, url: &str) -> usize {
        self.lock_calls().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock_calls().values().sum()
    }

    fn with_rule(&self, url: &str, fields: &[(&str, &str)], update: impl FnOnce(&mut Rule)) {
        let mut rules = self.rules.lock().unwrap_or_else(|p| p.into_inner());
        let wanted = Rule::new(url, fields);
        let position = rules
            .iter()
            .position(|r| r.url == wanted.url && r.fields == wanted.fields);

        match position {
            Some(idx) => update(&mut rules[idx]),
            None => {
                let mut rule = wanted;
                update(&mut rule);
                rules.push(rule);
            }
        }
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &FetchRequest) -> Result<String, TransportError> {
        *self.lock_calls().entry(request.url.clone()).or_insert(0) += 1;

        let mut rules = self.rules.lock().unwrap_or_else(|p| p.into_inner());
        let rule = rules
            .iter_mut()
            .filter(|r| r.matches(request))
            .max_by_key(|r| r.fields.len());

        match rule {
            Some(rule) if rule.failures > 0 => {
                rule.failures -= 1;
                Err(rule.error.clone())
            }
            Some(Rule { body: Some(body), .. }) => Ok(body.clone()),
            _ => Err(TransportError::Status(404)),
        }
    }
}
