use serde_json::Value;
use url::Url;

use crate::{
    domain::Candidate,
    error::ScoutError,
    services::{strip_code_fences, CompletionOptions, TextProvider},
};

pub const MAX_CANDIDATES: usize = 5;

const CANDIDATE_OPTIONS: CompletionOptions = CompletionOptions {
    temperature: 0.7,
    max_tokens: 800,
};

/// Asks the provider for up to five companies in a niche.
///
/// Output that fails to parse or validate is returned as an error with the
/// raw text attached; unlike extraction there is no correction round-trip.
pub struct CandidateGenerator<'a> {
    provider: &'a dyn TextProvider,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(provider: &'a dyn TextProvider) -> Self {
        CandidateGenerator { provider }
    }

    pub async fn generate(&self, query: &str) -> Result<Vec<Candidate>, ScoutError> {
        let prompt = build_candidate_prompt(query);
        let raw = self.provider.complete(&prompt, CANDIDATE_OPTIONS).await?;

        if raw.trim().is_empty() {
            return Err(ScoutError::EmptyResponse);
        }

        let candidates = parse_candidates(&raw)?;
        log::info!("Provider returned {} candidates for {:?}", candidates.len(), query);

        Ok(candidates)
    }
}

fn build_candidate_prompt(query: &str) -> String {
    format!(
        r#"List up to {MAX_CANDIDATES} real companies that match this niche: "{query}".
Rank them from most to least relevant.
Respond with compact JSON only, no markdown and no commentary, in exactly this shape:
[{{"name":"Company name","website":"https://company.com","reason":"One sentence on why it fits"}}]"#
    )
}

pub fn parse_candidates(raw: &str) -> Result<Vec<Candidate>, ScoutError> {
    let cleaned = strip_code_fences(raw);

    let value: Value = serde_json::from_str(cleaned).map_err(|e| ScoutError::MalformedOutput {
        message: e.to_string(),
        raw: raw.to_string(),
    })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("companies") {
            Some(Value::Array(items)) => items,
            _ => return Err(ScoutError::schema("expected an array of companies", raw)),
        },
        _ => return Err(ScoutError::schema("expected an array of companies", raw)),
    };

    if items.len() > MAX_CANDIDATES {
        return Err(ScoutError::schema(
            format!("expected at most {} companies, got {}", MAX_CANDIDATES, items.len()),
            raw,
        ));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| validate_candidate(index, item, raw))
        .collect()
}

fn validate_candidate(index: usize, item: Value, raw: &str) -> Result<Candidate, ScoutError> {
    let candidate: Candidate = serde_json::from_value(item)
        .map_err(|e| ScoutError::schema(format!("companies[{}]: {}", index, e), raw))?;

    let name = candidate.name.trim();
    let website = candidate.website.trim();
    let reason = candidate.reason.trim();

    if name.is_empty() {
        return Err(ScoutError::schema(format!("companies[{}].name is empty", index), raw));
    }
    if reason.is_empty() {
        return Err(ScoutError::schema(format!("companies[{}].reason is empty", index), raw));
    }
    if !is_absolute_url(website) {
        return Err(ScoutError::schema(
            format!("companies[{}].website is not a valid URL: {:?}", index, website),
            raw,
        ));
    }

    Ok(Candidate {
        name: name.to_string(),
        website: website.to_string(),
        reason: reason.to_string(),
    })
}

pub fn is_absolute_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => url.has_host(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::ScriptedProvider;

    #[tokio::test]
    async fn generate_preserves_provider_order() {
        let provider = ScriptedProvider::new(vec![
            r#"```json
[{"name":"Zeta CRM","website":"https://zeta.io","reason":"Small-team CRM"},
 {"name":"Alpha CRM","website":"https://alpha.com","reason":"Pipeline tooling"}]
```"#,
        ]);
        let generator = CandidateGenerator::new(&provider);

        let candidates = generator.generate("crm tools").await.unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "Zeta CRM");
        assert_eq!(candidates[1].name, "Alpha CRM");
        assert!(provider.prompts.lock().unwrap()[0].0.contains("crm tools"));
    }

    #[tokio::test]
    async fn generate_empty_response_is_not_retried() {
        let provider = ScriptedProvider::new(vec!["   "]);
        let generator = CandidateGenerator::new(&provider);

        let result = generator.generate("crm tools").await;

        assert!(matches!(result, Err(ScoutError::EmptyResponse)));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn generate_surfaces_malformed_output_with_raw_text() {
        let provider = ScriptedProvider::new(vec!["[{\"name\": \"Acme\""]);
        let generator = CandidateGenerator::new(&provider);

        let result = generator.generate("crm tools").await;

        match result {
            Err(ScoutError::MalformedOutput { raw, .. }) => assert!(raw.contains("Acme")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn generate_propagates_provider_failure() {
        let provider = ScriptedProvider::failing("connection reset");
        let generator = CandidateGenerator::new(&provider);

        let result = generator.generate("crm tools").await;

        assert!(matches!(result, Err(ScoutError::Provider(_))));
    }

    #[test]
    fn parse_candidates_accepts_wrapped_object() {
        let raw = r#"{"companies":[{"name":"Acme","website":"https://acme.com","reason":"Anvils"}]}"#;
        let candidates = parse_candidates(raw).unwrap();
        assert_eq!(candidates[0].website, "https://acme.com");
    }

    #[test]
    fn parse_candidates_rejects_invalid_entries() {
        let blank_name = r#"[{"name":" ","website":"https://acme.com","reason":"Anvils"}]"#;
        let bad_url = r#"[{"name":"Acme","website":"acme dot com","reason":"Anvils"}]"#;
        let missing_reason = r#"[{"name":"Acme","website":"https://acme.com"}]"#;
        let not_array = r#"{"name":"Acme"}"#;

        for raw in [blank_name, bad_url, missing_reason, not_array] {
            assert!(matches!(
                parse_candidates(raw),
                Err(ScoutError::SchemaValidation { .. })
            ));
        }
    }

    #[test]
    fn parse_candidates_rejects_more_than_five() {
        let item = r#"{"name":"Acme","website":"https://acme.com","reason":"Anvils"}"#;
        let raw = format!("[{}]", vec![item; 6].join(","));

        assert!(matches!(
            parse_candidates(&raw),
            Err(ScoutError::SchemaValidation { .. })
        ));
    }
}
