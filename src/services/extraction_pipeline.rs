use itertools::Itertools;
use serde::{Deserialize, Deserializer};
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_json::Value;

use crate::{
    domain::{ExtractedCompany, Industry},
    error::ScoutError,
    services::{is_absolute_url, strip_code_fences, truncate_to_char_boundary, CompletionOptions, TextProvider},
};

pub const MAX_LIST_ITEMS: usize = 10;
pub const DEFAULT_TEXT_BUDGET: usize = 12_000;

const EXTRACTION_OPTIONS: CompletionOptions = CompletionOptions {
    temperature: 0.2,
    max_tokens: 1500,
};

/// Turns a company's scraped website text into a validated `ExtractedCompany`.
///
/// Output that isn't valid JSON gets exactly one correction round-trip.
/// Output that parses but breaks the schema fails immediately.
pub struct ExtractionPipeline<'a> {
    provider: &'a dyn TextProvider,
    text_budget: usize,
}

impl<'a> ExtractionPipeline<'a> {
    pub fn new(provider: &'a dyn TextProvider) -> Self {
        ExtractionPipeline {
            provider,
            text_budget: DEFAULT_TEXT_BUDGET,
        }
    }

    pub fn with_text_budget(mut self, text_budget: usize) -> Self {
        self.text_budget = text_budget;
        self
    }

    pub async fn extract(
        &self,
        name: &str,
        website: &str,
        text: &str,
    ) -> Result<ExtractedCompany, ScoutError> {
        let text = truncate_to_char_boundary(text, self.text_budget);
        let prompt = build_extraction_prompt(name, website, text);

        let raw = self.provider.complete(&prompt, EXTRACTION_OPTIONS).await?;
        if raw.trim().is_empty() {
            return Err(ScoutError::EmptyExtractionResponse);
        }

        let (value, raw) = match parse_json(&raw) {
            Ok(value) => (value, raw),
            Err(first) => {
                log::warn!("Extraction output for {} is not valid JSON, asking for a correction: {}", website, first);

                let correction = build_correction_prompt(&raw, &first);
                let corrected = self.provider.complete(&correction, EXTRACTION_OPTIONS).await?;

                match parse_json(&corrected) {
                    Ok(value) => (value, corrected),
                    Err(second) => {
                        return Err(ScoutError::ExtractionFailedAfterRetry { first, second })
                    }
                }
            }
        };

        let company = validate_extraction(value, &raw)?;
        log::info!(
            "Extracted {} ({}) with fit score {}",
            company.name,
            company.primary_industry,
            company.fit_score
        );

        Ok(company)
    }
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(strip_code_fences(raw)).map_err(|e| e.to_string())
}

fn build_extraction_prompt(name: &str, website: &str, text: &str) -> String {
    let industries = Industry::ALL.iter().map(|i| format!("\"{}\"", i)).join(", ");

    format!(
        r#"You are a market analyst. Analyze the company below using only the website text provided.

Company: {name}
Website: {website}

Website text:
"""
{text}
"""

Return a single JSON object and nothing else, with these fields:
- "name": company name (string, required)
- "website": absolute URL of the company website (string, required)
- "summary": two or three sentences on what the company does
- "headquarters", "employee_range", "business_model", "target_customers": strings or null
- "founded_year": number or null
- "tech_stack", "strengths", "risks", "opportunities", "competitors": arrays of short strings, at most {MAX_LIST_ITEMS} each
- "fit_score": number from 0 to 10
- "primary_industry": exactly one of [{industries}]
- "secondary_industry": one of the same values, or null

Score bands for fit_score:
- 0-3: weak or unclear offering, little evidence of traction
- 4-6: credible business with notable gaps or risks
- 7-8: strong offering with clear customers and differentiation
- 9-10: category leader with exceptional evidence"#
    )
}

fn build_correction_prompt(invalid: &str, error: &str) -> String {
    format!(
        r#"The following text was supposed to be a single valid JSON object but failed to parse.

Parser error: {error}

Text:
{invalid}

Return only the corrected JSON object, with no markdown and no commentary."#
    )
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<Option<String>>),
}

/// Accepts `"a"`, `["a", "b"]` or null; trims items and drops empties.
///
/// A single string only splits on line breaks, commas stay inside the item
/// ("Stripe, Inc.").
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<String> = match Option::<StringOrList>::deserialize(deserializer)? {
        None => vec![],
        Some(StringOrList::One(value)) => value.lines().map(str::to_string).collect(),
        Some(StringOrList::Many(values)) => values.into_iter().flatten().collect(),
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .take(MAX_LIST_ITEMS)
        .collect())
}

/// Reads a year from `2015`, `2015.0` or `"2015"`. Anything else becomes
/// `None` instead of failing the whole extraction.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let year = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let parsed = match &year {
        Value::Number(n) => n
            .as_f64()
            .filter(|y| y.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(y))
            .map(|y| y as u16),
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    };

    if parsed.is_none() {
        log::warn!("Ignoring unparseable founded_year: {}", year);
    }
    Ok(parsed)
}

#[derive(Deserialize)]
struct RawExtraction {
    #[serde(default)]
    name: String,
    #[serde(default)]
    website: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    headquarters: Option<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    founded_year: Option<u16>,
    #[serde(default)]
    employee_range: Option<String>,
    #[serde(default)]
    business_model: Option<String>,
    #[serde(default)]
    target_customers: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    tech_stack: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    strengths: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    risks: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    opportunities: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    competitors: Vec<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    fit_score: f64,
    primary_industry: String,
    #[serde(default)]
    secondary_industry: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_extraction(value: Value, raw: &str) -> Result<ExtractedCompany, ScoutError> {
    let extraction: RawExtraction =
        serde_json::from_value(value).map_err(|e| ScoutError::schema(e.to_string(), raw))?;

    let name = extraction.name.trim();
    if name.is_empty() {
        return Err(ScoutError::schema("name is required", raw));
    }

    let website = extraction.website.trim();
    if !is_absolute_url(website) {
        return Err(ScoutError::schema(
            format!("website is not a valid URL: {:?}", website),
            raw,
        ));
    }

    if !(0.0..=10.0).contains(&extraction.fit_score) {
        return Err(ScoutError::schema(
            format!("fit_score must be between 0 and 10, got {}", extraction.fit_score),
            raw,
        ));
    }

    let primary_industry: Industry = extraction
        .primary_industry
        .parse()
        .map_err(|e: String| ScoutError::schema(format!("primary_industry: {}", e), raw))?;

    let secondary_industry = match non_blank(extraction.secondary_industry) {
        Some(value) => Some(
            value
                .parse::<Industry>()
                .map_err(|e| ScoutError::schema(format!("secondary_industry: {}", e), raw))?,
        ),
        None => None,
    };

    Ok(ExtractedCompany {
        name: name.to_string(),
        website: website.to_string(),
        summary: non_blank(extraction.summary).unwrap_or_default(),
        headquarters: non_blank(extraction.headquarters),
        founded_year: extraction.founded_year,
        employee_range: non_blank(extraction.employee_range),
        business_model: non_blank(extraction.business_model),
        target_customers: non_blank(extraction.target_customers),
        tech_stack: extraction.tech_stack,
        strengths: extraction.strengths,
        risks: extraction.risks,
        opportunities: extraction.opportunities,
        competitors: extraction.competitors,
        fit_score: extraction.fit_score,
        primary_industry,
        secondary_industry,
    })
}
