use std::{fmt, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use url::Url;

const LEGAL_SUFFIXES: [&str; 7] = ["inc", "llc", "ltd", "corp", "corporation", "company", "co"];

/// A company proposed by the provider for a niche query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub website: String,
    pub reason: String,
}

/// Keys used only for set membership while deduplicating candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedIdentity {
    pub domain: String,
    pub name: String,
}

impl Candidate {
    pub fn identity(&self) -> NormalizedIdentity {
        NormalizedIdentity {
            domain: normalize_domain(&self.website),
            name: normalize_company_name(&self.name),
        }
    }
}

/// Lowercase hostname with a leading `www.` removed.
///
/// Inputs that don't parse as a URL (bare domains, garbage) go through a
/// best-effort string strip instead, so this never fails.
pub fn normalize_domain(website: &str) -> String {
    let trimmed = website.trim();

    match Url::parse(trimmed) {
        Ok(url) => match url.host_str() {
            Some(host) if !host.is_empty() => strip_www(&host.to_lowercase()).to_string(),
            _ => fallback_domain(trimmed),
        },
        Err(_) => fallback_domain(trimmed),
    }
}

fn fallback_domain(website: &str) -> String {
    let lowered = website.to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);

    strip_www(without_scheme)
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Lowercase, punctuation removed, legal suffixes (inc, llc, ...) dropped,
/// whitespace collapsed. `"Acme, Inc."` and `"ACME"` both become `"acme"`.
pub fn normalize_company_name(name: &str) -> String {
    let stripped: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    stripped
        .split_whitespace()
        .filter(|word| !LEGAL_SUFFIXES.contains(word))
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Industry {
    #[serde(rename = "SaaS")]
    Saas,
    #[serde(rename = "Fintech")]
    Fintech,
    #[serde(rename = "Healthcare")]
    Healthcare,
    #[serde(rename = "E-commerce")]
    Ecommerce,
    #[serde(rename = "Marketplace")]
    Marketplace,
    #[serde(rename = "Developer Tools")]
    DeveloperTools,
    #[serde(rename = "Cybersecurity")]
    Cybersecurity,
    #[serde(rename = "AI/ML")]
    ArtificialIntelligence,
    #[serde(rename = "EdTech")]
    EdTech,
    #[serde(rename = "Media & Entertainment")]
    Media,
    #[serde(rename = "Logistics")]
    Logistics,
    #[serde(rename = "Real Estate")]
    RealEstate,
    #[serde(rename = "Energy & Climate")]
    Energy,
    #[serde(rename = "Manufacturing")]
    Manufacturing,
    #[serde(rename = "Consumer Goods")]
    ConsumerGoods,
    #[serde(rename = "Professional Services")]
    ProfessionalServices,
    #[serde(rename = "Other")]
    Other,
}

impl Industry {
    pub const ALL: [Industry; 17] = [
        Industry::Saas,
        Industry::Fintech,
        Industry::Healthcare,
        Industry::Ecommerce,
        Industry::Marketplace,
        Industry::DeveloperTools,
        Industry::Cybersecurity,
        Industry::ArtificialIntelligence,
        Industry::EdTech,
        Industry::Media,
        Industry::Logistics,
        Industry::RealEstate,
        Industry::Energy,
        Industry::Manufacturing,
        Industry::ConsumerGoods,
        Industry::ProfessionalServices,
        Industry::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Saas => "SaaS",
            Industry::Fintech => "Fintech",
            Industry::Healthcare => "Healthcare",
            Industry::Ecommerce => "E-commerce",
            Industry::Marketplace => "Marketplace",
            Industry::DeveloperTools => "Developer Tools",
            Industry::Cybersecurity => "Cybersecurity",
            Industry::ArtificialIntelligence => "AI/ML",
            Industry::EdTech => "EdTech",
            Industry::Media => "Media & Entertainment",
            Industry::Logistics => "Logistics",
            Industry::RealEstate => "Real Estate",
            Industry::Energy => "Energy & Climate",
            Industry::Manufacturing => "Manufacturing",
            Industry::ConsumerGoods => "Consumer Goods",
            Industry::ProfessionalServices => "Professional Services",
            Industry::Other => "Other",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Industry {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Industry::ALL
            .iter()
            .find(|industry| industry.as_str().eq_ignore_ascii_case(value))
            .copied()
            .ok_or_else(|| format!("unknown industry: {:?}", value))
    }
}

/// Structured analysis of a single company's website.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedCompany {
    pub name: String,
    pub website: String,
    pub summary: String,
    pub headquarters: Option<String>,
    pub founded_year: Option<u16>,
    pub employee_range: Option<String>,
    pub business_model: Option<String>,
    pub target_customers: Option<String>,
    pub tech_stack: Vec<String>,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
    pub competitors: Vec<String>,
    /// Always within `0.0..=10.0`.
    pub fit_score: f64,
    pub primary_industry: Industry,
    pub secondary_industry: Option<Industry>,
}
