//! Schema.org `JobPosting` structured data.

use rust_decimal::prelude::ToPrimitive;
use serde_json::{json, Map, Value};

use super::channel::FeedChannel;
use crate::domains::jobs::models::FeedJob;
use crate::domains::taxonomy::models::schema_org_employment_type;

const SCHEMA_CONTEXT: &str = "https://schema.org";

fn unit_text(period: &str) -> &'static str {
    match period {
        "hour" => "HOUR",
        "day" => "DAY",
        "week" => "WEEK",
        "month" => "MONTH",
        _ => "YEAR",
    }
}

fn base_salary(job: &FeedJob) -> Option<Value> {
    if job.salary_min.is_none() && job.salary_max.is_none() {
        return None;
    }

    let mut value = Map::new();
    value.insert("@type".into(), json!("QuantitativeValue"));
    match (job.salary_min, job.salary_max) {
        (Some(min), Some(max)) if min == max => {
            value.insert("value".into(), json!(min.to_f64()));
        }
        (min, max) => {
            if let Some(min) = min {
                value.insert("minValue".into(), json!(min.to_f64()));
            }
            if let Some(max) = max {
                value.insert("maxValue".into(), json!(max.to_f64()));
            }
        }
    }
    value.insert("unitText".into(), json!(unit_text(&job.salary_period)));

    Some(json!({
        "@type": "MonetaryAmount",
        "currency": job.salary_currency,
        "value": value,
    }))
}

/// One `JobPosting` object, without `@context`
pub fn job_posting(channel: &FeedChannel, job: &FeedJob) -> Value {
    let mut organization = Map::new();
    organization.insert("@type".into(), json!("Organization"));
    organization.insert("name".into(), json!(job.company_name));
    if let Some(website) = &job.company_website {
        organization.insert("sameAs".into(), json!(website));
    }
    if let Some(logo) = &job.company_logo_url {
        organization.insert("logo".into(), json!(logo));
    }

    let mut posting = Map::new();
    posting.insert("@type".into(), json!("JobPosting"));
    posting.insert("title".into(), json!(job.title));
    posting.insert("description".into(), json!(job.description));
    posting.insert("url".into(), json!(channel.job_url(job)));
    posting.insert(
        "identifier".into(),
        json!({
            "@type": "PropertyValue",
            "name": job.company_name,
            "value": job.id.to_string(),
        }),
    );
    posting.insert("datePosted".into(), json!(job.created_at.to_rfc3339()));
    if let Some(expires_at) = job.expires_at {
        posting.insert("validThrough".into(), json!(expires_at.to_rfc3339()));
    }
    if let Some(slug) = &job.job_type_slug {
        posting.insert(
            "employmentType".into(),
            json!(schema_org_employment_type(slug)),
        );
    }
    if let Some(category) = &job.category_name {
        posting.insert("occupationalCategory".into(), json!(category));
    }
    posting.insert("hiringOrganization".into(), Value::Object(organization));

    if let Some(location) = &job.location {
        posting.insert(
            "jobLocation".into(),
            json!({
                "@type": "Place",
                "address": {
                    "@type": "PostalAddress",
                    "addressLocality": location,
                },
            }),
        );
    }
    if job.remote {
        posting.insert("jobLocationType".into(), json!("TELECOMMUTE"));
    }
    if let Some(salary) = base_salary(job) {
        posting.insert("baseSalary".into(), salary);
    }
    if let Some(apply_url) = &job.apply_url {
        posting.insert("directApply".into(), json!(false));
        posting.insert(
            "potentialAction".into(),
            json!({ "@type": "ApplyAction", "target": apply_url }),
        );
    }

    Value::Object(posting)
}

/// Standalone document for one listing page
pub fn render_job_posting(channel: &FeedChannel, job: &FeedJob) -> Value {
    let mut posting = job_posting(channel, job);
    if let Value::Object(map) = &mut posting {
        map.insert("@context".into(), json!(SCHEMA_CONTEXT));
    }
    posting
}

/// All listings as one `@graph`
pub fn render_json_ld(channel: &FeedChannel, jobs: &[FeedJob]) -> Value {
    let graph: Vec<Value> = jobs.iter().map(|job| job_posting(channel, job)).collect();
    json!({
        "@context": SCHEMA_CONTEXT,
        "@graph": graph,
    })
}
