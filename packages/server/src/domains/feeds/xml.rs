//! Flat XML feed for aggregators that want one element per field.

use super::channel::{plain_amount, FeedChannel};
use super::escape::XmlWriter;
use crate::domains::jobs::models::FeedJob;

pub fn render_xml(channel: &FeedChannel, jobs: &[FeedJob]) -> String {
    let mut w = XmlWriter::new();
    w.open("jobs", &[]);
    w.element("publisher", &channel.title);
    w.element("publisher_url", &channel.site_url);

    for job in jobs {
        w.open("job", &[]);
        w.element("id", &job.id.to_string());
        w.element("title", &job.title);
        w.element("url", &channel.job_url(job));
        w.element("company", &job.company_name);
        w.optional("location", job.location.as_deref());
        w.element("remote", if job.remote { "true" } else { "false" });
        w.optional("job_type", job.job_type_name.as_deref());
        w.optional("category", job.category_name.as_deref());
        w.optional("salary_min", job.salary_min.map(plain_amount).as_deref());
        w.optional("salary_max", job.salary_max.map(plain_amount).as_deref());
        if job.salary_min.is_some() || job.salary_max.is_some() {
            w.element("salary_currency", &job.salary_currency);
            w.element("salary_period", &job.salary_period);
        }
        w.optional("apply_url", job.apply_url.as_deref());
        w.element("description", &job.description);
        w.element("date_posted", &job.created_at.to_rfc3339());
        w.optional(
            "valid_through",
            job.expires_at.map(|t| t.to_rfc3339()).as_deref(),
        );
        w.close("job");
    }

    w.close("jobs");
    w.finish()
}
