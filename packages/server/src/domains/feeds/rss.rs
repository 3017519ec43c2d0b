//! RSS 2.0 feed of active listings.

use super::channel::{newest, FeedChannel};
use super::escape::XmlWriter;
use crate::domains::jobs::models::FeedJob;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

pub fn render_rss(channel: &FeedChannel, jobs: &[FeedJob]) -> String {
    let mut w = XmlWriter::new();
    w.open("rss", &[("version", "2.0"), ("xmlns:atom", ATOM_NS)]);
    w.open("channel", &[]);

    w.element("title", &channel.title);
    w.element("link", &channel.site_url);
    w.element("description", &channel.description);
    w.element("language", "en-us");
    if let Some(built) = newest(jobs) {
        w.element("lastBuildDate", &built.to_rfc2822());
    }
    let self_link = channel.link("feeds/jobs.rss");
    w.empty(
        "atom:link",
        &[
            ("href", self_link.as_str()),
            ("rel", "self"),
            ("type", "application/rss+xml"),
        ],
    );

    for job in jobs {
        let url = channel.job_url(job);
        w.open("item", &[]);
        w.element("title", &format!("{} at {}", job.title, job.company_name));
        w.element("link", &url);
        w.element_with_attrs("guid", &[("isPermaLink", "true")], &url);
        w.element("description", &job.description);
        w.element("pubDate", &job.created_at.to_rfc2822());
        w.optional("category", job.category_name.as_deref());
        w.close("item");
    }

    w.close("channel");
    w.close("rss");
    w.finish()
}
