use serde::Serialize;
use url::Url;

use crate::similarity::Recommendation;

/// Recommendation as printed in JSON output.
#[derive(Debug, Serialize)]
pub struct RecommendationView<'a> {
    pub title: &'a str,
    pub distance: f32,
    pub link: String,
}

/// Web search link for `title`, e.g. `https://www.google.com/search?q=The+Matrix`.
pub fn search_link(search_url: &Url, title: &str) -> String {
    let mut url = search_url.clone();
    url.query_pairs_mut().append_pair("q", title);
    url.to_string()
}

pub fn render_text(search_url: &Url, query: &str, recs: &[Recommendation]) -> String {
    if recs.is_empty() {
        return format!("No recommendations for {query:?}\n");
    }

    let mut out = format!("Movies similar to {query:?}:\n");
    for (idx, rec) in recs.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", idx + 1, rec.title));
        out.push_str(&format!("   {}\n", search_link(search_url, &rec.title)));
    }
    out
}

pub fn render_json(search_url: &Url, recs: &[Recommendation]) -> serde_json::Result<String> {
    let views: Vec<RecommendationView> = recs
        .iter()
        .map(|rec| RecommendationView {
            title: &rec.title,
            distance: rec.distance,
            link: search_link(search_url, &rec.title),
        })
        .collect();

    serde_json::to_string_pretty(&views)
}
