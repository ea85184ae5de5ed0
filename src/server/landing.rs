use std::time::Duration;

use crate::config::format_duration;

const ENDPOINTS: &[&str] = &[
    "/v1/catalogs",
    "/v1/resources",
    "/v1/query",
    "/v1/resource/{catalog}/{kind}/{name}",
    "/v1/resource/{catalog}/{kind}/{name}/{version}",
    "/v1/resource/{catalog}/{kind}/{name}/{version}/yaml",
    "/v1/resource/{catalog}/{kind}/{name}/raw",
    "/health",
];

/// Renders the landing page; `cache_ttl` is `None` when caching is off.
pub fn render(cache_ttl: Option<Duration>) -> String {
    let endpoints: String = ENDPOINTS
        .iter()
        .map(|path| format!("      <li><code>GET {}</code></li>\n", path))
        .collect();

    let cache_notice = match cache_ttl {
        Some(ttl) => format!(
            "Artifact Hub responses are cached for {}. Updates published upstream \
             may take that long to appear here.",
            format_duration(ttl)
        ),
        None => "Response caching is disabled; every request goes to Artifact Hub.".to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Tekton Hub to Artifact Hub Proxy</title>
  <style>
    body {{ font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; max-width: 760px; margin: 3rem auto; padding: 0 1rem; color: #2d3748; }}
    h1 {{ color: #5a67d8; }}
    code {{ background: #f7fafc; padding: 0.1rem 0.3rem; border-radius: 4px; }}
    .notice {{ background: #fed7d7; color: #742a2a; padding: 1rem; border-radius: 8px; }}
  </style>
</head>
<body>
  <h1>Tekton Hub to Artifact Hub Proxy</h1>
  <p>Serves the Tekton Hub API from Artifact Hub so existing clients keep working
     during migration. New integrations should use Artifact Hub directly.</p>
  <h2>Endpoints</h2>
  <ul>
{endpoints}  </ul>
  <h2>Cache</h2>
  <p class="notice">{cache_notice}</p>
</body>
</html>
"#
    )
}
