//! HTML templates for the browsing page.

use crate::models::SiteRecord;
use crate::utils::html_escape;

/// Stylesheet served at /static/style.css.
pub const STYLE_CSS: &str = r#"
:root { --fg: #222; --muted: #777; --accent: #2b6cb0; --bg: #fafafa; }
* { box-sizing: border-box; }
body { font-family: Georgia, serif; color: var(--fg); background: var(--bg);
       max-width: 52rem; margin: 0 auto; padding: 1rem; }
header { border-bottom: 1px solid #ddd; margin-bottom: 1.5rem; padding-bottom: 0.5rem; }
header .logo { font-size: 1.4rem; font-weight: bold; color: var(--fg); text-decoration: none; }
h2 { font-size: 1.1rem; border-bottom: 1px dotted #ccc; padding-bottom: 0.25rem; }
ul.sites { list-style: none; padding-left: 0; }
ul.sites li { margin: 0.4rem 0; }
ul.sites a { color: var(--accent); text-decoration: none; }
ul.sites a:hover { text-decoration: underline; }
ul.sites .date { color: var(--muted); font-size: 0.8rem; margin-left: 0.5rem; }
footer { margin-top: 2rem; color: var(--muted); font-size: 0.8rem; }
"#;

/// Base HTML page.
pub fn base_template(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Serendip</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <header>
        <nav><a href="/" class="logo">Serendip</a></nav>
    </header>
    <main>
{}
    </main>
    <footer>Randomly discovered corners of the web. Refresh for a new sample.</footer>
</body>
</html>"#,
        html_escape(title),
        content
    )
}

/// One source's sampled records as a list section.
pub fn sites_section(heading: &str, sites: &[SiteRecord]) -> String {
    if sites.is_empty() {
        return String::new();
    }

    let mut html = format!("<section>\n<h2>{}</h2>\n<ul class=\"sites\">\n", html_escape(heading));
    for site in sites {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a><span class=\"date\">{}</span></li>\n",
            html_escape(&site.url),
            html_escape(&site.title),
            site.capture_date.format("%Y-%m-%d")
        ));
    }
    html.push_str("</ul>\n</section>\n");
    html
}
