//! Template engine for rendering document and index pages.

use minijinja::{context, Environment};

/// An entry on the index page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IndexLink {
    /// Link label
    pub label: String,
    /// Output path relative to the site root, `/`-separated
    pub href: String,
}

/// Context for rendering a document page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageContext {
    /// Page title (empty if the document has none)
    pub title: String,
    /// Rendered editor markup
    pub content: String,
    /// Base URL the stylesheet is served under
    pub base_url: String,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with default templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("page.html".to_string(), PAGE_TEMPLATE.to_string())
            .expect("Failed to add page template");

        env.add_template_owned("index.html".to_string(), INDEX_TEMPLATE.to_string())
            .expect("Failed to add index template");

        Self { env }
    }

    /// Wrap rendered markup in the document page layout.
    pub fn render_page(&self, page: &PageContext) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("page.html")?;

        tmpl.render(context! {
            title => &page.title,
            content => &page.content,
            stylesheet_href => escape_attr(&format!("{}quill.snow.css", page.base_url)),
        })
    }

    /// Render the site index listing `links` in the given order.
    pub fn render_index(
        &self,
        site_title: &str,
        links: &[IndexLink],
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("index.html")?;

        let links: Vec<IndexLink> = links
            .iter()
            .map(|link| IndexLink {
                label: link.label.clone(),
                href: escape_attr(&link.href),
            })
            .collect();

        tmpl.render(context! {
            site_title => site_title,
            links => links,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape a value for a double-quoted attribute, leaving `/` readable.
fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const PAGE_TEMPLATE: &str = r##"<!doctype html>
<html lang="en">
<head>
  <title>{{ title }}</title>
  <meta http-equiv="Content-Type" content="text/html; charset=utf-8"/>
  <link rel="stylesheet" href="{{ stylesheet_href | safe }}">
  <style>
    body {
      margin: 0;
      background: #EEEEEE;
    }
    #wrapper {
      max-width: 700px;
      margin: 0 auto 0 auto;
    }
    .ql-toolbar:after {
      clear: none !important;
    }
    .ql-container.ql-snow {
      border: 0;
    }
  </style>
</head>
<body>
  <div id="wrapper">
    {{ content | safe }}
  </div>
</body>
</html>
"##;

const INDEX_TEMPLATE: &str = r##"<!doctype html>
<html lang="en">
<head>
  <title>{{ site_title }}</title>
  <meta http-equiv="Content-Type" content="text/html; charset=utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <style>
    * {
      font-family: monospace;
      background: #E7E7E7;
      color: #000;
    }
    a {
      color: #69F;
      text-decoration: none;
      font-size: 1.5em;
    }
    a:visited {
      color: #69F;
    }
    a:hover {
      color: #96F;
    }
  </style>
</head>
<body>
{% for link in links %}  <p><a href="{{ link.href | safe }}">{{ link.label }}</a></p>
{% endfor %}</body>
</html>
"##;
