//! HTML landing page served on `/`.

use anyhow::{Result, bail};

#[derive(Debug, Clone)]
pub struct LandingLink {
    pub address: String,
    pub text: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct LandingConfig {
    pub name: String,
    pub description: String,
    pub version: String,
    pub links: Vec<LandingLink>,
}

/// Pre-rendered landing page.
#[derive(Debug, Clone)]
pub struct LandingPage {
    html: String,
}

impl LandingPage {
    pub fn new(config: LandingConfig) -> Result<Self> {
        if config.name.trim().is_empty() {
            bail!("Landing page needs a name");
        }
        for link in &config.links {
            if !link.address.starts_with('/') {
                bail!("Landing page link must be an absolute path: {}", link.address);
            }
        }

        let links: String = config
            .links
            .iter()
            .map(|link| {
                format!(
                    "      <li><a href=\"{}\">{}</a> {}</li>\n",
                    escape(&link.address),
                    escape(&link.text),
                    escape(&link.description)
                )
            })
            .collect();

        let html = format!(
            "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"UTF-8\">\n    <title>{name}</title>\n  </head>\n  <body>\n    <h1>{name}</h1>\n    <p>{description}</p>\n    <ul>\n{links}    </ul>\n    <p>Version: {version}</p>\n  </body>\n</html>\n",
            name = escape(&config.name),
            description = escape(&config.description),
            version = escape(&config.version),
            links = links,
        );

        Ok(Self { html })
    }

    /// Landing page for this exporter, linking to `metrics_path`.
    pub fn for_exporter(metrics_path: &str) -> Result<Self> {
        Self::new(LandingConfig {
            name: "eduvpn_exporter".to_string(),
            description: env!("CARGO_PKG_DESCRIPTION").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            links: vec![LandingLink {
                address: metrics_path.to_string(),
                text: "Metrics".to_string(),
                description: "Metrics from the eduVPN user portal.".to_string(),
            }],
        })
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
