//! Stylesheet to script codegen.
//!
//! The bundling engine only understands script modules, so CSS is rewritten
//! into a self-installing fragment that injects a `<style>` element when the
//! compiled bundle runs in the browser.

use thiserror::Error;

/// Resolved remote paths carry a leading slash so the load path sees them;
/// the URL proper starts one byte in.
pub const REMOTE_PREFIX: &str = "/http";

#[derive(Debug, Error)]
pub enum StyleError {
    #[error("failed to fetch remote stylesheet {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("no stylesheet content available for {0}")]
    MissingContent(String),
}

/// Turns stylesheet text into a self-invoking installation script.
///
/// If `name` denotes a remote URL (the `/http` prefix) the stylesheet is
/// fetched over the network first and `css` is ignored.
pub async fn css_to_js(name: &str, css: Option<&str>) -> Result<String, StyleError> {
    let contents = if name.starts_with(REMOTE_PREFIX) {
        let url = &name[1..];
        fetch_remote_css(url).await?
    } else {
        css.ok_or_else(|| StyleError::MissingContent(name.to_string()))?
            .to_string()
    };
    Ok(render_install_script(
        name,
        &contents,
        chrono::Utc::now().timestamp_millis(),
    ))
}

async fn fetch_remote_css(url: &str) -> Result<String, StyleError> {
    let response = reqwest::get(url).await.map_err(|e| StyleError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let response = response
        .error_for_status()
        .map_err(|e| StyleError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    response.text().await.map_err(|e| StyleError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// The element id is unique per compile run (timestamp) but stable within it,
/// so re-running the generated script replaces content instead of appending a
/// second element. Backtick sequences inside the CSS are a known limitation.
fn render_install_script(name: &str, css: &str, timestamp_ms: i64) -> String {
    let element_id = format!("style_{timestamp_ms}_{name}");
    format!(
        r#"(() => {{
  let stylesheet = document.getElementById('{element_id}');
  if (!stylesheet) {{
    stylesheet = document.createElement('style');
    stylesheet.setAttribute('id', '{element_id}');
    document.head.appendChild(stylesheet);
  }}
  const styles = document.createTextNode(`{css}`);
  stylesheet.innerHTML = '';
  stylesheet.appendChild(styles);
}})()"#
    )
}
