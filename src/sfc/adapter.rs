use crate::sfc::traits::{ComponentCompiler, SfcOutput};
use crate::styles::{StyleError, css_to_js};

/// Reduces a single-file component to one plain script string.
///
/// The compiled script is stitched to the style block run through the style
/// codegen. Compiler diagnostics are deliberately not propagated: the raw
/// source is returned instead so one broken component cannot take down the
/// whole build. Every swallowed diagnostic is logged at `warn`.
pub async fn transform_component(
    compiler: &dyn ComponentCompiler,
    filename: &str,
    source: &str,
) -> Result<String, StyleError> {
    match compiler.compile(filename, source.trim()).await {
        SfcOutput::Compiled { script, style } => {
            let style_script = css_to_js(filename, Some(&style)).await?;
            Ok(format!("{script};\n{style_script}"))
        }
        SfcOutput::Diagnostics(diagnostics) => {
            for diagnostic in &diagnostics {
                tracing::warn!(
                    filename,
                    %diagnostic,
                    "component compile rejected input, falling back to raw source"
                );
            }
            Ok(source.to_string())
        }
    }
}
