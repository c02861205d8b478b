//! Assembles the standalone HTML document a sandboxed preview frame loads.
//! The frame itself should allow scripts but not same-origin access.

use crate::project::{AppFileType, AppProject, ElementDesign};

const EMPTY_DESIGN_HINT: &str = r#"<div>Your element will appear here. Try asking for something like "a glossy blue button with hover effects".</div>"#;

pub fn render_design(design: &ElementDesign) -> String {
    let body = if design.is_empty() {
        EMPTY_DESIGN_HINT
    } else {
        design.html.as_str()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Element Preview</title>
  <style>
    body {{
      margin: 0;
      padding: 20px;
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
      display: flex;
      justify-content: center;
      align-items: center;
      min-height: calc(100vh - 40px);
      background-color: #fbfbfd;
    }}
{css}
  </style>
</head>
<body>
{body}
  <script>
{js}
  </script>
</body>
</html>"#,
        css = design.css,
        body = body,
        js = design.javascript,
    )
}

/// A project's own HTML file is used verbatim. Otherwise CSS files are
/// inlined, other scripts load as modules, and the entry file loads last.
pub fn render_project(project: &AppProject) -> String {
    if let Some(html) = project.files.iter().find(|f| f.file_type == AppFileType::Html) {
        return html.content.clone();
    }

    let styles: String = project
        .files
        .iter()
        .filter(|f| f.file_type == AppFileType::Css)
        .map(|f| format!("  <style>{}</style>\n", f.content))
        .collect();

    let mut scripts: String = project
        .files
        .iter()
        .filter(|f| f.file_type.is_script() && f.name != project.entry_file)
        .map(|f| format!("  <script type=\"module\">{}</script>\n", f.content))
        .collect();
    if let Some(entry) = project.entry() {
        scripts.push_str(&format!("  <script type=\"module\">{}</script>\n", entry.content));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <style>
    body {{
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
      margin: 0;
      padding: 20px;
    }}
    #app {{
      max-width: 1200px;
      margin: 0 auto;
    }}
  </style>
{styles}</head>
<body>
  <div id="app"></div>
{scripts}</body>
</html>"#,
        title = project.name,
        styles = styles,
        scripts = scripts,
    )
}
