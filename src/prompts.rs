use crate::project::{AppProject, ElementDesign};

pub const DESIGN_GENERATE_SYSTEM: &str = r#"You are an expert web developer specializing in creating beautiful, functional HTML elements.
When given a description of an element, generate the HTML, CSS, and JavaScript needed to create it.

Follow these guidelines:
1. Create clean, semantic HTML that follows best practices
2. Write modern CSS that is well-organized and responsive
3. Include JavaScript functionality when appropriate
4. Ensure all code works together seamlessly

Respond with a single JSON object and nothing else:
{"html": "...", "css": "...", "javascript": "..."}
The html value is the element markup only, without <html>, <head>, or <body> tags."#;

pub const DESIGN_MODIFY_SYSTEM: &str = r#"You are an expert web developer specializing in modifying HTML elements. You will be given the
current HTML, CSS, and JavaScript of an element together with a change request.

Follow these guidelines:
1. Preserve the overall structure and functionality unless asked to change it
2. Make precise, targeted changes based on the request
3. Ensure all code remains valid and works together

Respond with a single JSON object and nothing else:
{"html": "...", "css": "...", "javascript": "..."}
You may leave out a field whose code did not change."#;

pub const PROJECT_GENERATE_SYSTEM: &str = r#"You are an expert web developer who builds small, complete browser applications.
Given a description, produce every file the app needs. Plain HTML, CSS, and JavaScript modules work best.

Respond with a single JSON object and nothing else:
{
  "name": "short app name",
  "description": "one sentence",
  "entryFile": "the main script file name",
  "files": [{"name": "app.js", "content": "...", "type": "js"}]
}
Allowed file types: js, jsx, ts, tsx, css, html, json, md. File names must be unique."#;

pub const PROJECT_MODIFY_SYSTEM: &str = r#"You are an expert web developer modifying an existing browser application.
You will be given the project's files and a change request. Keep everything that still works.

Respond with a single JSON object and nothing else, using the same shape as the input:
{"name": "...", "description": "...", "entryFile": "...", "files": [{"name": "...", "content": "...", "type": "..."}]}
When you include "files", include the complete list, changed or not. Leave out fields that did not change."#;

pub fn design_generation_request(description: &str) -> String {
    format!("Please design this element: {}", description)
}

pub fn design_modification_request(current: &ElementDesign, request: &str) -> String {
    format!(
        "Here is the current code for my element:\n\nHTML:\n```html\n{}\n```\n\nCSS:\n```css\n{}\n```\n\nJavaScript:\n```javascript\n{}\n```\n\nPlease modify the element as follows: {}",
        current.html, current.css, current.javascript, request
    )
}

pub fn project_generation_request(description: &str) -> String {
    format!("Please build this app: {}", description)
}

pub fn project_modification_request(current: &AppProject, request: &str) -> String {
    // Only strings and vectors of strings; serialization does not fail here.
    let project_json = serde_json::to_string_pretty(current).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Here is the current project:\n```json\n{}\n```\n\nPlease modify the app as follows: {}",
        project_json, request
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modification_request_embeds_current_code() {
        let design = ElementDesign::new("<button>Go</button>", "button{}", "go()");
        let request = design_modification_request(&design, "make it blue");
        assert!(request.contains("```html\n<button>Go</button>\n```"));
        assert!(request.ends_with("Please modify the element as follows: make it blue"));
    }

    #[test]
    fn project_request_is_round_trippable_json() {
        let project = AppProject::starter();
        let request = project_modification_request(&project, "add a footer");
        let patch = crate::extract::parse_project(&request).unwrap();
        assert_eq!(patch.entry_file.as_deref(), Some("app.js"));
        assert_eq!(patch.files.unwrap().len(), 3);
    }
}
