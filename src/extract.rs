//! Recovering designs and projects from model output.
//!
//! Models wrap their JSON in prose and markdown fences, and sometimes emit
//! something that is not JSON at all. The `parse_*` functions are pure and
//! report why they failed; the `extract_*` wrappers always hand back a usable
//! value together with the failure, if any, so the caller can tell the user.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::ExtractionError;
use crate::project::{AppFile, AppFileType, AppProject, ElementDesign};

/// A value recovered from a response, plus the reason a fallback was used.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub value: T,
    pub error: Option<ExtractionError>,
}

impl<T> Extracted<T> {
    fn ok(value: T) -> Self {
        Self { value, error: None }
    }

    fn fallback(value: T, error: ExtractionError) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Narrow a response down to the text that should hold the JSON object.
///
/// A ```` ```json ```` fence wins over a bare ```` ``` ```` fence; with no fence
/// the whole trimmed text is used. An unterminated fence runs to the end.
pub fn json_candidate(text: &str) -> &str {
    let trimmed = text.trim();
    fenced_body(trimmed, "```json")
        .or_else(|| fenced_body(trimmed, "```"))
        .unwrap_or(trimmed)
}

fn fenced_body<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let start = text.find(opener)? + opener.len();
    let rest = &text[start..];
    let end = rest.find("```").unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// First `{` through last `}`. Greedy on purpose: nested objects stay whole.
pub fn object_span(candidate: &str) -> Option<&str> {
    let start = candidate.find('{')?;
    let end = candidate.rfind('}')?;
    (end > start).then(|| &candidate[start..=end])
}

fn locate_object(text: &str) -> Result<&str, ExtractionError> {
    object_span(json_candidate(text)).ok_or(ExtractionError::NoObjectFound)
}

/// Fields a model returned for a design. `None` means the model left it out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DesignPatch {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub css: Option<String>,
    #[serde(default)]
    pub javascript: Option<String>,
}

impl DesignPatch {
    pub fn into_design(self) -> ElementDesign {
        ElementDesign {
            html: self.html.unwrap_or_default(),
            css: self.css.unwrap_or_default(),
            javascript: self.javascript.unwrap_or_default(),
        }
    }

    /// Overlay onto `prior`; omitted fields keep their prior value.
    pub fn apply(self, prior: &ElementDesign) -> ElementDesign {
        ElementDesign {
            html: self.html.unwrap_or_else(|| prior.html.clone()),
            css: self.css.unwrap_or_else(|| prior.css.clone()),
            javascript: self.javascript.unwrap_or_else(|| prior.javascript.clone()),
        }
    }
}

pub fn parse_design(text: &str) -> Result<DesignPatch, ExtractionError> {
    let object = locate_object(text)?;
    serde_json::from_str(object).map_err(|e| ExtractionError::Malformed(e.to_string()))
}

/// Design rendered in place of a response that could not be parsed.
pub fn error_design() -> ElementDesign {
    ElementDesign {
        html: r#"<div class="generation-error">Failed to parse the AI response. Please try again.</div>"#
            .to_string(),
        css: ".generation-error {\n  color: #b91c1c;\n  background: #fef2f2;\n  border: 2px solid #ef4444;\n  border-radius: 0.5rem;\n  padding: 1rem;\n  font-family: sans-serif;\n}"
            .to_string(),
        javascript: String::new(),
    }
}

/// Generation path: a fresh design, or the error placeholder.
pub fn extract_design(text: &str) -> Extracted<ElementDesign> {
    match parse_design(text) {
        Ok(patch) => Extracted::ok(patch.into_design()),
        Err(e) => {
            log::warn!("design extraction failed: {}", e);
            Extracted::fallback(error_design(), e)
        }
    }
}

/// Modification path: merge into `current`, or keep `current` on failure.
pub fn extract_design_update(text: &str, current: &ElementDesign) -> Extracted<ElementDesign> {
    match parse_design(text) {
        Ok(patch) => Extracted::ok(patch.apply(current)),
        Err(e) => {
            log::warn!("design update extraction failed: {}", e);
            Extracted::fallback(current.clone(), e)
        }
    }
}

fn fence_regexes() -> &'static [Regex; 3] {
    static FENCES: OnceLock<[Regex; 3]> = OnceLock::new();
    FENCES.get_or_init(|| {
        [
            Regex::new(r"```html\b\s*([\s\S]*?)\s*```").expect("valid html fence regex"),
            Regex::new(r"```css\b\s*([\s\S]*?)\s*```").expect("valid css fence regex"),
            Regex::new(r"```(?:javascript|js)\b\s*([\s\S]*?)\s*```").expect("valid js fence regex"),
        ]
    })
}

/// Older plain-text format: separate ```` ```html ````, ```` ```css ```` and
/// ```` ```javascript ```` blocks. Each block is optional and the first one
/// with a given tag wins. Missing blocks fall back to `prior`, or to "".
///
/// Library-only entry point for replies in this format. The surfaces prompt
/// for JSON and never call it.
pub fn extract_fenced_design(text: &str, prior: Option<&ElementDesign>) -> ElementDesign {
    let [html_re, css_re, js_re] = fence_regexes();
    let block = |re: &Regex| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    };
    let empty = ElementDesign::default();
    let prior = prior.unwrap_or(&empty);

    ElementDesign {
        html: block(html_re).unwrap_or_else(|| prior.html.clone()),
        css: block(css_re).unwrap_or_else(|| prior.css.clone()),
        javascript: block(js_re).unwrap_or_else(|| prior.javascript.clone()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct RawFile {
    name: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, rename = "type")]
    file_type: Option<String>,
}

impl RawFile {
    fn into_file(self) -> AppFile {
        let file_type = self
            .file_type
            .as_deref()
            .and_then(AppFileType::from_tag)
            .unwrap_or_else(|| AppFileType::from_file_name(&self.name));
        AppFile {
            name: self.name,
            content: self.content.unwrap_or_default(),
            file_type,
        }
    }
}

/// Fields a model returned for a project. `None` means the model left it out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "entryFile")]
    pub entry_file: Option<String>,
    #[serde(default, deserialize_with = "deserialize_files")]
    pub files: Option<Vec<AppFile>>,
}

fn deserialize_files<'de, D>(deserializer: D) -> Result<Option<Vec<AppFile>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<Vec<RawFile>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|files| {
        let mut seen = HashSet::new();
        files
            .into_iter()
            .filter(|f| {
                let fresh = seen.insert(f.name.clone());
                if !fresh {
                    log::warn!("dropping duplicate file {:?} from AI response", f.name);
                }
                fresh
            })
            .map(RawFile::into_file)
            .collect()
    }))
}

impl ProjectPatch {
    /// Build a brand-new project. A response without files is rejected.
    pub fn into_project(self) -> Result<AppProject, ExtractionError> {
        let files = self.files.unwrap_or_default();
        let first = files.first().ok_or(ExtractionError::EmptyProject)?;
        let entry_file = self.entry_file.unwrap_or_else(|| first.name.clone());
        let mut project = AppProject {
            name: self.name.unwrap_or_else(|| "Generated App".to_string()),
            description: self.description.unwrap_or_default(),
            entry_file,
            files,
        };
        project.normalize_entry();
        Ok(project)
    }

    /// Overlay onto `prior`. Omitted fields, and an empty file list, keep the
    /// prior value.
    pub fn apply(self, prior: &AppProject) -> AppProject {
        let files = match self.files {
            Some(files) if !files.is_empty() => files,
            _ => prior.files.clone(),
        };
        let mut project = AppProject {
            name: self.name.unwrap_or_else(|| prior.name.clone()),
            description: self.description.unwrap_or_else(|| prior.description.clone()),
            entry_file: self.entry_file.unwrap_or_else(|| prior.entry_file.clone()),
            files,
        };
        project.normalize_entry();
        project
    }
}

pub fn parse_project(text: &str) -> Result<ProjectPatch, ExtractionError> {
    let object = locate_object(text)?;
    serde_json::from_str(object).map_err(|e| ExtractionError::Malformed(e.to_string()))
}

/// Generation path: a fresh project, or the single-file error stub.
pub fn extract_project(text: &str) -> Extracted<AppProject> {
    match parse_project(text).and_then(ProjectPatch::into_project) {
        Ok(project) => Extracted::ok(project),
        Err(e) => {
            log::warn!("project extraction failed: {}", e);
            Extracted::fallback(AppProject::error_stub(), e)
        }
    }
}

/// Modification path: merge into `current`, or keep `current` on failure.
pub fn extract_project_update(text: &str, current: &AppProject) -> Extracted<AppProject> {
    match parse_project(text) {
        Ok(patch) => Extracted::ok(patch.apply(current)),
        Err(e) => {
            log::warn!("project update extraction failed: {}", e);
            Extracted::fallback(current.clone(), e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn candidate_prefers_json_fence() {
        let text = "```\nnot this\n```\n```json\n{\"html\":\"x\"}\n```";
        assert_eq!(json_candidate(text), "{\"html\":\"x\"}");
    }

    #[test]
    fn candidate_uses_generic_fence() {
        let text = "Here:\n```\n{\"css\":\"a{}\"}\n```\nbye";
        assert_eq!(json_candidate(text), "{\"css\":\"a{}\"}");
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        assert_eq!(json_candidate("```json\n{\"html\":\"x\"}"), "{\"html\":\"x\"}");
    }

    #[test]
    fn object_span_is_greedy() {
        assert_eq!(object_span("a {\"x\": {\"y\": 1}} b"), Some("{\"x\": {\"y\": 1}}"));
        assert_eq!(object_span("} backwards {"), None);
        assert_eq!(object_span("no braces"), None);
    }

    #[test]
    fn design_inside_prose() {
        let text = "Sure! Here is your button:\n{\"html\":\"<button>Hi</button>\",\"css\":\"button{color:red}\",\"javascript\":\"\"}\nEnjoy.";
        let out = extract_design(text);
        assert!(!out.is_fallback());
        assert_eq!(
            out.value,
            ElementDesign::new("<button>Hi</button>", "button{color:red}", "")
        );
    }

    #[test]
    fn design_with_braces_inside_strings() {
        let text = "```json\n{\"html\":\"<p>x</p>\",\"css\":\"p { margin: 0 }\",\"javascript\":\"if (a) { b(); }\"}\n```";
        let out = extract_design(text);
        assert_eq!(out.value.css, "p { margin: 0 }");
        assert_eq!(out.value.javascript, "if (a) { b(); }");
    }

    #[test]
    fn omitted_fields_default_to_empty() {
        let out = extract_design("```json\n{\"html\":\"<div></div>\"}\n```");
        assert_eq!(out.value, ElementDesign::new("<div></div>", "", ""));
    }

    #[test]
    fn no_braces_yields_error_design() {
        let out = extract_design("I cannot help with that.");
        assert_eq!(out.error, Some(ExtractionError::NoObjectFound));
        assert_eq!(out.value, error_design());
    }

    #[test]
    fn malformed_object_is_reported() {
        assert_matches!(parse_design("{html: nope}"), Err(ExtractionError::Malformed(_)));
        assert_matches!(
            parse_design("{\"html\": 42}"),
            Err(ExtractionError::Malformed(_))
        );
    }

    #[test]
    fn update_keeps_omitted_fields() {
        let current = ElementDesign::new("<a></a>", "a{}", "go()");
        let out = extract_design_update("{\"html\":\"<b></b>\",\"javascript\":\"stop()\"}", &current);
        assert_eq!(out.value, ElementDesign::new("<b></b>", "a{}", "stop()"));
    }

    #[test]
    fn failed_update_keeps_current_design() {
        let current = ElementDesign::new("<a></a>", "a{}", "");
        let out = extract_design_update("nothing useful", &current);
        assert!(out.is_fallback());
        assert_eq!(out.value, current);
    }

    #[test]
    fn fenced_blocks_are_independent() {
        let text = "```html\n<p>hi</p>\n```\nand\n```js\nalert(1)\n```";
        let design = extract_fenced_design(text, None);
        assert_eq!(design, ElementDesign::new("<p>hi</p>", "", "alert(1)"));
    }

    #[test]
    fn fenced_first_match_wins_and_prior_fills_gaps() {
        let prior = ElementDesign::new("<old/>", "old{}", "old()");
        let text = "```css\nfirst{}\n```\n```css\nsecond{}\n```";
        let design = extract_fenced_design(text, Some(&prior));
        assert_eq!(design, ElementDesign::new("<old/>", "first{}", "old()"));
    }

    #[test]
    fn fenced_json_block_is_not_javascript() {
        let design = extract_fenced_design("```json\n{}\n```", None);
        assert_eq!(design.javascript, "");
    }

    #[test]
    fn project_entry_defaults_to_first_file() {
        let text = r#"Here you go:
```json
{"name":"Todo","description":"A list","files":[
  {"name":"main.js","content":"init();","type":"js"},
  {"name":"style.css","content":"body{}"}
]}
```"#;
        let out = extract_project(text);
        assert!(!out.is_fallback());
        let project = out.value;
        assert_eq!(project.entry_file, "main.js");
        assert_eq!(project.files[1].file_type, AppFileType::Css);
    }

    #[test]
    fn project_without_files_falls_back_to_stub() {
        let out = extract_project("{\"name\":\"Empty\"}");
        assert_eq!(out.error, Some(ExtractionError::EmptyProject));
        assert_eq!(out.value, AppProject::error_stub());
    }

    #[test]
    fn project_update_keeps_entry_and_files() {
        let current = AppProject::starter();
        let out = extract_project_update("{\"name\":\"Renamed\"}", &current);
        assert_eq!(out.value.name, "Renamed");
        assert_eq!(out.value.entry_file, "app.js");
        assert_eq!(out.value.files, current.files);
    }

    #[test]
    fn failed_project_update_keeps_current() {
        let current = AppProject::starter();
        let out = extract_project_update("{\"files\": [oops]}", &current);
        assert_matches!(out.error, Some(ExtractionError::Malformed(_)));
        assert_eq!(out.value, current);
    }

    #[test]
    fn duplicate_files_keep_first() {
        let text = r#"{"files":[{"name":"a.js","content":"1"},{"name":"a.js","content":"2"}]}"#;
        let project = extract_project(text).value;
        assert_eq!(project.files.len(), 1);
        assert_eq!(project.files[0].content, "1");
    }

    #[test]
    fn dangling_entry_is_corrected() {
        let text = r#"{"entryFile":"gone.js","files":[{"name":"index.js","content":""}]}"#;
        assert_eq!(extract_project(text).value.entry_file, "index.js");
    }
}
