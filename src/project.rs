use serde::{Deserialize, Serialize};

use crate::error::ProjectError;

/// The `{html, css, javascript}` triple describing one UI element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDesign {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub javascript: String,
}

impl ElementDesign {
    pub fn new(
        html: impl Into<String>,
        css: impl Into<String>,
        javascript: impl Into<String>,
    ) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            javascript: javascript.into(),
        }
    }

    /// No markup yet. CSS or script alone does not render anything.
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppFileType {
    #[default]
    Js,
    Jsx,
    Ts,
    Tsx,
    Css,
    Html,
    Json,
    Md,
}

impl AppFileType {
    /// Guess the type from a file name's extension. Unknown extensions count as `js`.
    pub fn from_file_name(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jsx" => AppFileType::Jsx,
            "ts" => AppFileType::Ts,
            "tsx" => AppFileType::Tsx,
            "css" => AppFileType::Css,
            "html" | "htm" => AppFileType::Html,
            "json" => AppFileType::Json,
            "md" => AppFileType::Md,
            _ => AppFileType::Js,
        }
    }

    /// Parse a `type` tag as written by a model, e.g. `"tsx"` or `"javascript"`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "js" | "javascript" => Some(AppFileType::Js),
            "jsx" => Some(AppFileType::Jsx),
            "ts" | "typescript" => Some(AppFileType::Ts),
            "tsx" => Some(AppFileType::Tsx),
            "css" => Some(AppFileType::Css),
            "html" => Some(AppFileType::Html),
            "json" => Some(AppFileType::Json),
            "md" | "markdown" => Some(AppFileType::Md),
            _ => None,
        }
    }

    /// Whether the file is loaded as a script in the preview.
    pub fn is_script(&self) -> bool {
        matches!(
            self,
            AppFileType::Js | AppFileType::Jsx | AppFileType::Ts | AppFileType::Tsx
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppFile {
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub file_type: AppFileType,
}

impl AppFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>, file_type: AppFileType) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            file_type,
        }
    }
}

/// A named multi-file app with a designated entry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppProject {
    pub name: String,
    pub description: String,
    #[serde(rename = "entryFile")]
    pub entry_file: String,
    pub files: Vec<AppFile>,
}

impl AppProject {
    pub fn file(&self, name: &str) -> Option<&AppFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn entry(&self) -> Option<&AppFile> {
        self.file(&self.entry_file)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.file(name).is_some()
    }

    pub fn update_file(&mut self, name: &str, content: impl Into<String>) -> Result<(), ProjectError> {
        let file = self
            .files
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| ProjectError::UnknownFile(name.to_string()))?;
        file.content = content.into();
        Ok(())
    }

    pub fn add_file(&mut self, name: &str, file_type: AppFileType) -> Result<(), ProjectError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProjectError::EmptyFileName);
        }
        if self.has_file(name) {
            return Err(ProjectError::DuplicateFile(name.to_string()));
        }
        self.files.push(AppFile::new(name, "", file_type));
        Ok(())
    }

    pub fn delete_file(&mut self, name: &str) -> Result<AppFile, ProjectError> {
        if name == self.entry_file {
            return Err(ProjectError::EntryFileProtected(name.to_string()));
        }
        let idx = self
            .files
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| ProjectError::UnknownFile(name.to_string()))?;
        Ok(self.files.remove(idx))
    }

    /// Point a dangling `entry_file` at the first file.
    ///
    /// Returns true when the entry file was changed. A project without files is
    /// left untouched.
    pub fn normalize_entry(&mut self) -> bool {
        if self.has_file(&self.entry_file) {
            return false;
        }
        match self.files.first() {
            Some(first) => {
                log::warn!(
                    "entry file {:?} not in project {:?}, using {:?}",
                    self.entry_file,
                    self.name,
                    first.name
                );
                self.entry_file = first.name.clone();
                true
            }
            None => false,
        }
    }

    /// Single-file project shown when a generated response could not be used.
    pub fn error_stub() -> Self {
        Self {
            name: "Error Project".to_string(),
            description: "There was an error generating the project".to_string(),
            entry_file: "app.js".to_string(),
            files: vec![AppFile::new(
                "app.js",
                "console.error(\"Failed to generate project files\");",
                AppFileType::Js,
            )],
        }
    }

    /// The sample project a fresh app-generator session starts from.
    pub fn starter() -> Self {
        Self {
            name: "Hello World App".to_string(),
            description: "A simple starter app to demonstrate the app generator".to_string(),
            entry_file: "app.js".to_string(),
            files: vec![
                AppFile::new("app.js", STARTER_JS, AppFileType::Js),
                AppFile::new("styles.css", STARTER_CSS, AppFileType::Css),
                AppFile::new("index.html", STARTER_HTML, AppFileType::Html),
            ],
        }
    }
}

const STARTER_JS: &str = r#"// Main application entry point
document.addEventListener('DOMContentLoaded', function() {
  const app = document.getElementById('app');

  const header = document.createElement('header');
  header.innerHTML = '<h1>Hello World App</h1>';

  const content = document.createElement('div');
  content.className = 'content';
  content.innerHTML = '<p>Welcome to your generated app! Ask the AI to modify this app or create something new.</p>';

  const button = document.createElement('button');
  button.textContent = 'Click Me';
  button.className = 'main-button';
  button.addEventListener('click', function() {
    this.textContent = 'Clicked!';
    setTimeout(() => {
      this.textContent = 'Click Me';
    }, 1000);
  });

  app.appendChild(header);
  app.appendChild(content);
  app.appendChild(button);
});"#;

const STARTER_CSS: &str = r#"/* App styles */
body {
  font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
  background: linear-gradient(135deg, #f5f7fa 0%, #c3cfe2 100%);
  margin: 0;
  padding: 0;
  min-height: 100vh;
  display: flex;
  justify-content: center;
  align-items: center;
}

#app {
  background: white;
  padding: 2rem;
  border-radius: 1rem;
  box-shadow: 0 10px 30px rgba(0, 0, 0, 0.1);
  width: 80%;
  max-width: 600px;
  text-align: center;
}

h1 {
  color: #8B5CF6;
  margin-top: 0;
}

.content {
  margin: 2rem 0;
  line-height: 1.6;
  color: #4B5563;
}

.main-button {
  background-color: #8B5CF6;
  color: white;
  border: none;
  padding: 0.75rem 1.5rem;
  border-radius: 9999px;
  font-weight: 500;
  cursor: pointer;
  transition: background-color 0.3s ease;
}

.main-button:hover {
  background-color: #7C3AED;
}"#;

const STARTER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Hello World App</title>
  <link rel="stylesheet" href="styles.css">
</head>
<body>
  <div id="app"></div>
  <script src="app.js"></script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn file_type_from_extension() {
        assert_eq!(AppFileType::from_file_name("main.tsx"), AppFileType::Tsx);
        assert_eq!(AppFileType::from_file_name("README.md"), AppFileType::Md);
        assert_eq!(AppFileType::from_file_name("index.HTML"), AppFileType::Html);
        assert_eq!(AppFileType::from_file_name("Makefile"), AppFileType::Js);
    }

    #[test]
    fn project_serializes_with_wire_field_names() {
        let json = serde_json::to_value(AppProject::starter()).unwrap();
        assert_eq!(json["entryFile"], "app.js");
        assert_eq!(json["files"][1]["type"], "css");
    }

    #[test]
    fn add_file_rejects_empty_and_duplicate_names() {
        let mut project = AppProject::starter();
        assert_matches!(project.add_file("  ", AppFileType::Js), Err(ProjectError::EmptyFileName));
        assert_matches!(
            project.add_file("app.js", AppFileType::Js),
            Err(ProjectError::DuplicateFile(_))
        );
        project.add_file("utils.js", AppFileType::Js).unwrap();
        assert_eq!(project.file("utils.js").unwrap().content, "");
    }

    #[test]
    fn entry_file_cannot_be_deleted() {
        let mut project = AppProject::starter();
        assert_matches!(
            project.delete_file("app.js"),
            Err(ProjectError::EntryFileProtected(_))
        );
        let removed = project.delete_file("styles.css").unwrap();
        assert_eq!(removed.file_type, AppFileType::Css);
        assert_eq!(project.files.len(), 2);
    }

    #[test]
    fn update_unknown_file_fails() {
        let mut project = AppProject::starter();
        assert_matches!(project.update_file("nope.js", "x"), Err(ProjectError::UnknownFile(_)));
        project.update_file("app.js", "console.log(1);").unwrap();
        assert_eq!(project.entry().unwrap().content, "console.log(1);");
    }

    #[test]
    fn normalize_entry_points_at_first_file() {
        let mut project = AppProject::starter();
        project.entry_file = "missing.js".to_string();
        assert!(project.normalize_entry());
        assert_eq!(project.entry_file, "app.js");
        assert!(!project.normalize_entry());
    }
}
