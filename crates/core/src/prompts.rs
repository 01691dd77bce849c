use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::PromptConfig;

const BUILT_IN_PROMPTS: &str = include_str!("../prompts/default.toml");

pub type PromptArguments = HashMap<String, String>;

/// A named instruction template. Placeholders use `{name}` syntax with
/// `{{`/`}}` as literal braces; unless a prompt declares an explicit
/// `required` list, every placeholder is required at render time.
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    key: String,
    template: String,
    segments: Vec<TemplateSegment>,
    placeholders: BTreeSet<String>,
    required: BTreeSet<String>,
}

impl PromptTemplate {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(|s| s.as_str())
    }

    pub fn render(&self, arguments: &PromptArguments) -> Result<String, PromptError> {
        for required in &self.required {
            if !arguments.contains_key(required) {
                return Err(PromptError::MissingArgument {
                    key: self.key.clone(),
                    argument: required.clone(),
                });
            }
        }

        let mut output = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => output.push_str(text),
                TemplateSegment::Placeholder(name) => {
                    if let Some(value) = arguments.get(name) {
                        output.push_str(value);
                    }
                }
            }
        }

        Ok(output)
    }

    pub fn render_with<I, K, V>(&self, arguments: I) -> Result<String, PromptError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = PromptArguments::new();
        for (key, value) in arguments {
            map.insert(key.into(), value.into());
        }
        self.render(&map)
    }

    fn from_raw(key: String, raw: RawPrompt) -> Result<Self, PromptError> {
        let (segments, placeholders) = parse_template(&raw.template);
        let required = if raw.required.is_empty() {
            placeholders.clone()
        } else {
            let mut set = BTreeSet::new();
            for argument in raw.required {
                let trimmed = argument.trim().to_string();
                if !placeholders.contains(&trimmed) {
                    return Err(PromptError::InvalidRequired {
                        key: key.clone(),
                        argument: trimmed,
                    });
                }
                set.insert(trimmed);
            }
            set
        };

        Ok(Self {
            key,
            template: raw.template,
            segments,
            placeholders,
            required,
        })
    }
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("プロンプト `{0}` が見つかりません")]
    NotFound(String),
    #[error("プロンプト `{key}` の引数 `{argument}` が指定されていません")]
    MissingArgument { key: String, argument: String },
    #[error("プロンプトファイル `{path}` の読み込みに失敗しました: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("内蔵プロンプト定義の解析に失敗しました: {0}")]
    ParseBuiltIn(toml::de::Error),
    #[error("プロンプトファイル `{path}` の解析に失敗しました: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("プロンプト `{key}` の必須引数 `{argument}` に対応するプレースホルダーがありません")]
    InvalidRequired { key: String, argument: String },
}

/// Built-in YAE prompt set, optionally overlaid by TOML files from
/// configured custom directories (later directories win).
#[derive(Debug)]
pub struct PromptRegistry {
    prompts: BTreeMap<String, PromptTemplate>,
    directories: Vec<PathBuf>,
}

impl PromptRegistry {
    pub fn new() -> Result<Self, PromptError> {
        Self::from_prompt_config(&PromptConfig::default())
    }

    pub fn from_prompt_config(config: &PromptConfig) -> Result<Self, PromptError> {
        Self::with_directories(config.custom_directories.clone())
    }

    pub fn with_custom_directories<P: AsRef<Path>>(directories: &[P]) -> Result<Self, PromptError> {
        Self::with_directories(
            directories
                .iter()
                .map(|p| p.as_ref().to_path_buf())
                .collect(),
        )
    }

    pub fn custom_directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn get(&self, key: &str) -> Option<&PromptTemplate> {
        self.prompts.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.prompts.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.prompts.keys().map(|k| k.as_str())
    }

    pub fn format(&self, key: &str, args: &PromptArguments) -> Result<String, PromptError> {
        let template = self
            .get(key)
            .ok_or_else(|| PromptError::NotFound(key.to_string()))?;
        template.render(args)
    }

    pub fn format_with<I, K, V>(&self, key: &str, arguments: I) -> Result<String, PromptError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let template = self
            .get(key)
            .ok_or_else(|| PromptError::NotFound(key.to_string()))?;
        template.render_with(arguments)
    }

    fn with_directories(directories: Vec<PathBuf>) -> Result<Self, PromptError> {
        let mut prompts = BTreeMap::new();

        for template in parse_document(BUILT_IN_PROMPTS)? {
            prompts.insert(template.key().to_string(), template);
        }

        for dir in &directories {
            load_directory(dir, &mut prompts)?;
        }

        Ok(Self {
            prompts,
            directories,
        })
    }
}

fn load_directory(
    dir: &Path,
    prompts: &mut BTreeMap<String, PromptTemplate>,
) -> Result<(), PromptError> {
    if !dir.is_dir() {
        return Ok(());
    }

    let mut files = Vec::new();
    let read_dir = fs::read_dir(dir).map_err(|source| PromptError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in read_dir {
        let entry = entry.map_err(|source| PromptError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);
        if path.is_file() && is_toml {
            files.push(path);
        }
    }

    files.sort();

    for path in files {
        let contents = fs::read_to_string(&path).map_err(|source| PromptError::Io {
            path: path.clone(),
            source,
        })?;
        let document: PromptDocument =
            toml::from_str(&contents).map_err(|source| PromptError::ParseToml {
                path: path.clone(),
                source,
            })?;
        for (key, raw) in document.prompts {
            let template = PromptTemplate::from_raw(key.clone(), raw)?;
            prompts.insert(key, template);
        }
    }

    Ok(())
}

fn parse_document(source: &str) -> Result<Vec<PromptTemplate>, PromptError> {
    let document: PromptDocument = toml::from_str(source).map_err(PromptError::ParseBuiltIn)?;
    let mut templates = Vec::new();
    for (key, raw) in document.prompts {
        templates.push(PromptTemplate::from_raw(key, raw)?);
    }
    Ok(templates)
}

#[derive(Debug, Deserialize)]
struct PromptDocument {
    #[serde(default)]
    prompts: BTreeMap<String, RawPrompt>,
}

#[derive(Debug, Deserialize)]
struct RawPrompt {
    #[serde(alias = "text")]
    template: String,
    #[serde(default)]
    required: Vec<String>,
}

#[derive(Clone, Debug)]
enum TemplateSegment {
    Literal(String),
    Placeholder(String),
}

fn parse_template(template: &str) -> (Vec<TemplateSegment>, BTreeSet<String>) {
    let mut segments = Vec::new();
    let mut placeholders = BTreeSet::new();
    let mut buffer = String::new();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                if matches!(chars.peek(), Some('{')) {
                    chars.next();
                    buffer.push('{');
                    continue;
                }

                if !buffer.is_empty() {
                    segments.push(TemplateSegment::Literal(std::mem::take(&mut buffer)));
                }

                let mut placeholder = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    placeholder.push(next);
                }

                if closed {
                    let trimmed = placeholder.trim();
                    if trimmed.is_empty() {
                        segments.push(TemplateSegment::Literal("{}".to_string()));
                    } else {
                        let key = trimmed.to_string();
                        placeholders.insert(key.clone());
                        segments.push(TemplateSegment::Placeholder(key));
                    }
                } else {
                    buffer.push('{');
                    buffer.push_str(&placeholder);
                }
            }
            '}' => {
                if matches!(chars.peek(), Some('}')) {
                    chars.next();
                }
                buffer.push('}');
            }
            _ => buffer.push(ch),
        }
    }

    if !buffer.is_empty() {
        segments.push(TemplateSegment::Literal(buffer));
    }

    (segments, placeholders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn built_in_set_contains_all_stage_prompts() {
        let registry = PromptRegistry::new().expect("registry");
        for key in [
            "writer_system",
            "writer_instruction",
            "evaluator_system",
            "evaluator_instruction",
            "editor_system",
            "editor_context",
        ] {
            assert!(registry.contains(key), "missing built-in prompt `{key}`");
        }
    }

    #[test]
    fn system_prompts_have_no_placeholders() {
        let registry = PromptRegistry::new().expect("registry");
        for key in ["writer_system", "evaluator_system", "editor_system"] {
            let template = registry.get(key).unwrap();
            assert_eq!(
                template.placeholders().count(),
                0,
                "`{key}` must be a fixed instruction"
            );
        }
    }

    #[test]
    fn renders_writer_instruction() {
        let registry = PromptRegistry::new().expect("registry");
        let output = registry
            .format_with(
                "writer_instruction",
                [("survey_data", "Q1: SNSで最もよく使うのは？")],
            )
            .expect("rendered");
        assert!(output.contains("Q1: SNSで最もよく使うのは？"));
        assert!(output.contains("JSON"));
    }

    #[test]
    fn missing_argument_fails() {
        let registry = PromptRegistry::new().expect("registry");
        let template = registry.get("evaluator_instruction").expect("template");
        let args = PromptArguments::from([("survey_data".into(), "データ".into())]);
        let error = template.render(&args).expect_err("missing args");
        match error {
            PromptError::MissingArgument { argument, .. } => {
                assert!(argument == "article_body" || argument == "article_title");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn custom_directory_overrides_built_in() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            "[prompts.writer_instruction]\ntemplate = \"カスタム {survey_data}\"\n",
        )
        .unwrap();

        let registry = PromptRegistry::with_custom_directories(&[dir.path()]).unwrap();
        let output = registry
            .format_with("writer_instruction", [("survey_data", "テスト")])
            .unwrap();
        assert_eq!(output, "カスタム テスト");
    }

    #[test]
    fn escaped_braces_stay_literal() {
        let (segments, placeholders) = parse_template("JSON例: {{\"a\": 1}}");
        assert!(placeholders.is_empty());
        let rendered: String = segments
            .iter()
            .map(|s| match s {
                TemplateSegment::Literal(text) => text.as_str(),
                TemplateSegment::Placeholder(_) => "",
            })
            .collect();
        assert_eq!(rendered, "JSON例: {\"a\": 1}");
    }
}
