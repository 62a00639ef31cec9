//! Jupyter notebook document model (nbformat 4).
//!
//! Only the fields needed for rendering are typed. Outputs are kept as raw
//! JSON and classified lazily so that unknown output kinds can still be shown.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::NotebookError;

/// A parsed notebook.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: NotebookMetadata,
}

impl Notebook {
    /// Parse notebook JSON.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, NotebookError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Language used to highlight code cells. Defaults to `python`.
    #[must_use]
    pub fn language(&self) -> &str {
        self.metadata
            .language_info
            .as_ref()
            .and_then(|info| info.name.as_deref())
            .or_else(|| {
                self.metadata
                    .kernelspec
                    .as_ref()
                    .and_then(|spec| spec.language.as_deref())
            })
            .filter(|name| !name.is_empty())
            .unwrap_or("python")
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NotebookMetadata {
    #[serde(default)]
    pub language_info: Option<LanguageInfo>,
    #[serde(default)]
    pub kernelspec: Option<KernelSpec>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LanguageInfo {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct KernelSpec {
    #[serde(default)]
    pub language: Option<String>,
}

/// A notebook cell.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "cell_type", rename_all = "snake_case")]
pub enum Cell {
    Markdown {
        #[serde(default, deserialize_with = "multiline")]
        source: String,
    },
    Code {
        #[serde(default, deserialize_with = "multiline")]
        source: String,
        #[serde(default)]
        outputs: Vec<Value>,
    },
    Raw {
        #[serde(default, deserialize_with = "multiline")]
        source: String,
    },
    /// A cell type this renderer does not know.
    #[serde(other)]
    Unknown,
}

/// A classified code cell output.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    Stream {
        name: String,
        text: String,
    },
    ExecuteResult {
        data: Map<String, Value>,
    },
    DisplayData {
        data: Map<String, Value>,
    },
    Error {
        ename: String,
        evalue: String,
        traceback: Vec<String>,
    },
    /// Anything else, shown as JSON.
    Unknown(Value),
}

#[derive(Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
enum KnownOutput {
    Stream {
        #[serde(default = "default_stream")]
        name: String,
        #[serde(default, deserialize_with = "multiline")]
        text: String,
    },
    ExecuteResult {
        #[serde(default)]
        data: Map<String, Value>,
    },
    DisplayData {
        #[serde(default)]
        data: Map<String, Value>,
    },
    Error {
        #[serde(default)]
        ename: String,
        #[serde(default)]
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

fn default_stream() -> String {
    "stdout".to_owned()
}

impl Output {
    /// Classify a raw output object.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match KnownOutput::deserialize(value) {
            Ok(KnownOutput::Stream { name, text }) => Self::Stream { name, text },
            Ok(KnownOutput::ExecuteResult { data }) => Self::ExecuteResult { data },
            Ok(KnownOutput::DisplayData { data }) => Self::DisplayData { data },
            Ok(KnownOutput::Error {
                ename,
                evalue,
                traceback,
            }) => Self::Error {
                ename,
                evalue,
                traceback,
            },
            Err(_) => Self::Unknown(value.clone()),
        }
    }
}

/// Join a string or string-array JSON value.
#[must_use]
pub fn join_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Array(lines) => lines
            .iter()
            .map(|line| line.as_str())
            .collect::<Option<Vec<_>>>()
            .map(|lines| lines.concat()),
        _ => None,
    }
}

fn multiline<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Multiline {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Multiline>::deserialize(deserializer)? {
        Some(Multiline::One(text)) => text,
        Some(Multiline::Many(lines)) => lines.concat(),
        None => String::new(),
    })
}
