//! Fixture files: declaration documents plus values the root guard must accept or reject.
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use guardgen::codegen::emit_expression;
use guardgen::declarations::{DeclarationDocument, DeclarationSet};
use guardgen::lower::lower_to_validation;

use crate::js;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    #[serde(default)]
    pub description: String,
    pub documents: Vec<DeclarationDocument>,
    pub root: String,
    #[serde(default = "default_variable")]
    pub variable: String,
    #[serde(default)]
    pub accept: Vec<Value>,
    #[serde(default)]
    pub reject: Vec<Value>,
}

#[derive(Debug)]
pub struct Mismatch {
    pub value: Value,
    pub expected: bool,
    pub outcome: Result<bool, js::JsError>,
}

#[derive(Debug)]
pub struct Report {
    pub path: PathBuf,
    pub expression: String,
    pub checked: usize,
    pub mismatches: Vec<Mismatch>,
}

fn default_variable() -> String {
    "value".to_owned()
}

impl Fixture {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let de = &mut serde_json::Deserializer::from_str(&src);
        serde_path_to_error::deserialize(de)
            .with_context(|| format!("failed to parse fixture {}", path.display()))
    }

    /// Emit the root guard and evaluate it against every sample.
    pub fn run(&self, path: &Path) -> anyhow::Result<Report> {
        let mut set = DeclarationSet::new();
        for document in &self.documents {
            set.extend(document.clone())?;
        }
        let graph = set.build(&self.root)?;
        let expression = emit_expression(&lower_to_validation(&graph.root().target), &self.variable)?;

        let samples = self
            .accept
            .iter()
            .map(|v| (v, true))
            .chain(self.reject.iter().map(|v| (v, false)));
        let mut mismatches = Vec::new();
        let mut checked = 0;
        for (value, expected) in samples {
            checked += 1;
            let outcome = js::evaluate(&expression, &self.variable, value);
            if outcome.as_ref().ok() != Some(&expected) {
                mismatches.push(Mismatch { value: value.clone(), expected, outcome });
            }
        }
        Ok(Report { path: path.to_path_buf(), expression, checked, mismatches })
    }
}

impl Report {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// File name of the fixture, for one-line summaries.
    pub fn label(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
