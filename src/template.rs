use std::path::{Path, PathBuf};

use crate::error::EvalError;

/// Marker replaced by the equation body when a template is instantiated.
pub const EQUATION_MARKER: &str = "%%EQUATION%%";

const STANDALONE_TEMPLATE: &str = r"\documentclass[border=2pt]{standalone}
\usepackage{amsmath}
\usepackage{amssymb}
\usepackage{amsfonts}
\begin{document}
$\displaystyle %%EQUATION%%$
\end{document}
";

/// A LaTeX document with a single substitution point for the equation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatexTemplate {
    source: String,
    path: Option<PathBuf>,
}

impl LatexTemplate {
    pub fn parse(source: impl Into<String>) -> Result<Self, EvalError> {
        let source = source.into();
        match source.matches(EQUATION_MARKER).count() {
            1 => Ok(Self { source, path: None }),
            0 => Err(EvalError::invalid_input(format!(
                "LaTeX template has no {EQUATION_MARKER} marker"
            ))),
            n => Err(EvalError::invalid_input(format!(
                "LaTeX template has {n} {EQUATION_MARKER} markers, expected one"
            ))),
        }
    }

    /// Minimal `standalone` document with amsmath loaded.
    pub fn standalone() -> Self {
        Self {
            source: STANDALONE_TEMPLATE.to_string(),
            path: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn instantiate(&self, equation: &str) -> String {
        self.source.replacen(EQUATION_MARKER, equation, 1)
    }
}

/// Load a template file.
pub fn mk_template(path: &Path) -> Result<LatexTemplate, EvalError> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| EvalError::io("reading LaTeX template", path, e))?;
    let mut template = LatexTemplate::parse(source)?;
    template.path = Some(path.to_path_buf());
    Ok(template)
}
