use std::fmt;

/// Advisory warning about missing binding inputs. Never blocks a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    MissingIndexAndStore { engine: String },
    MissingIndex { engine: String },
    MissingStore { engine: String },
}

impl Diagnostic {
    pub(crate) fn for_inputs(engine: &str, has_index: bool, has_store: bool) -> Option<Self> {
        let engine = engine.to_string();
        match (has_index, has_store) {
            (false, false) => Some(Diagnostic::MissingIndexAndStore { engine }),
            (false, true) => Some(Diagnostic::MissingIndex { engine }),
            (true, false) => Some(Diagnostic::MissingStore { engine }),
            (true, true) => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingIndexAndStore { engine } => write!(
                f,
                "A {engine} index and store was not provided. Your search results will be empty."
            ),
            Diagnostic::MissingIndex { engine } => write!(
                f,
                "A {engine} index was not provided. Your search results will be empty."
            ),
            Diagnostic::MissingStore { engine } => write!(
                f,
                "A {engine} store was not provided. Your search results will be empty."
            ),
        }
    }
}
