//! URI template compilation, matching and specificity ordering.
//!
//! # Grammar
//! ```text
//! template    := "/" segment*
//! segment     := literal | variable
//! variable    := "{" ["+"] name "}"
//! ```
//!
//! # Design Decisions
//! - Templates are validated once, at construction; a `UriTemplate` value is always well formed
//! - `{name}` captures one path segment (`[^/]+`), `{+name}` captures the rest (`.+`)
//! - A trailing `/index` literal is optional on match and stripped from the comparison key
//! - Equality is derived from the specificity comparator, never from field comparison

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use thiserror::Error;

const INDEX_SUFFIX: &str = "/index";
const SEGMENT_CAPTURE: &str = "([^/]+)";
const CATCH_ALL_CAPTURE: &str = "(.+)";
const OPTIONAL_INDEX: &str = "(?:index)?";

/// Errors produced while compiling a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template violates the grammar. `index` is the 1-based character
    /// position where the violation was detected.
    #[error("invalid URI template '{template}': {message} at index {index}")]
    InvalidTemplate {
        template: String,
        message: String,
        index: usize,
    },
}

impl TemplateError {
    fn invalid(template: &str, message: impl Into<String>, index: usize) -> Self {
        TemplateError::InvalidTemplate {
            template: template.to_string(),
            message: message.into(),
            index,
        }
    }

    /// 1-based character index of the violation.
    pub fn index(&self) -> usize {
        match self {
            TemplateError::InvalidTemplate { index, .. } => *index,
        }
    }
}

/// A variable declared in a template.
#[derive(Debug, Clone)]
struct Variable {
    name: String,
    catch_all: bool,
    /// Byte range of the whole `{...}` group within the template.
    start: usize,
    end: usize,
}

/// A compiled URI template.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    template: String,
    raw: String,
    matcher: Regex,
    variable_names: Vec<String>,
    has_index_suffix: bool,
    has_catch_all: bool,
}

impl UriTemplate {
    /// Compile a template string.
    pub fn compile(template: &str) -> Result<Self, TemplateError> {
        if template.is_empty() {
            return Err(TemplateError::invalid(template, "template is empty", 1));
        }
        if !template.starts_with('/') {
            return Err(TemplateError::invalid(
                template,
                "template must start with '/'",
                1,
            ));
        }

        let variables = scan_variables(template)?;
        let has_catch_all = variables.last().is_some_and(|v| v.catch_all);

        // `/{+a}index` is rejected by the scan, so an `/index` tail is always literal.
        let has_index_suffix = template.ends_with(INDEX_SUFFIX);
        let raw = if has_index_suffix {
            &template[..template.len() - "index".len()]
        } else {
            template
        };

        let mut pattern = String::with_capacity(raw.len() * 2 + 2);
        pattern.push('^');
        let mut cursor = 0;
        for variable in &variables {
            pattern.push_str(&regex::escape(&raw[cursor..variable.start]));
            pattern.push_str(if variable.catch_all {
                CATCH_ALL_CAPTURE
            } else {
                SEGMENT_CAPTURE
            });
            cursor = variable.end;
        }
        pattern.push_str(&regex::escape(&raw[cursor..]));
        if has_index_suffix {
            pattern.push_str(OPTIONAL_INDEX);
        }
        pattern.push('$');

        let matcher = Regex::new(&pattern).map_err(|e| {
            TemplateError::invalid(template, format!("cannot build matcher ({e})"), 1)
        })?;

        Ok(Self {
            template: template.to_string(),
            raw: raw.to_string(),
            matcher,
            variable_names: variables.into_iter().map(|v| v.name).collect(),
            has_index_suffix,
            has_catch_all,
        })
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Normalised comparison key (the template without a trailing `index`).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Variable names in declaration order.
    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    pub fn has_index_suffix(&self) -> bool {
        self.has_index_suffix
    }

    pub fn has_catch_all(&self) -> bool {
        self.has_catch_all
    }

    /// Whole-string match.
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// Extract variable values from `path`.
    ///
    /// Returns `None` when the path does not match and an empty map when it
    /// matches a template without variables.
    pub fn extract(&self, path: &str) -> Option<HashMap<String, String>> {
        let captures = self.matcher.captures(path)?;
        let values = self
            .variable_names
            .iter()
            .zip(captures.iter().skip(1))
            .filter_map(|(name, value)| value.map(|m| (name.clone(), m.as_str().to_string())))
            .collect();
        Some(values)
    }

    /// Specificity ordering: the more specific template is `Less`.
    ///
    /// Literal runs between variables are compared position by position and a
    /// longer run wins. If every shared position ties, the template with more
    /// runs wins. Templates with identical run lengths fall back to reverse
    /// lexicographic order of `raw`, which keeps the order total.
    pub fn compare(&self, other: &Self) -> Ordering {
        let ours = literal_runs(&self.raw);
        let theirs = literal_runs(&other.raw);

        for (a, b) in ours.iter().zip(theirs.iter()) {
            match b.len().cmp(&a.len()) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }

        theirs
            .len()
            .cmp(&ours.len())
            .then_with(|| other.raw.cmp(&self.raw))
    }
}

impl PartialEq for UriTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for UriTemplate {}

impl PartialOrd for UriTemplate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UriTemplate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Validate brace structure and collect variable declarations.
///
/// Stricter than the template grammar: `{}`, `{+}` and a name declared twice
/// are rejected too, since neither can be extracted unambiguously.
fn scan_variables(template: &str) -> Result<Vec<Variable>, TemplateError> {
    let mut variables: Vec<Variable> = Vec::new();
    let mut open: Option<(usize, usize)> = None; // (byte offset, 1-based index)
    let mut catch_all_closed = false;

    for (position, (offset, ch)) in template.char_indices().enumerate() {
        let index = position + 1;

        if catch_all_closed {
            return Err(TemplateError::invalid(
                template,
                "characters are not allowed after a catch-all variable",
                index,
            ));
        }

        match ch {
            '{' => {
                if open.is_some() {
                    return Err(TemplateError::invalid(
                        template,
                        "nested variables are not allowed",
                        index,
                    ));
                }
                open = Some((offset, index));
            }
            '}' => {
                let Some((start, _)) = open.take() else {
                    return Err(TemplateError::invalid(
                        template,
                        "unmatched '}'",
                        index,
                    ));
                };
                let body = &template[start + 1..offset];
                let (name, catch_all) = match body.strip_prefix('+') {
                    Some(name) => (name, true),
                    None => (body, false),
                };
                if name.is_empty() {
                    return Err(TemplateError::invalid(
                        template,
                        "variable name is empty",
                        index,
                    ));
                }
                if variables.iter().any(|v| v.name == name) {
                    return Err(TemplateError::invalid(
                        template,
                        format!("variable '{name}' is declared more than once"),
                        index,
                    ));
                }
                variables.push(Variable {
                    name: name.to_string(),
                    catch_all,
                    start,
                    end: offset + 1,
                });
                catch_all_closed = catch_all;
            }
            _ => {}
        }
    }

    if let Some((_, index)) = open {
        return Err(TemplateError::invalid(template, "unterminated '{'", index));
    }

    Ok(variables)
}

/// Literal runs of a normalised template, split on variable groups.
///
/// A template with `n` variables always yields `n + 1` runs, some possibly empty.
fn literal_runs(raw: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut cursor = 0;
    let mut open = None;
    for (offset, ch) in raw.char_indices() {
        match ch {
            '{' => {
                runs.push(&raw[cursor..offset]);
                open = Some(offset);
            }
            '}' if open.take().is_some() => cursor = offset + 1,
            _ => {}
        }
    }
    runs.push(&raw[cursor..]);
    runs
}
