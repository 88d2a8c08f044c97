//! Compilation of declared route paths such as `/api/data/:id/:name`.

use regex::Regex;

use crate::error::ConfigurationError;
use crate::params::{self, PathParams};

/// Matches a run of one or more characters up to the next path separator.
const PARAM_CAPTURE: &str = "([^/]+)";

/// A declared route path compiled into an anchored matcher.
///
/// Segments starting with `:` become named parameters matching at least one
/// character other than `/`; every other segment is matched literally.
/// `param_names` always has exactly one entry per capture group.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    matcher: Regex,
    param_names: Vec<String>,
}

impl PathPattern {
    pub fn compile(path: &str) -> Result<Self, ConfigurationError> {
        let Some(rest) = path.strip_prefix('/') else {
            return Err(ConfigurationError::MissingLeadingSlash { path: path.to_owned() });
        };

        let mut expression = String::with_capacity(path.len() + 16);
        let mut param_names: Vec<String> = Vec::new();
        expression.push('^');

        for (index, segment) in rest.split('/').enumerate() {
            expression.push('/');

            let Some(name) = segment.strip_prefix(':') else {
                if segment.contains(':') {
                    return Err(ConfigurationError::MisplacedParam { path: path.to_owned(), segment: index + 1 });
                }
                expression.push_str(&regex::escape(segment));
                continue;
            };

            if name.is_empty() {
                return Err(ConfigurationError::EmptyParamName { path: path.to_owned(), segment: index + 1 });
            }
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigurationError::InvalidParamName { path: path.to_owned(), name: name.to_owned() });
            }
            if param_names.iter().any(|existing| existing == name) {
                return Err(ConfigurationError::DuplicateParamName { path: path.to_owned(), name: name.to_owned() });
            }

            expression.push_str(PARAM_CAPTURE);
            param_names.push(name.to_owned());
        }
        expression.push('$');

        let matcher = Regex::new(&expression)
            .map_err(|e| ConfigurationError::InvalidPattern { path: path.to_owned(), reason: e.to_string() })?;

        Ok(Self { source: path.to_owned(), matcher, param_names })
    }

    /// The path as it was declared.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// Binds the parameters of `path`, or `None` when the path does not match.
    pub fn extract(&self, path: &str) -> Option<PathParams> {
        let captures = self.matcher.captures(path)?;
        Some(params::extract(&self.param_names, &captures))
    }
}
