//! Label templates
//!
//! Templates use `{name}` placeholders, with `{{` and `}}` standing for literal
//! braces. A template is parsed once against the set of placeholder names it
//! may use, so typos surface as configuration errors before any page is touched.

use crate::error::{Error, Result};

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed label template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`, rejecting any placeholder not listed in `allowed`
    ///
    /// # Example
    ///
    /// ```
    /// use logbook_maker::template::Template;
    ///
    /// let template = Template::parse("{number} / {total}", &["number", "total"]).unwrap();
    /// assert_eq!(template.render(&[("number", "3"), ("total", "10")]), "3 / 10");
    /// ```
    pub fn parse(source: &str, allowed: &[&str]) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(Error::config(format!(
                            "unclosed '{{' in template \"{}\"",
                            source
                        )));
                    }
                    let name = name.trim();
                    if !allowed.contains(&name) {
                        return Err(Error::config(format!(
                            "unknown placeholder {{{}}} in template \"{}\" (expected one of: {})",
                            name,
                            source,
                            allowed
                                .iter()
                                .map(|a| format!("{{{}}}", a))
                                .collect::<Vec<_>>()
                                .join(", ")
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name.to_string()));
                }
                '}' => {
                    return Err(Error::config(format!(
                        "single '}}' in template \"{}\" (use '}}}}' for a literal brace)",
                        source
                    )));
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Substitute placeholder values
    ///
    /// Every placeholder was checked against the allowed names at parse time;
    /// a placeholder missing from `values` renders as an empty string.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    if let Some((_, value)) = values.iter().find(|(key, _)| key == name) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }

}
