use crate::{
    error::{Result, SkdError, SyntaxError},
    parser::properties::tokenize,
};

const DOCTYPE: &str = "DOCTYPE";
const SKD: &str = "SKD";
const VERSION: &str = "version";

/// What a single document line holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `<!NAME ...>`
    Declaration(&'a str),
    /// `<SKD ...>`, the pre-0.2 spelling of the version declaration
    LegacyDeclaration(&'a str),
    /// `<name ... />`
    VoidTag(&'a str),
    /// `</name>`
    ClosingTag(&'a str),
    /// `<name ...>`
    OpeningTag(&'a str),
    Blank,
    Content(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number
    pub number: usize,
    /// Number of leading tabs
    pub indent: usize,
    pub kind: LineKind<'a>,
}

impl<'a> Line<'a> {
    pub fn classify(number: usize, raw: &'a str) -> Self {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let body = raw.trim_start_matches('\t');
        let indent = raw.len() - body.len();
        let markup = body.trim_end();

        let kind = if markup.starts_with("<!") {
            LineKind::Declaration(markup)
        } else if is_legacy_declaration(markup) {
            LineKind::LegacyDeclaration(markup)
        } else if markup.starts_with('<') {
            if markup.ends_with("/>") {
                LineKind::VoidTag(markup)
            } else if markup.starts_with("</") {
                LineKind::ClosingTag(markup)
            } else {
                LineKind::OpeningTag(markup)
            }
        } else if markup.is_empty() {
            LineKind::Blank
        } else {
            LineKind::Content(body)
        };

        Self {
            number,
            indent,
            kind,
        }
    }

    /// 1-based column of the first character after the indentation
    pub fn column(&self) -> usize {
        self.indent + 1
    }
}

fn is_legacy_declaration(markup: &str) -> bool {
    markup
        .strip_prefix("<SKD")
        .is_some_and(|rest| rest.starts_with(' ') || rest.starts_with('>'))
}

/// Name and raw property list of an opening or void tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHead<'a> {
    pub name: &'a str,
    pub properties: &'a str,
}

pub fn split_tag(markup: &str, void: bool) -> Result<TagHead<'_>> {
    let inner = markup.strip_prefix('<').and_then(|rest| {
        if void {
            rest.strip_suffix("/>")
        } else {
            rest.strip_suffix('>')
        }
    });
    let inner = inner
        .map(str::trim_end)
        .ok_or_else(|| malformed(markup))?;

    let (name, properties) = match inner.find(' ') {
        Some(split) => (inner.get(..split), inner.get(split + 1..)),
        None => (Some(inner), Some("")),
    };
    let name = name.ok_or_else(|| malformed(markup))?;
    if !is_valid_name(name) {
        return Err(malformed(markup));
    }

    Ok(TagHead {
        name,
        properties: properties.map(str::trim).unwrap_or_default(),
    })
}

/// Name of a `</name>` tag
pub fn closing_name(markup: &str) -> Result<&str> {
    if markup.contains(char::is_whitespace) {
        return Err(SkdError::syntax(SyntaxError::SpacesInClosingTag(
            markup.to_string(),
        )));
    }
    markup
        .strip_prefix("</")
        .and_then(|rest| rest.strip_suffix('>'))
        .filter(|name| is_valid_name(name))
        .ok_or_else(|| malformed(markup))
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['<', '>', '"', '=', '/', '\t'])
}

fn malformed(markup: &str) -> SkdError {
    SkdError::syntax(SyntaxError::MalformedTag(markup.to_string()))
}

/// A recognized document declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Doctype(String),
    Version(String),
}

impl Declaration {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Doctype(_) => DOCTYPE,
            Self::Version(_) => SKD,
        }
    }
}

/// Parses `<!DOCTYPE skd {stylesheet}>` or `<!SKD version="{version}">`
pub fn parse_declaration(markup: &str) -> Result<Declaration> {
    let inner = markup
        .strip_prefix("<!")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(str::trim)
        .ok_or_else(|| {
            SkdError::syntax(SyntaxError::InvalidDeclaration(markup.to_string()))
        })?;

    let name = inner.split_whitespace().next().unwrap_or_default();
    if name.eq_ignore_ascii_case(DOCTYPE) {
        parse_doctype(inner)
    } else if name.eq_ignore_ascii_case(SKD) {
        parse_version(inner.get(name.len()..).unwrap_or_default())
    } else {
        Err(SkdError::syntax(SyntaxError::UnrecognizedDeclaration(
            name.to_string(),
        )))
    }
}

fn parse_doctype(inner: &str) -> Result<Declaration> {
    let tokens: Vec<&str> = inner.split_whitespace().collect();
    let invalid = || SkdError::syntax(SyntaxError::InvalidDeclaration(DOCTYPE.to_string()));
    if tokens.len() != 3 {
        return Err(invalid().with_context(format!("expected 3 tokens, found {}", tokens.len())));
    }

    let mut remaining = tokens
        .into_iter()
        .filter(|token| !token.eq_ignore_ascii_case(DOCTYPE) && !token.eq_ignore_ascii_case(SKD));
    match (remaining.next(), remaining.next()) {
        (Some(stylesheet), None) => Ok(Declaration::Doctype(stylesheet.to_string())),
        _ => Err(invalid().with_context("expected 'skd' and one stylesheet")),
    }
}

fn parse_version(rest: &str) -> Result<Declaration> {
    let mut remaining = tokenize(rest)?.into_iter().filter(|token| {
        token.quoted
            || !(token.text.eq_ignore_ascii_case(VERSION) || token.text.eq_ignore_ascii_case(SKD))
    });
    match (remaining.next(), remaining.next()) {
        (Some(version), None) => Ok(Declaration::Version(version.text)),
        _ => Err(
            SkdError::syntax(SyntaxError::InvalidDeclaration(SKD.to_string()))
                .with_context("expected exactly one version"),
        ),
    }
}

/// Rewrites `<SKD ...>` to `<!SKD ...>`
pub fn modernize_legacy(markup: &str) -> String {
    format!("<!{}", markup.strip_prefix('<').unwrap_or(markup))
}
