use crate::error::{Result, SkdError, SyntaxError};

/// One word of a property list; `quoted` keeps `""` distinct from nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub quoted: bool,
}

/// Splits a property list on spaces and `=` outside of double quotes
///
/// Quotes are stripped. Runs of separators produce no empty tokens, while a
/// quoted empty string yields an empty token.
pub fn tokenize(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut quoted = false;
    let mut in_quotes = false;

    for c in line.chars() {
        if in_quotes {
            if c == '"' {
                in_quotes = false;
            } else {
                word.push(c);
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                quoted = true;
            }
            ' ' | '=' => flush(&mut tokens, &mut word, &mut quoted),
            _ => word.push(c),
        }
    }

    if in_quotes {
        return Err(SkdError::syntax(SyntaxError::InvalidProperties(
            line.to_string(),
        ))
        .with_context("unterminated quote"));
    }
    flush(&mut tokens, &mut word, &mut quoted);
    Ok(tokens)
}

fn flush(tokens: &mut Vec<Token>, word: &mut String, quoted: &mut bool) {
    if !word.is_empty() || *quoted {
        tokens.push(Token {
            text: std::mem::take(word),
            quoted: *quoted,
        });
    }
    *quoted = false;
}

/// Parses `key="value" ...` into ordered pairs
pub fn parse_properties(line: &str) -> Result<Vec<(String, String)>> {
    let tokens = tokenize(line)?;
    if tokens.len() % 2 == 1 {
        return Err(SkdError::syntax(SyntaxError::InvalidProperties(
            line.to_string(),
        )));
    }

    let mut pairs = Vec::with_capacity(tokens.len() / 2);
    let mut iter = tokens.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        if key.text.is_empty() {
            return Err(SkdError::syntax(SyntaxError::EmptyPropertyKey));
        }
        // keys are written unquoted, so they cannot hold a separator
        if key.text.contains([' ', '=', '"']) {
            return Err(SkdError::syntax(SyntaxError::InvalidProperties(
                line.to_string(),
            ))
            .with_context(format!("property key '{}' contains a separator", key.text)));
        }
        pairs.push((key.text, value.text));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkdErrorKind;

    fn texts(line: &str) -> Result<Vec<String>> {
        Ok(tokenize(line)?.into_iter().map(|t| t.text).collect())
    }

    #[test]
    fn test_tokenize_quotes_and_separators() -> Result<()> {
        assert_eq!(texts(r#"a="b c" d=e"#)?, vec!["a", "b c", "d", "e"]);
        assert_eq!(texts(r#"a="x=y""#)?, vec!["a", "x=y"]);
        assert_eq!(texts("a  =  b")?, vec!["a", "b"]);
        assert!(texts("")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_quoted_value_is_kept() -> Result<()> {
        let pairs = parse_properties(r#"a="" b="1""#)?;
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), String::new()),
                ("b".to_string(), "1".to_string())
            ]
        );
        Ok(())
    }

    #[test]
    fn test_odd_token_count_is_rejected() {
        let err = parse_properties(r#"a="1" b"#).unwrap_err();
        assert!(matches!(
            err.kind(),
            SkdErrorKind::Syntax(SyntaxError::InvalidProperties(_))
        ));
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let err = parse_properties(r#""" ="1""#).unwrap_err();
        assert!(matches!(
            err.kind(),
            SkdErrorKind::Syntax(SyntaxError::EmptyPropertyKey)
        ));
    }

    #[test]
    fn test_quoted_key_with_separator_is_rejected() {
        for line in [r#""a b"="1""#, r#""a=b"="1""#, r#"x="1" "k v"="2""#] {
            let err = parse_properties(line).unwrap_err();
            assert!(matches!(
                err.kind(),
                SkdErrorKind::Syntax(SyntaxError::InvalidProperties(_))
            ));
        }
    }

    #[test]
    fn test_quoted_plain_key_is_accepted() -> Result<()> {
        assert_eq!(
            parse_properties(r#""ab"="a b""#)?,
            vec![("ab".to_string(), "a b".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_unterminated_quote_is_rejected() {
        assert!(tokenize(r#"a="open"#).is_err());
    }
}
