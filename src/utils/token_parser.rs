use crate::error::TokenError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

/// Builds request headers from whatever the user pasted into the token field:
/// a bare token, `Bearer <token>`, an `Authorization:` header line, or a whole
/// curl command copied from the browser's network tab.
pub fn parse(input: &str) -> Result<HeaderMap, TokenError> {
    let mut headers = HeaderMap::new();
    let input = input.trim();
    if input.is_empty() {
        return Ok(headers);
    }

    let token = if input.starts_with("curl ") || input.contains('\n') {
        find_authorization(input).ok_or(TokenError::Missing)?
    } else {
        strip_prefixes(input)
    };
    if token.is_empty() {
        return Err(TokenError::Missing);
    }

    let value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| TokenError::InvalidCharacters)?;
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Takes the value of the first `authorization:` header in a pasted command,
/// up to the closing quote or the end of the line.
fn find_authorization(text: &str) -> Option<String> {
    let start = text.to_ascii_lowercase().find("authorization:")?;
    let header = &text[start..];
    let end = header
        .find(|c: char| matches!(c, '\'' | '"' | '\\' | '\n'))
        .unwrap_or(header.len());
    Some(strip_prefixes(&header[..end]))
}

fn strip_prefixes(value: &str) -> String {
    let mut value = value.trim();
    if let Some(rest) = strip_prefix_ignore_case(value, "authorization:") {
        value = rest.trim();
    }
    if let Some(rest) = strip_prefix_ignore_case(value, "bearer ") {
        value = rest.trim();
    }
    value.to_string()
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    value
        .get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .and_then(|_| value.get(prefix.len()..))
}
