//! Carrying `Set-Cookie` values across redirect hops.
//!
//! Only the `name=value` pair of each `Set-Cookie` header is used. Attributes
//! (path, domain, expiry) are ignored; scoping cookies to hosts is left to
//! the caller.

use crate::{Request, Response};
use http::HeaderValue;
use http::header::{COOKIE, SET_COOKIE};

/// Extract the `name=value` pairs from a response's `Set-Cookie` headers.
pub fn set_cookie_pairs(response: &Response) -> Vec<(String, String)> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| {
            let pair = raw.split(';').next()?;
            parse_pair(pair)
        })
        .collect()
}

/// Parse a `Cookie` request header into ordered pairs.
pub fn parse_cookie_header(value: &str) -> Vec<(String, String)> {
    value.split(';').filter_map(parse_pair).collect()
}

fn parse_pair(pair: &str) -> Option<(String, String)> {
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// Merge the response's cookies into the request's `Cookie` header.
///
/// Cookies already on the request keep their position; a cookie with the
/// same name is overwritten by the newer value.
pub(crate) fn carry(request: Request, response: &Response) -> Request {
    let incoming = set_cookie_pairs(response);
    if incoming.is_empty() {
        return request;
    }

    let mut cookies: Vec<(String, String)> = request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(parse_cookie_header)
        .collect();

    for (name, value) in incoming {
        match cookies.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => cookies.push((name, value)),
        }
    }

    let header = cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ");

    match HeaderValue::from_str(&header) {
        Ok(value) => request.with_header(COOKIE, value),
        Err(e) => {
            tracing::warn!(error = %e, "Dropping cookies that do not form a valid header");
            request
        }
    }
}
