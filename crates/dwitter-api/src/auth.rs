use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use dwitter_dispatch::DispatchError;
use dwitter_types::Caller;

use crate::{error::ApiError, state::AppState};

/// Authorization scheme keyword, as in `Authorization: Token <key>`
pub const TOKEN_KEYWORD: &str = "Token";

/// Identity of the request's sender.
///
/// A missing header, or one using another scheme, yields an anonymous
/// caller. A malformed `Token` header or an unknown key is rejected.
#[derive(Debug, Clone)]
pub struct CurrentCaller(pub Caller);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(CurrentCaller(Caller::Anonymous));
        };

        let header = header.to_str().map_err(|_| {
            ApiError::Unauthorized(
                "Invalid token header. Token string should not contain invalid characters."
                    .to_string(),
            )
        })?;

        let key = match parse_token_header(header) {
            TokenHeader::OtherScheme => return Ok(CurrentCaller(Caller::Anonymous)),
            TokenHeader::Malformed(reason) => return Err(ApiError::Unauthorized(reason.to_string())),
            TokenHeader::Key(key) => key,
        };

        match state.services.sessions().resolve(key).await {
            Ok(caller) => Ok(CurrentCaller(caller)),
            Err(DispatchError::InvalidCredentials) => {
                Err(ApiError::Unauthorized("Invalid token.".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum TokenHeader<'a> {
    OtherScheme,
    Malformed(&'static str),
    Key(&'a str),
}

fn parse_token_header(header: &str) -> TokenHeader<'_> {
    let mut words = header.split_whitespace();
    let Some(keyword) = words.next() else {
        return TokenHeader::OtherScheme;
    };
    if !keyword.eq_ignore_ascii_case(TOKEN_KEYWORD) {
        return TokenHeader::OtherScheme;
    }

    match (words.next(), words.next()) {
        (None, _) => TokenHeader::Malformed("Invalid token header. No credentials provided."),
        (Some(_), Some(_)) => {
            TokenHeader::Malformed("Invalid token header. Token string should not contain spaces.")
        }
        (Some(key), None) => TokenHeader::Key(key),
    }
}
