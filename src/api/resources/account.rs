//
//  buildkite-cli
//  api/resources/account.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Token, user and service level endpoints.
//!
//! None of these take parameters: they describe the credentials in use or
//! the service itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::common::Result;
use crate::api::request::{ApiRequest, HttpMethod};

/// The API access token making the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessToken {
    pub uuid: String,
    pub description: Option<String>,
    pub scopes: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub user: Option<TokenOwner>,
}

/// The user a token belongs to, as embedded in [`AccessToken`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenOwner {
    pub name: String,
    pub email: String,
}

/// The user owning the token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub graphql_id: Option<String>,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Service metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    /// Source addresses of Buildkite's outgoing webhooks.
    pub webhook_ips: Vec<String>,
}

/// Result of a ping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingResponse {
    pub message: Option<String>,
}

/// `GET /access-token`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetAccessTokenRequest;

impl ApiRequest for GetAccessTokenRequest {
    type Output = AccessToken;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        "/access-token".to_string()
    }
}

/// `GET /user`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetUserRequest;

impl ApiRequest for GetUserRequest {
    type Output = User;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        "/user".to_string()
    }
}

/// `GET /meta`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetMetaRequest;

impl ApiRequest for GetMetaRequest {
    type Output = Meta;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        "/meta".to_string()
    }
}

/// `GET /ping`
///
/// Any 2xx counts as a successful ping. A JSON object body is parsed for its
/// `message`; an empty or non-JSON body yields a response with the raw text
/// (if any) as the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PingRequest;

impl ApiRequest for PingRequest {
    type Output = PingResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        "/ping".to_string()
    }

    fn parse_response(&self, body: &str) -> Result<Self::Output> {
        let text = body.trim();
        if let Ok(response) = serde_json::from_str::<PingResponse>(text) {
            return Ok(response);
        }

        Ok(PingResponse {
            message: (!text.is_empty()).then(|| text.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_accepts_empty_body() {
        assert_eq!(PingRequest.parse_response("").unwrap(), PingResponse::default());
    }

    #[test]
    fn test_ping_parses_json_and_plain_text() {
        let json = PingRequest.parse_response(r#"{"message":"pong"}"#).unwrap();
        assert_eq!(json.message.as_deref(), Some("pong"));

        let text = PingRequest.parse_response("pong\n").unwrap();
        assert_eq!(text.message.as_deref(), Some("pong"));
    }

    #[test]
    fn test_access_token_parses() {
        let token = GetAccessTokenRequest
            .parse_response(r#"{"uuid":"t-1","scopes":["read_builds","write_builds"],"user":{"name":"Ada","email":"ada@example.com"}}"#)
            .unwrap();
        assert_eq!(token.scopes.len(), 2);
        assert_eq!(token.user.unwrap().name, "Ada");
    }

    #[test]
    fn test_meta_parses() {
        let meta = GetMetaRequest
            .parse_response(r#"{"webhook_ips":["192.0.2.0/24"]}"#)
            .unwrap();
        assert_eq!(meta.webhook_ips, vec!["192.0.2.0/24"]);
        assert_eq!(GetMetaRequest.path(), "/meta");
        assert_eq!(GetUserRequest.path(), "/user");
    }
}
