//! HTTP gateway platform
//!
//! Forwards every outbound effect as a JSON request to a platform gateway that
//! owns the actual bot session (embeds, buttons, permission overwrites).

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;

use super::{ChatPlatform, Principal};
use crate::{
    error::PlatformError,
    state::{ChannelId, PanelState},
};

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct PermissionBody<'a> {
    principal: &'a Principal,
    send_messages: bool,
    view_channel: bool,
}

#[derive(Debug, Serialize)]
struct PanelBody<'a> {
    text: String,
    panel: &'a PanelState,
}

/// Platform backed by a gateway reachable over HTTP
#[derive(Debug, Clone)]
pub struct GatewayPlatform {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl GatewayPlatform {
    /// Every request is abandoned after `timeout` so a stalled gateway cannot
    /// hold up the reminder tick or a handler
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PlatformError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, channel: &ChannelId, path: &str) -> String {
        format!("{}/channels/{}/{}", self.base_url, channel, path)
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        url: String,
        body: &T,
        channel: &ChannelId,
    ) -> Result<(), PlatformError> {
        debug!(%url, "Forwarding request to gateway");
        let mut request = self.http.request(method, &url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PlatformError::UnknownChannel(channel.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

impl ChatPlatform for GatewayPlatform {
    fn send_message<'a>(
        &'a self,
        channel: &'a ChannelId,
        content: &'a str,
    ) -> BoxFuture<'a, Result<(), PlatformError>> {
        async move {
            self.send_json(
                reqwest::Method::POST,
                self.url(channel, "messages"),
                &MessageBody { content },
                channel,
            )
            .await
        }
        .boxed()
    }

    fn set_send_permission<'a>(
        &'a self,
        channel: &'a ChannelId,
        principal: &'a Principal,
        can_send: bool,
    ) -> BoxFuture<'a, Result<(), PlatformError>> {
        async move {
            self.send_json(
                reqwest::Method::PUT,
                self.url(channel, "permissions"),
                &PermissionBody {
                    principal,
                    send_messages: can_send,
                    view_channel: true,
                },
                channel,
            )
            .await
        }
        .boxed()
    }

    fn render_panel<'a>(
        &'a self,
        channel: &'a ChannelId,
        panel: &'a PanelState,
    ) -> BoxFuture<'a, Result<(), PlatformError>> {
        async move {
            self.send_json(
                reqwest::Method::PUT,
                self.url(channel, "panel"),
                &PanelBody {
                    text: panel.to_text(),
                    panel,
                },
                channel,
            )
            .await
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;
    use crate::state::UserId;

    fn platform(base_url: &str, token: Option<&str>) -> GatewayPlatform {
        GatewayPlatform::new(base_url, token.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let platform = platform("http://gateway.local/", None);
        assert_eq!(
            platform.url(&ChannelId::new("123"), "messages"),
            "http://gateway.local/channels/123/messages"
        );
    }

    #[test]
    fn test_permission_body_shape() {
        let principal = Principal::User(UserId::new("7"));
        let body = PermissionBody {
            principal: &principal,
            send_messages: false,
            view_channel: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["principal"]["type"], "user");
        assert_eq!(json["principal"]["id"], "7");
        assert_eq!(json["send_messages"], false);
    }

    #[tokio::test]
    async fn test_send_message_posts_content_with_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/channels/C/messages")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::Json(json!({ "content": "hello" })))
            .with_status(200)
            .create_async()
            .await;

        let result = platform(&server.url(), Some("secret"))
            .send_message(&ChannelId::new("C"), "hello")
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_message_without_token_has_no_auth_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/channels/C/messages")
            .match_header("authorization", Matcher::Missing)
            .with_status(204)
            .create_async()
            .await;

        let result = platform(&server.url(), None)
            .send_message(&ChannelId::new("C"), "hello")
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_message_unknown_channel() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/channels/gone/messages")
            .with_status(404)
            .create_async()
            .await;

        let result = platform(&server.url(), None)
            .send_message(&ChannelId::new("gone"), "hello")
            .await;

        assert!(matches!(result, Err(PlatformError::UnknownChannel(id)) if id == "gone"));
    }

    #[tokio::test]
    async fn test_send_message_server_error_keeps_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/channels/C/messages")
            .with_status(500)
            .with_body("gateway down")
            .create_async()
            .await;

        let result = platform(&server.url(), None)
            .send_message(&ChannelId::new("C"), "hello")
            .await;

        match result {
            Err(PlatformError::Api { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "gateway down");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_set_send_permission_puts_overwrite() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/channels/panel/permissions")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::Json(json!({
                "principal": { "type": "everyone" },
                "send_messages": false,
                "view_channel": true
            })))
            .with_status(200)
            .create_async()
            .await;

        let result = platform(&server.url(), Some("secret"))
            .set_send_permission(&ChannelId::new("panel"), &Principal::Everyone, false)
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_send_permission_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("PUT", "/channels/gone/permissions")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("PUT", "/channels/locked/permissions")
            .with_status(403)
            .with_body("missing access")
            .create_async()
            .await;
        let platform = platform(&server.url(), None);
        let principal = Principal::User(UserId::new("7"));

        let gone = platform
            .set_send_permission(&ChannelId::new("gone"), &principal, false)
            .await;
        let locked = platform
            .set_send_permission(&ChannelId::new("locked"), &principal, false)
            .await;

        assert!(matches!(gone, Err(PlatformError::UnknownChannel(_))));
        assert!(matches!(locked, Err(PlatformError::Api { status: 403, .. })));
    }

    #[tokio::test]
    async fn test_render_panel_sends_text_and_state() {
        let mut server = Server::new_async().await;
        let panel = PanelState::derive(&[], Utc::now());
        let mock = server
            .mock("PUT", "/channels/panel/panel")
            .match_body(Matcher::PartialJson(json!({
                "text": panel.to_text(),
                "panel": { "buttons_enabled": false, "entries": [] }
            })))
            .with_status(200)
            .create_async()
            .await;

        let result = platform(&server.url(), None)
            .render_panel(&ChannelId::new("panel"), &panel)
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_render_panel_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("PUT", "/channels/gone/panel")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("PUT", "/channels/panel/panel")
            .with_status(502)
            .with_body("upstream")
            .create_async()
            .await;
        let platform = platform(&server.url(), None);
        let panel = PanelState::derive(&[], Utc::now());

        let gone = platform.render_panel(&ChannelId::new("gone"), &panel).await;
        let failed = platform.render_panel(&ChannelId::new("panel"), &panel).await;

        assert!(matches!(gone, Err(PlatformError::UnknownChannel(_))));
        assert!(matches!(failed, Err(PlatformError::Api { status: 502, .. })));
    }

    #[tokio::test]
    async fn test_stalled_gateway_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            // accept and hold the connection without ever answering
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let platform = GatewayPlatform::new(
            format!("http://{}", address),
            None,
            Duration::from_millis(200),
        )
        .unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            platform.send_message(&ChannelId::new("C"), "hello"),
        )
        .await
        .expect("request should give up on its own");

        assert!(matches!(result, Err(PlatformError::Request(_))));
        server.abort();
    }
}
