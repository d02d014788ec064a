use std::time::Duration;

use scholar_core::transport::{ChatRole, ChatTransport, ChatTurn, TransportFailure};
use scholar_infrastructure::config::EndpointConfig;
use scholar_interaction::HttpChatTransport;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "LMS-MODEL",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 0, "completion_tokens": 0, "total_tokens": 0}
    })
}

#[tokio::test]
async fn test_posts_history_and_reads_first_choice() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_json(json!({
            "model": "LMS-MODEL",
            "messages": [{"role": "user", "content": "hello"}],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hi! How can I help?")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpChatTransport::new(mock_server.uri());
    let reply = transport
        .send(vec![ChatTurn::new(ChatRole::User, "hello")])
        .await
        .unwrap();

    assert_eq!(reply.content, "Hi! How can I help?");
    assert!(reply.visualizations.is_empty());
}

#[tokio::test]
async fn test_reads_visualizations() {
    let mock_server = MockServer::start().await;
    let mut body = completion("Here is the distribution.");
    body["visualizations"] = json!([{
        "title": "Scores",
        "description": "Histogram",
        "image_base64": "iVBORw0KGgo="
    }]);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let reply = HttpChatTransport::new(mock_server.uri())
        .send(vec![ChatTurn::new(ChatRole::User, "plot scores")])
        .await
        .unwrap();

    assert_eq!(reply.visualizations.len(), 1);
    assert_eq!(reply.visualizations[0].title, "Scores");
    assert_eq!(
        reply.visualizations[0].image.decode().unwrap(),
        vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]
    );
}

#[tokio::test]
async fn test_config_sets_model_and_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(json!({
            "model": "custom-model",
            "messages": [{"role": "user", "content": "q"}],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("a")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = EndpointConfig {
        base_url: mock_server.uri(),
        model: "custom-model".to_string(),
        api_key: Some("test-key".to_string()),
        timeout_secs: 5,
    };
    let reply = HttpChatTransport::from_config(&config)
        .unwrap()
        .send(vec![ChatTurn::new(ChatRole::User, "q")])
        .await
        .unwrap();

    assert_eq!(reply.content, "a");
}

#[tokio::test]
async fn test_server_error_is_status_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "Validation failed"})),
        )
        .mount(&mock_server)
        .await;

    let err = HttpChatTransport::new(mock_server.uri())
        .send(vec![ChatTurn::new(ChatRole::User, "hello")])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransportFailure::Status {
            status: 500,
            message: "Validation failed".to_string()
        }
    );
}

#[tokio::test]
async fn test_unexpected_shape_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "wrong api"})))
        .mount(&mock_server)
        .await;

    let err = HttpChatTransport::new(mock_server.uri())
        .send(vec![ChatTurn::new(ChatRole::User, "hello")])
        .await
        .unwrap_err();

    assert!(matches!(err, TransportFailure::MalformedResponse(_)));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&mock_server)
        .await;

    let err = HttpChatTransport::new(mock_server.uri())
        .send(vec![ChatTurn::new(ChatRole::User, "hello")])
        .await
        .unwrap_err();

    assert!(matches!(err, TransportFailure::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_failure() {
    // Bind and immediately drop a server so the port is closed.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let err = HttpChatTransport::new(uri)
        .send(vec![ChatTurn::new(ChatRole::User, "hello")])
        .await
        .unwrap_err();

    assert!(matches!(err, TransportFailure::Network(_)));
}

#[tokio::test]
async fn test_timeout_is_network_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("too late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let config = EndpointConfig {
        base_url: mock_server.uri(),
        timeout_secs: 1,
        ..EndpointConfig::default()
    };
    let err = HttpChatTransport::from_config(&config)
        .unwrap()
        .send(vec![ChatTurn::new(ChatRole::User, "hello")])
        .await
        .unwrap_err();

    assert!(matches!(err, TransportFailure::Network(_)));
}
