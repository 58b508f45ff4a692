//! Integration tests for `InferenceClient` and the inference-backed scorers.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use instasent_sentiment::{
    InferenceClient, InferenceTextScorer, SentimentError, TextScorer,
};

const TEXT_MODEL: &str = "nlptown/bert-base-multilingual-uncased-sentiment";
const IMAGE_MODEL: &str = "microsoft/resnet-50";

fn client(server: &MockServer, token: Option<&str>) -> InferenceClient {
    InferenceClient::new(&server.uri(), token, 5).expect("failed to build InferenceClient")
}

#[tokio::test]
async fn classify_text_posts_inputs_and_reads_nested_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{TEXT_MODEL}")))
        .and(body_json(json!({ "inputs": "Great product!" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            { "label": "5 stars", "score": 0.62 },
            { "label": "4 stars", "score": 0.30 },
            { "label": "1 star", "score": 0.01 }
        ]])))
        .expect(1)
        .mount(&server)
        .await;

    let prediction = client(&server, None)
        .classify_text(TEXT_MODEL, "Great product!")
        .await
        .unwrap();

    assert_eq!(prediction.label, "5 stars");
    assert!((prediction.score - 0.62).abs() < 1e-9);
}

#[tokio::test]
async fn classify_image_sends_bytes_with_mime_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{IMAGE_MODEL}")))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "label": "tabby, tabby cat", "score": 0.41 },
            { "label": "Egyptian cat", "score": 0.22 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let prediction = client(&server, None)
        .classify_image(IMAGE_MODEL, &[0x89, b'P', b'N', b'G'], "image/png")
        .await
        .unwrap();

    assert_eq!(prediction.label, "tabby, tabby cat");
}

#[tokio::test]
async fn bearer_token_is_attached_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer hf_secret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "label": "ok", "score": 0.5 }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server, Some("hf_secret"))
        .classify_text(TEXT_MODEL, "hello")
        .await;

    assert!(result.is_ok(), "got: {result:?}");
}

#[tokio::test]
async fn model_loading_status_is_an_inference_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": "Model is currently loading",
            "estimated_time": 20.0
        })))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .classify_text(TEXT_MODEL, "hello")
        .await
        .unwrap_err();

    match err {
        SentimentError::Inference(msg) => {
            assert!(msg.contains("503"), "status missing from: {msg}");
            assert!(msg.contains("loading"), "body excerpt missing from: {msg}");
        }
        other => panic!("expected Inference error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_label_list_is_an_inference_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = client(&server, None).classify_text(TEXT_MODEL, "x").await;

    assert!(matches!(result, Err(SentimentError::Inference(_))));
}

#[tokio::test]
async fn text_scorer_delegates_to_configured_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/custom/model"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([[{ "label": "POSITIVE", "score": 0.99 }]])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let scorer = InferenceTextScorer::new(Arc::new(client(&server, None)), "custom/model");
    let prediction = scorer.score_text("lovely").await.unwrap();

    assert_eq!(prediction.label, "POSITIVE");
}
