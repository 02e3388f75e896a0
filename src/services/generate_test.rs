use super::*;
use std::time::Duration;

use crate::state::test_helpers::{self, MockImageGen, MockReply};

fn request(item_name: &str, projections: Vec<Projection>) -> GenerateRequest {
    GenerateRequest { item_name: item_name.into(), projections, width_mm: None, height_mm: None, additional: None }
}

fn spec(item_name: &str, projections: Vec<Projection>) -> BlueprintSpec {
    validate(request(item_name, projections)).unwrap()
}

// =========================================================================
// Projection
// =========================================================================

#[test]
fn projection_serde_ids() {
    assert_eq!(serde_json::to_value(Projection::Isometric).unwrap(), "isometric");
    let parsed: Vec<Projection> = serde_json::from_str(r#"["top","back"]"#).unwrap();
    assert_eq!(parsed, vec![Projection::Top, Projection::Back]);
}

#[test]
fn projection_labels_and_views() {
    assert_eq!(Projection::Top.label(), "Вид сверху");
    assert_eq!(Projection::Top.view(), "top-down orthographic view");
    assert_eq!(Projection::Isometric.view(), "isometric view");
}

#[test]
fn request_defaults_to_top_projection() {
    let req: GenerateRequest = serde_json::from_str(r#"{"item_name":"wallet"}"#).unwrap();
    assert_eq!(req.projections, vec![Projection::Top]);
    assert!(req.width_mm.is_none());
}

#[test]
fn request_without_item_name_fails_validation_not_decoding() {
    let req: GenerateRequest = serde_json::from_str(r#"{"projections":["top"]}"#).unwrap();
    assert_eq!(validate(req).unwrap_err().to_string(), "item name is required");
}

#[test]
fn request_keeps_explicit_empty_projections() {
    let req: GenerateRequest = serde_json::from_str(r#"{"item_name":"wallet","projections":[]}"#).unwrap();
    assert!(req.projections.is_empty());
}

// =========================================================================
// validate
// =========================================================================

#[test]
fn validate_rejects_empty_name() {
    let err = validate(request("   ", vec![Projection::Top])).unwrap_err();
    assert!(matches!(err, GenerateError::Validation(ref m) if m.contains("required")));
}

#[test]
fn validate_rejects_single_char_name() {
    let err = validate(request("ж", vec![Projection::Top])).unwrap_err();
    assert!(err.to_string().contains("at least 2"));
}

#[test]
fn validate_counts_chars_not_bytes() {
    // Two Cyrillic letters are four bytes but only two characters.
    assert!(validate(request("ус", vec![Projection::Top])).is_ok());
}

#[test]
fn validate_rejects_zero_projections() {
    let err = validate(request("wallet", vec![])).unwrap_err();
    assert_eq!(err.to_string(), "select at least one projection");
}

#[test]
fn validate_dedupes_projections_keeping_first_order() {
    let spec = spec("wallet", vec![Projection::Side, Projection::Top, Projection::Side]);
    assert_eq!(spec.projections, vec![Projection::Side, Projection::Top]);
}

#[test]
fn validate_trims_name_and_drops_blank_additional() {
    let mut req = request("  bag  ", vec![Projection::Top]);
    req.additional = Some("   ".into());
    let spec = validate(req).unwrap();
    assert_eq!(spec.item_name, "bag");
    assert!(spec.additional.is_none());
}

#[test]
fn validate_rejects_zero_dimension() {
    let mut req = request("bag", vec![Projection::Top]);
    req.width_mm = Some(0);
    assert!(validate(req).is_err());
}

// =========================================================================
// build_prompt
// =========================================================================

#[test]
fn prompt_substitutes_item_and_view() {
    let prompt = build_prompt(&spec("wallet", vec![Projection::Front]), Projection::Front);
    assert!(prompt.starts_with("Technical drawing, blueprint style, of a wallet in front orthographic view."));
    assert!(prompt.contains("stitching lines"));
    assert!(!prompt.contains("Overall dimensions"));
    assert!(!prompt.contains("Additional details"));
}

#[test]
fn prompt_is_deterministic() {
    let s = spec("wallet", vec![Projection::Top]);
    assert_eq!(build_prompt(&s, Projection::Top), build_prompt(&s, Projection::Top));
}

#[test]
fn prompt_includes_dimensions_and_additional() {
    let mut req = request("card holder", vec![Projection::Top]);
    req.width_mm = Some(110);
    req.height_mm = Some(75);
    req.additional = Some("two card slots".into());
    let prompt = build_prompt(&validate(req).unwrap(), Projection::Top);
    assert!(prompt.contains("Overall dimensions: 110 mm wide by 75 mm high."));
    assert!(prompt.ends_with("Additional details: two card slots."));
}

#[test]
fn prompt_with_single_dimension() {
    let mut req = request("belt", vec![Projection::Top]);
    req.width_mm = Some(1200);
    let prompt = build_prompt(&validate(req).unwrap(), Projection::Top);
    assert!(prompt.contains("Overall dimensions: 1200 mm wide."));
}

// =========================================================================
// failure_message / BatchOutcome
// =========================================================================

#[test]
fn failure_message_includes_status_code() {
    let err = ImageGenError::ApiResponse { status: 500, body: "internal\n".into() };
    assert_eq!(failure_message(Projection::Top, &err), "projection Вид сверху failed: 500 - internal");
}

#[test]
fn failure_message_for_empty_result() {
    let msg = failure_message(Projection::Back, &ImageGenError::EmptyResult);
    assert_eq!(msg, "projection Вид сзади returned an empty result");
}

#[test]
fn error_message_joins_lines() {
    let outcome = BatchOutcome {
        images: vec![],
        failures: vec![
            VariantFailure { projection: Projection::Top, label: "a".into(), message: "one".into() },
            VariantFailure { projection: Projection::Side, label: "b".into(), message: "two".into() },
        ],
    };
    assert_eq!(outcome.error_message().as_deref(), Some("one\ntwo"));
    assert!(BatchOutcome::default().error_message().is_none());
}

// =========================================================================
// run_batch
// =========================================================================

#[tokio::test]
async fn batch_all_success() {
    let mock = Arc::new(MockImageGen::always_ok());
    let outcome = run_batch(mock.clone(), &spec("wallet", Projection::ALL.to_vec()), Uuid::nil()).await;
    assert_eq!(outcome.images.len(), 5);
    assert!(outcome.failures.is_empty());
    assert_eq!(mock.call_count(), 5);
    let labels: Vec<&str> = outcome.images.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, Projection::ALL.iter().map(|p| p.label()).collect::<Vec<_>>());
    assert!(outcome.images[0].url.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn batch_partial_failure_keeps_both() {
    let mock = Arc::new(MockImageGen::new(vec![("front orthographic", MockReply::Status(500, "boom"))]));
    let outcome =
        run_batch(mock.clone(), &spec("wallet", vec![Projection::Top, Projection::Front]), Uuid::nil()).await;
    assert_eq!(outcome.images.len(), 1);
    assert_eq!(outcome.images[0].projection, Projection::Top);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].label, "Вид спереди");
    assert!(outcome.failures[0].message.contains("500"));
}

#[tokio::test]
async fn batch_counts_always_add_up() {
    let mock = Arc::new(MockImageGen::new(vec![
        ("top-down", MockReply::Status(429, "slow down")),
        ("side orthographic", MockReply::Empty),
        ("isometric", MockReply::Panic),
    ]));
    let s = spec("backpack", Projection::ALL.to_vec());
    let outcome = run_batch(mock, &s, Uuid::nil()).await;
    assert_eq!(outcome.images.len() + outcome.failures.len(), s.projections.len());
    assert_eq!(outcome.images.len(), 2);
    assert_eq!(outcome.failures.len(), 3);
}

#[tokio::test]
async fn batch_image_becomes_data_url() {
    let mock = Arc::new(MockImageGen::new(vec![("back orthographic", MockReply::Image("QkFDSw=="))]));
    let outcome = run_batch(mock, &spec("bag", vec![Projection::Back]), Uuid::nil()).await;
    assert_eq!(outcome.images[0].url, "data:image/png;base64,QkFDSw==");
    assert_eq!(outcome.images[0].label, "Вид сзади");
}

#[tokio::test]
async fn batch_panicking_variant_becomes_generic_failure() {
    let mock = Arc::new(MockImageGen::new(vec![("isometric", MockReply::Panic)]));
    let outcome = run_batch(mock, &spec("bag", vec![Projection::Isometric]), Uuid::nil()).await;
    assert!(outcome.images.is_empty());
    assert_eq!(outcome.failures[0].message, "unexpected error while generating projection аксонометрия");
}

// =========================================================================
// submit
// =========================================================================

#[tokio::test]
async fn submit_http_500_yields_one_error_and_no_images() {
    let mock = Arc::new(MockImageGen::new(vec![("кошелёк", MockReply::Status(500, "server error"))]));
    let state = test_helpers::test_app_state_with_imagegen(mock.clone());

    let view = submit(&state, request("кошелёк", vec![Projection::Top])).await.unwrap();
    assert_eq!(mock.call_count(), 1);
    assert!(!view.busy);
    assert!(view.images.is_empty());
    let error = view.error.unwrap();
    assert_eq!(error.lines().count(), 1);
    assert!(error.contains("500"));
}

#[tokio::test]
async fn submit_empty_name_never_calls_api() {
    let mock = Arc::new(MockImageGen::always_ok());
    let state = test_helpers::test_app_state_with_imagegen(mock.clone());

    let err = submit(&state, request("", vec![Projection::Top])).await.unwrap_err();
    assert!(matches!(err, GenerateError::Validation(_)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn submit_zero_projections_surfaces_message_without_calls() {
    let mock = Arc::new(MockImageGen::always_ok());
    let state = test_helpers::test_app_state_with_imagegen(mock.clone());

    let err = submit(&state, request("wallet", vec![])).await.unwrap_err();
    assert_eq!(err.to_string(), "select at least one projection");
    assert_eq!(mock.call_count(), 0);
    let view = state.generator.read().await.clone();
    assert_eq!(view.error.as_deref(), Some("select at least one projection"));
    assert!(!view.busy);
}

#[tokio::test]
async fn submit_without_client_is_not_configured() {
    let state = test_helpers::test_app_state();
    let err = submit(&state, request("wallet", vec![Projection::Top])).await.unwrap_err();
    assert!(matches!(err, GenerateError::NotConfigured));
    assert!(!state.generator.read().await.busy);
}

#[tokio::test]
async fn submit_while_busy_is_rejected() {
    let mock = Arc::new(MockImageGen::always_ok());
    let state = test_helpers::test_app_state_with_imagegen(mock.clone());
    state.generator.write().await.begin();

    let err = submit(&state, request("wallet", vec![Projection::Top])).await.unwrap_err();
    assert!(matches!(err, GenerateError::Busy));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn submit_replaces_previous_results() {
    let mock = Arc::new(MockImageGen::new(vec![("front orthographic", MockReply::Status(502, "bad gateway"))]));
    let state = test_helpers::test_app_state_with_imagegen(mock);

    let first = submit(&state, request("wallet", vec![Projection::Top, Projection::Side])).await.unwrap();
    assert_eq!(first.images.len(), 2);
    assert!(first.error.is_none());

    let second = submit(&state, request("wallet", vec![Projection::Front, Projection::Back])).await.unwrap();
    assert_eq!(second.images.len(), 1);
    assert_eq!(second.images[0].projection, Projection::Back);
    assert!(second.error.as_deref().unwrap().contains("502"));
    assert_eq!(*state.generator.read().await, second);
}

#[tokio::test]
async fn submit_sends_one_prompt_per_projection() {
    let mock = Arc::new(MockImageGen::always_ok());
    let state = test_helpers::test_app_state_with_imagegen(mock.clone());

    submit(&state, request("bag", vec![Projection::Top, Projection::Back])).await.unwrap();
    let prompts = mock.prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 2);
    assert!(prompts.iter().any(|p| p.contains("top-down orthographic view")));
    assert!(prompts.iter().any(|p| p.contains("back orthographic view")));
}

#[tokio::test]
async fn second_submit_during_running_batch_is_busy() {
    let mock = Arc::new(MockImageGen::new(vec![("wallet", MockReply::Slow(Duration::from_millis(200)))]));
    let state = test_helpers::test_app_state_with_imagegen(mock.clone());

    let first = tokio::spawn({
        let state = state.clone();
        async move { submit(&state, request("wallet", vec![Projection::Top])).await }
    });
    while !state.generator.read().await.busy {
        tokio::task::yield_now().await;
    }

    let err = submit(&state, request("wallet", vec![Projection::Front])).await.unwrap_err();
    assert!(matches!(err, GenerateError::Busy));

    let view = first.await.unwrap().unwrap();
    assert!(!view.busy);
    assert_eq!(view.images.len(), 1);
    assert_eq!(view.images[0].projection, Projection::Top);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn malformed_body_keeps_running_batch_view() {
    let state = test_helpers::test_app_state();
    state.generator.write().await.begin();

    let err = reject_malformed(&state, "expected value").await;
    assert_eq!(err.to_string(), "invalid request body: expected value");
    let view = state.generator.read().await.clone();
    assert!(view.busy);
    assert!(view.error.is_none());
}
