//! End-to-end review flow against a mocked generation backend.

use std::sync::Arc;

use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

use casedeck::{
    BackendConfig, GenerateRequest, HttpBackend, ReviewController, RunDraft, RunStatus, SaveStatus,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();
}

fn controller_for(server: &MockServer) -> ReviewController {
    let config = BackendConfig {
        base_url: server.base_url(),
        request_timeout_secs: 5,
    };
    ReviewController::new(Arc::new(HttpBackend::new(&config)))
}

fn intake_request() -> GenerateRequest {
    GenerateRequest {
        screenshot: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a],
        screenshot_filename: "checkout.png".to_string(),
        description: "Checkout page of the web shop".to_string(),
        release_version: "v2.3.0".to_string(),
        tester_name: "Ana".to_string(),
        run_dates: "05/01,05/08".to_string(),
        expected_count: 2,
        ..GenerateRequest::default()
    }
}

fn generation_envelope() -> serde_json::Value {
    let run = |label: &str| {
        json!({
            "test_date": label,
            "actual_result": "",
            "status": "Not Started",
            "bug_id": "",
            "commit_id": ""
        })
    };
    json!({
        "success": true,
        "session_id": "20240511093000",
        "count": 2,
        "test_cases": [
            {
                "ts_id": "TS001",
                "tc_id": "TC001",
                "scenario": "Pay with a valid card",
                "steps": "1. Add an item\n2. Pay with a valid card",
                "expected_result": "Order confirmation is shown",
                "runs": [run("05/01"), run("05/08")]
            },
            {
                "ts_id": "TS001",
                "tc_id": "TC002",
                "scenario": "Pay with an expired card",
                "steps": "1. Add an item\n2. Pay with an expired card",
                "expected_result": "A validation message is shown",
                "runs": [run("05/01"), run("05/08")]
            }
        ],
        "used_model": "gemini-2.0-flash",
        "used_fallback_model": false
    })
}

#[tokio::test]
async fn test_generate_review_save_skip_export_flow() {
    init_tracing();
    let server = MockServer::start_async().await;

    let generate_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/generate-tests")
                .body_includes("name=\"screenshot\"; filename=\"checkout.png\"")
                .body_includes("Checkout page of the web shop");
            then.status(200).json_body(generation_envelope());
        })
        .await;
    let results_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/log-results");
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;

    let mut controller = controller_for(&server);

    // Generation loads a session positioned at the first card.
    let summary = controller.generate(&intake_request()).await.unwrap();
    assert_eq!(summary.session_id, "20240511093000");
    assert_eq!(summary.test_case_count, 2);
    assert!(!summary.used_fallback_model);

    {
        let card = controller.current_card().unwrap();
        assert_eq!(card.index, 0);
        assert_eq!(card.total, 2);
        assert_eq!(card.test_case.tc_id, "TC001");
        assert_eq!(card.run_dates, ["05/01", "05/08"]);
        assert_eq!(card.run.status, RunStatus::NotStarted);
    }

    // Record a failure for the second run of the first test case.
    assert!(controller.select_run(1));
    let draft = RunDraft {
        actual_result: "Payment hangs on submit".to_string(),
        status: RunStatus::Fail,
        bug_id: "BUG-101".to_string(),
        commit_id: "4f9c2d1".to_string(),
    };
    let status = controller.save(&draft).await.unwrap();
    assert_eq!(status, SaveStatus::Saved);
    assert_eq!(controller.save_status(), Some(SaveStatus::Saved));
    assert_eq!(controller.current_index(), 0);

    {
        let card = controller.current_card().unwrap();
        assert_eq!(card.run.actual_result, "Payment hangs on submit");
        assert_eq!(card.run.test_date, "05/08");
    }

    // Skip the second test case; it is the last one, so the position stays.
    assert!(controller.next());
    controller.skip(&RunDraft::default()).await.unwrap();
    assert_eq!(controller.current_index(), 1);

    let skipped = controller.session().unwrap().run(1, 1).unwrap();
    assert_eq!(skipped.status, RunStatus::Na);
    assert_eq!(skipped.actual_result, "Skipped");

    // Export is a URL the embedder opens; nothing is fetched here.
    let export = controller.export_url().unwrap();
    assert_eq!(
        export,
        format!("{}/export-excel/20240511093000", server.base_url())
    );

    generate_mock.assert_async().await;
    assert_eq!(results_mock.hits_async().await, 2);
}

#[tokio::test]
async fn test_generation_failure_is_surfaced_and_nothing_loads() {
    init_tracing();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/generate-tests");
            then.status(500).json_body(json!({
                "success": false,
                "error": "Model overloaded",
                "session_id": null
            }));
        })
        .await;

    let mut controller = controller_for(&server);
    let err = controller.generate(&intake_request()).await.unwrap_err();

    assert!(err.to_string().contains("Model overloaded"), "{}", err);
    assert!(controller.current_card().is_none());
    assert!(controller.export_url().is_err());
}

#[tokio::test]
async fn test_reviewing_continues_when_saves_fail() {
    init_tracing();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/generate-tests");
            then.status(200).json_body(generation_envelope());
        })
        .await;
    // No /log-results mock: every save gets the mock server's no-match
    // response and comes back as a failed save.

    let mut controller = controller_for(&server);
    controller.generate(&intake_request()).await.unwrap();

    let draft = RunDraft {
        actual_result: "Looks broken".to_string(),
        status: RunStatus::Blocked,
        ..RunDraft::default()
    };
    let status = controller.save(&draft).await.unwrap();
    assert_eq!(status, SaveStatus::Failed);
    assert_eq!(controller.save_status(), Some(SaveStatus::Failed));

    // The optimistic write stands and navigation still works.
    let card = controller.current_card().unwrap();
    assert_eq!(card.run.status, RunStatus::Blocked);
    assert_eq!(card.run.actual_result, "Looks broken");
    assert!(controller.next());
    assert_eq!(controller.current_card().unwrap().test_case.tc_id, "TC002");
}
