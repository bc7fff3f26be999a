use lenstext_config::load_and_prepare;
use lenstext_core::{ImagePayload, RecognitionFailureKind, Recognizer};
use lenstext_understanding::GeminiRecognizer;

#[tokio::test]
async fn unset_key_reference_loads_and_fails_at_call_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "recognition:\n  apiKey: ${LENSTEXT_TEST_UNSET_GEMINI_KEY}\n",
    )
    .unwrap();

    let (config, report) = load_and_prepare(&path).await.unwrap();
    assert!(report.warnings.iter().any(|w| w.path == "recognition.apiKey"));

    let recognizer =
        GeminiRecognizer::from_config(&config.recognition).with_base_url("http://127.0.0.1:9");
    let payload = ImagePayload::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg").unwrap();
    let failure = recognizer.recognize_text(&payload).await.unwrap_err();
    assert_eq!(failure.kind, RecognitionFailureKind::RecognitionUnavailable);
}
