use super::*;

fn parse(json: &str) -> GenerateResponse {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_endpoint_uses_model_and_trims_base() {
    let settings = ChatSettings {
        api_base: "https://example.test/".to_string(),
        model: "gemini-2.5-flash".to_string(),
        ..ChatSettings::default()
    };
    assert_eq!(
        endpoint(&settings),
        "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
    );
}

#[test]
fn test_request_shape() {
    let contents = vec![Content::text(Some("user"), "hi")];
    let request = GenerateRequest {
        system_instruction: Content::text(None, "sys"),
        contents: &contents,
    };
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
    assert!(json["systemInstruction"].get("role").is_none());
    assert_eq!(json["contents"][0]["role"], "user");
    assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
}

#[test]
fn test_reply_text_joins_parts_of_first_candidate() {
    let response = parse(
        r#"{"candidates":[
            {"content":{"role":"model","parts":[{"text":"Hello "},{"text":"there"}]}},
            {"content":{"role":"model","parts":[{"text":"ignored"}]}}
        ]}"#,
    );
    assert_eq!(reply_text(&response).as_deref(), Some("Hello there"));
}

#[test]
fn test_reply_without_text_is_none() {
    assert_eq!(reply_text(&parse(r#"{}"#)), None);
    assert_eq!(reply_text(&parse(r#"{"candidates":[{}]}"#)), None);
    assert_eq!(
        reply_text(&parse(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#)),
        None
    );
}

#[test]
fn test_from_settings_requires_key() {
    let settings = ChatSettings {
        api_key_env: "ZAGENT_TEST_UNSET_KEY".to_string(),
        ..ChatSettings::default()
    };
    assert!(matches!(
        GeminiClient::from_settings(&settings),
        Err(ChatError::MissingApiKey)
    ));
}
