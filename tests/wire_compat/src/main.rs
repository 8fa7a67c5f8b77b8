fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture file as raw JSON text.
    ///
    /// Envelope payloads are `RawValue`, which only deserializes from
    /// JSON text, so fixtures are parsed from text, never via
    /// `serde_json::Value`.
    fn load_fixture(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and
    /// compares the JSON values (order-independent comparison).
    ///
    /// The fixtures mirror what the hybrid shell's JS side sends and
    /// expects, so a mismatch here means a host-visible wire break.
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let text = load_fixture(name);
        let parsed: T = serde_json::from_str(&text)
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&parsed).unwrap())
                .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        let fixture: serde_json::Value = serde_json::from_str(&text)
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  JS:   {fixture}\n  Rust: {reserialized}"
        );
    }

    // --- Envelope tests ---

    #[test]
    fn fixture_call_pick_and_upload() {
        roundtrip_test::<airlift_protocol::Call>("call_pick_and_upload.json");
    }

    #[test]
    fn fixture_call_upload_media() {
        roundtrip_test::<airlift_protocol::Call>("call_upload_media.json");
    }

    #[test]
    fn fixture_reply_resolved() {
        roundtrip_test::<airlift_protocol::Reply>("reply_resolved.json");
    }

    #[test]
    fn fixture_reply_rejected() {
        roundtrip_test::<airlift_protocol::Reply>("reply_rejected.json");
    }

    // --- Payload tests ---

    #[test]
    fn fixture_upload_media_request() {
        roundtrip_test::<airlift_protocol::UploadMediaRequest>("upload_media_request.json");
    }

    #[test]
    fn fixture_upload_response() {
        roundtrip_test::<airlift_protocol::UploadResponse>("upload_response.json");
    }

    #[test]
    fn fixture_encoded_file() {
        roundtrip_test::<airlift_protocol::EncodedFile>("encoded_file.json");
    }

    #[test]
    fn fixture_status_event() {
        roundtrip_test::<airlift_protocol::StatusEvent>("status_event.json");
    }

    #[test]
    fn fixture_file_reference() {
        roundtrip_test::<airlift_protocol::FileReference>("file_reference.json");
    }

    // --- Semantic checks beyond field names ---

    #[test]
    fn encoded_file_data_is_base64() {
        let encoded: airlift_protocol::EncodedFile =
            serde_json::from_str(&load_fixture("encoded_file.json")).unwrap();
        // "iVBORw==" is the base64 PNG signature prefix.
        assert_eq!(encoded.data, [0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn rejected_reply_exposes_reason() {
        let reply: airlift_protocol::Reply =
            serde_json::from_str(&load_fixture("reply_rejected.json")).unwrap();
        assert!(!reply.is_resolved());
        let error = reply.error.unwrap();
        assert_eq!(error.reason.as_deref(), Some("http-status"));
    }

    #[test]
    fn upload_media_call_payload_parses() {
        let call: airlift_protocol::Call =
            serde_json::from_str(&load_fixture("call_upload_media.json")).unwrap();
        assert_eq!(call.method, "uploadMedia");
        let request: airlift_protocol::UploadMediaRequest =
            call.parse_payload().unwrap().unwrap();
        assert_eq!(request.file_data.as_deref(), Some("SGVsbG8="));
        assert_eq!(request.file_name.as_deref(), Some("hello.txt"));
    }
}
