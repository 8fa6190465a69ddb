use serde_json::json;
use zibaldone_core::Metadata;

#[test]
fn empty_object_renders_as_no_metadata() {
    let metadata = Metadata::parse(Some("{}"));
    assert!(metadata.is_empty());
    assert_eq!(metadata.summary(), "no metadata");
}

#[test]
fn size_round_trips_exactly() {
    let metadata = Metadata::parse(Some("{\"size\":1024}"));
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata.get("size"), Some(&json!(1024)));
    assert_eq!(metadata.size(), Some(1024));
    assert_eq!(metadata.to_json_string(), "{\"size\":1024}");
}

#[test]
fn malformed_or_missing_metadata_degrades_to_empty() {
    for raw in [None, Some(""), Some("   "), Some("{not json"), Some("[1,2]"), Some("42")] {
        assert!(Metadata::parse(raw).is_empty(), "input {raw:?}");
    }
}

#[test]
fn size_label_uses_binary_units() {
    let label = |size: u64| Metadata::new().with("size", size).size_label();
    assert_eq!(label(0), "N/A");
    assert_eq!(label(512), "512.0 B");
    assert_eq!(label(1024), "1.0 KB");
    assert_eq!(label(1536), "1.5 KB");
    assert_eq!(label(5 * 1024 * 1024), "5.0 MB");
    assert_eq!(label(3 * 1024 * 1024 * 1024 * 1024), "3072.0 GB");
    assert_eq!(Metadata::new().size_label(), "N/A");
}

#[test]
fn type_label_shows_mime_subtype() {
    let label = |mime: &str| Metadata::new().with("type", mime).type_label();
    assert_eq!(label("application/pdf"), "PDF");
    assert_eq!(label("image/png"), "PNG");
    assert_eq!(label("text"), "FILE");
    assert_eq!(label(""), "FILE");
    assert_eq!(Metadata::new().type_label(), "FILE");
}

#[test]
fn summary_is_pretty_json() {
    let metadata = Metadata::parse(Some("{\"size\":1,\"type\":\"text/plain\"}"));
    assert_eq!(
        metadata.summary(),
        "{\n  \"size\": 1,\n  \"type\": \"text/plain\"\n}"
    );
}
