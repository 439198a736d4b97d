//! Settings deserialization behaviour.

use lbtopo::config::Settings;

#[test]
fn test_partial_settings_fill_in_defaults() {
    let settings: Settings = serde_json::from_str(r#"{"location": "eastus2"}"#).unwrap();
    assert_eq!(settings.location, "eastus2");
    assert_eq!(settings.prefix, "lbtopo");
    assert!(!settings.keep);
}

#[test]
fn test_settings_round_trip() {
    let settings = Settings {
        location: "northeurope".into(),
        prefix: "demo".into(),
        keep: true,
        ..Settings::default()
    };
    let json = serde_json::to_string(&settings).unwrap();
    let back: Settings = serde_json::from_str(&json).unwrap();
    assert_eq!(back.location, "northeurope");
    assert_eq!(back.prefix, "demo");
    assert!(back.keep);
}
