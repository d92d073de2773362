//! Settings loading, JSON symbol ingestion and writing to disk

use musicxml_generator::{
    read_tokens, save_musicxml, to_musicxml, tokens_to_musicxml, ConversionError, ExportSettings, Symbol,
};

const MELODY: &str = "clef_G2 _ _ _ upper
keySignature_-1 . . . .
timeSignature_3/4 . . . .
note_4 F4 _ slurStart upper
note_8 G4 _ staccato upper
note_8 A4 _ slurStop upper
note_4 B4 b fermata upper
barline . . . .";

#[test]
fn test_settings_from_json() {
    let settings = ExportSettings::from_json(
        r#"{"large_page": true, "metronome": 88, "title": "Minuet", "parallel": true}"#,
    )
    .unwrap();
    assert!(settings.large_page);
    assert_eq!(settings.metronome, Some(88));
    assert_eq!(settings.tempo, None);
    assert_eq!(settings.title, "Minuet");
    assert!(settings.parallel);

    let xml = tokens_to_musicxml(&settings, &[MELODY]).unwrap();
    assert!(xml.contains("<work-title>Minuet</work-title>"));
    assert!(xml.contains("<sound tempo=\"88\"/>"));
}

#[test]
fn test_settings_json_errors() {
    let err = ExportSettings::from_json(r#"{"metronome": "fast"}"#).unwrap_err();
    assert!(matches!(err, ConversionError::Json(_)));
}

#[test]
fn test_symbols_from_json() {
    let symbols = read_tokens(MELODY).unwrap();
    let json = serde_json::to_string(&symbols).unwrap();
    let decoded: Vec<Symbol> = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, symbols);

    let settings = ExportSettings::default();
    let from_json = to_musicxml(&settings, &[decoded]).unwrap();
    let from_text = tokens_to_musicxml(&settings, &[MELODY]).unwrap();
    assert_eq!(from_json, from_text);
}

#[test]
fn test_save_musicxml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("minuet.musicxml");
    let symbols = read_tokens(MELODY).unwrap();

    save_musicxml(&path, &ExportSettings::default(), &[symbols.clone()]).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, to_musicxml(&ExportSettings::default(), &[symbols]).unwrap());
    assert!(written.starts_with("<?xml"));
    assert!(written.contains("<slur type=\"start\" number=\"1\"/>"));
    assert!(written.contains("<fermata/>"));
    assert!(written.contains("<staccato/>"));
}

#[test]
fn test_save_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.musicxml");
    let err = save_musicxml(&path, &ExportSettings::default(), &[]).unwrap_err();
    assert!(matches!(err, ConversionError::Io(_)));
}

#[test]
fn test_invalid_token_reports_line() {
    let err = tokens_to_musicxml(&ExportSettings::default(), &["note_4 C4\ntimeSignature_x/4"]).unwrap_err();
    match err {
        ConversionError::InvalidToken { line, .. } => assert_eq!(line, 2),
        other => panic!("expected invalid token, got {:?}", other),
    }
}
