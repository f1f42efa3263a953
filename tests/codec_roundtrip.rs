//! Round-trip tests for the .wsb codec
//!
//! Exercises `parse` and `serialize` together: decoding then re-encoding must
//! preserve values, folder-mapping cardinality and canonical read-only flags.

use serde_json::json;
use wsbconf::{
    codec::{self, CodecError},
    parse, serialize, serialize_value, validate_value, Configuration, EnableState, FolderSet,
    MappedFolder, MappedFolders, ReadOnlyState, WsbConfiguration,
};

const SIMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Configuration>
  <VGpu>Enable</VGpu>
  <Networking>Disable</Networking>
  <MemoryInMB>4096</MemoryInMB>
</Configuration>"#;

const FULL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Configuration>
  <VGpu>Enable</VGpu>
  <Networking>Enable</Networking>
  <AudioInput>Enable</AudioInput>
  <VideoInput>Disable</VideoInput>
  <ProtectedClient>Enable</ProtectedClient>
  <PrinterRedirection>Enable</PrinterRedirection>
  <ClipboardRedirection>Enable</ClipboardRedirection>
  <MemoryInMB>4096</MemoryInMB>
  <MappedFolders>
    <MappedFolder>
      <HostFolder>C:\Users\Public</HostFolder>
      <ReadOnly>true</ReadOnly>
    </MappedFolder>
  </MappedFolders>
  <LogonCommand>
    <Command>cmd.exe /c start https://example.com</Command>
  </LogonCommand>
</Configuration>"#;

const MULTIPLE_FOLDERS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Configuration>
  <MappedFolders>
    <MappedFolder>
      <HostFolder>C:\Users\Public</HostFolder>
      <ReadOnly>true</ReadOnly>
    </MappedFolder>
    <MappedFolder>
      <HostFolder>C:\Temp</HostFolder>
      <SandboxFolder>C:\Workspace</SandboxFolder>
      <ReadOnly>false</ReadOnly>
    </MappedFolder>
  </MappedFolders>
</Configuration>"#;

fn reparse(config: &Configuration) -> Configuration {
    let xml = serialize(config).expect("serialize");
    parse(&xml).expect("reparse")
}

#[test]
fn test_roundtrip_simple_configuration() {
    let parsed = parse(SIMPLE).unwrap();
    assert_eq!(reparse(&parsed), parsed);
}

#[test]
fn test_roundtrip_full_configuration() {
    let parsed = parse(FULL).unwrap();
    let settings = parsed.settings();
    assert_eq!(settings.protected_client, Some(EnableState::Enable));
    assert_eq!(settings.video_input, Some(EnableState::Disable));
    assert_eq!(reparse(&parsed), parsed);
}

#[test]
fn test_roundtrip_multiple_mapped_folders() {
    let parsed = parse(MULTIPLE_FOLDERS).unwrap();
    assert_eq!(reparse(&parsed), parsed);
}

#[test]
fn test_example_scenario() {
    let xml = "<Configuration><VGpu>Enable</VGpu><Networking>Disable</Networking><MemoryInMB>4096</MemoryInMB></Configuration>";
    let parsed = parse(xml).unwrap();
    assert_eq!(
        serde_json::to_value(&parsed).unwrap(),
        json!({"Configuration": {"VGpu": "Enable", "Networking": "Disable", "MemoryInMB": 4096}})
    );

    let output = serialize(&parsed).unwrap();
    assert_eq!(output, SIMPLE);
}

#[test]
fn test_cardinality_is_preserved() {
    let single = parse(FULL).unwrap();
    let single_folders = single.settings().mapped_folders.clone().unwrap();
    assert!(matches!(single_folders.mapped_folder, FolderSet::Single(_)));
    let xml = serialize(&single).unwrap();
    assert_eq!(xml.matches("<MappedFolder>").count(), 1);
    assert!(matches!(
        reparse(&single).settings().mapped_folders.as_ref().unwrap().mapped_folder,
        FolderSet::Single(_)
    ));

    let many = parse(MULTIPLE_FOLDERS).unwrap();
    let hosts: Vec<_> = many.settings().folders().iter().map(|f| f.host_folder.clone()).collect();
    assert_eq!(hosts, vec![r"C:\Users\Public", r"C:\Temp"]);
    let xml = serialize(&many).unwrap();
    assert_eq!(xml.matches("<MappedFolder>").count(), 2);
    assert!(xml.find(r"C:\Users\Public").unwrap() < xml.find(r"C:\Temp").unwrap());
}

#[test]
fn test_many_folders_roundtrip_for_larger_sets() {
    let folders: Vec<_> = (0..5)
        .map(|i| MappedFolder::new(format!(r"C:\Data\{}", i)).with_read_only(i % 2 == 0))
        .collect();
    let config = Configuration::new(WsbConfiguration::new().with_mapped_folders(MappedFolders::many(folders)));

    let back = reparse(&config);
    assert_eq!(back, config);
    assert_eq!(back.settings().folders()[4].host_folder, r"C:\Data\4");
}

#[test]
fn test_boolean_normalization_roundtrip() {
    let from_bool = validate_value(&json!({
        "Configuration": {"MappedFolders": {"MappedFolder": {"HostFolder": "C:\\a", "ReadOnly": true}}}
    }))
    .unwrap();
    let from_text = validate_value(&json!({
        "Configuration": {"MappedFolders": {"MappedFolder": {"HostFolder": "C:\\a", "ReadOnly": "true"}}}
    }))
    .unwrap();
    assert_eq!(from_bool, from_text);

    let xml = serialize(&from_bool).unwrap();
    assert!(xml.contains("<ReadOnly>true</ReadOnly>"));
    assert_eq!(parse(&xml).unwrap().settings().folders()[0].read_only, Some(ReadOnlyState::True));
}

#[test]
fn test_empty_suppression() {
    let config = Configuration::new(
        WsbConfiguration::new()
            .with_v_gpu(EnableState::Disable)
            .with_networking(EnableState::Default),
    );
    let xml = serialize(&config).unwrap();
    assert!(!xml.contains("MappedFolders"));
    assert!(!xml.contains("LogonCommand"));
    assert_eq!(reparse(&config), config);
}

#[test]
fn test_every_toggle_value_roundtrips() {
    for state in EnableState::ALL {
        let config = Configuration::new(
            WsbConfiguration::new()
                .with_v_gpu(state)
                .with_networking(state)
                .with_audio_input(state)
                .with_video_input(state)
                .with_protected_client(state)
                .with_printer_redirection(state)
                .with_clipboard_redirection(state),
        );
        assert_eq!(reparse(&config), config);
    }
}

#[test]
fn test_special_characters_roundtrip() {
    let config = Configuration::new(
        WsbConfiguration::new()
            .with_logon_command(r#"powershell -Command "if (1 -lt 2) { 'a&b' }" > C:\out.txt"#)
            .with_mapped_folders(MappedFolders::single(
                MappedFolder::new(r"C:\R&D\<draft>").with_sandbox_folder(r"C:\Users\WDAGUtilityAccount\Desktop"),
            )),
    );
    assert_eq!(reparse(&config), config);
}

#[test]
fn test_illegal_enum_is_rejected_both_ways() {
    let err = parse("<Configuration><VGpu>InvalidValue</VGpu></Configuration>").unwrap_err();
    assert!(err.validation().unwrap().mentions("Configuration.VGpu"));

    let err = serialize_value(&json!({"Configuration": {"VGpu": "InvalidValue"}})).unwrap_err();
    assert!(err.validation().unwrap().mentions("Configuration.VGpu"));
}

#[test]
fn test_missing_host_folder_is_rejected_on_encode() {
    let err = serialize_value(&json!({
        "Configuration": {"MappedFolders": {"MappedFolder": [{"HostFolder": "C:\\ok"}, {"ReadOnly": "true"}]}}
    }))
    .unwrap_err();
    let report = err.validation().unwrap();
    assert!(report.mentions("Configuration.MappedFolders.MappedFolder[1].HostFolder"));
    assert_eq!(report.issues().len(), 1);
}

#[test]
fn test_malformed_xml_is_not_a_validation_error() {
    let err = parse("<Configuration><VGpu>Enable</Networking></Configuration>").unwrap_err();
    assert!(matches!(err, CodecError::MalformedDocument { .. }));
    assert!(err.validation().is_none());
}

#[test]
fn test_unknown_elements_are_ignored() {
    let xml = r#"<Configuration>
  <VGpu>Enable</VGpu>
  <FutureFeature>Enable</FutureFeature>
  <MappedFolders>
    <MappedFolder>
      <HostFolder>C:\a</HostFolder>
      <Comment>ignored</Comment>
    </MappedFolder>
  </MappedFolders>
</Configuration>"#;
    let config = parse(xml).unwrap();
    assert_eq!(config.settings().v_gpu, Some(EnableState::Enable));

    let output = serialize(&config).unwrap();
    assert!(!output.contains("FutureFeature"));
    assert!(!output.contains("Comment"));
}

#[test]
fn test_file_helpers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sandbox.wsb");

    let config = parse(FULL).unwrap();
    codec::write_file(&path, &config).unwrap();
    assert_eq!(codec::parse_file(&path).unwrap(), config);

    let missing = codec::parse_file(dir.path().join("missing.wsb")).unwrap_err();
    assert!(matches!(missing, CodecError::Io(_)));
}

#[test]
fn test_concurrent_calls_are_independent() {
    let handles: Vec<_> = (0..8u32)
        .map(|i| {
            std::thread::spawn(move || {
                let config = Configuration::new(WsbConfiguration::new().with_memory_in_mb(1024 + i));
                reparse(&config) == config
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_padded_strings_are_refused_on_encode() {
    let padded_command = Configuration::new(WsbConfiguration::new().with_logon_command("  cmd.exe /c run  "));
    let err = serialize(&padded_command).unwrap_err();
    assert!(err.validation().unwrap().mentions("Configuration.LogonCommand.Command"));

    let padded_sandbox = Configuration::new(WsbConfiguration::new().with_mapped_folders(
        MappedFolders::single(MappedFolder::new(r"C:\a").with_sandbox_folder(r" C:\b ")),
    ));
    let err = serialize(&padded_sandbox).unwrap_err();
    assert!(err
        .validation()
        .unwrap()
        .mentions("Configuration.MappedFolders.MappedFolder.SandboxFolder"));

    let blank_host = Configuration::new(
        WsbConfiguration::new().with_mapped_folders(MappedFolders::single(MappedFolder::new("   "))),
    );
    let err = serialize(&blank_host).unwrap_err();
    let report = err.validation().unwrap();
    assert!(report.mentions("Configuration.MappedFolders.MappedFolder.HostFolder"));
    assert_eq!(report.issues()[0].reason, "must not be empty");
}

#[test]
fn test_inner_whitespace_roundtrips() {
    let config = Configuration::new(
        WsbConfiguration::new()
            .with_logon_command("cmd.exe /c run  twice")
            .with_mapped_folders(MappedFolders::single(
                MappedFolder::new(r"C:\Program Files\Tools").with_sandbox_folder(r"C:\My  Tools"),
            )),
    );
    assert_eq!(reparse(&config), config);
}

#[test]
fn test_invalid_utf8_file_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.wsb");
    let mut bytes = b"<Configuration><LogonCommand><Command>".to_vec();
    bytes.extend_from_slice(b"\xff\xfe");
    bytes.extend_from_slice(b"</Command></LogonCommand></Configuration>");
    std::fs::write(&path, &bytes).unwrap();

    let err = codec::parse_file(&path).unwrap_err();
    match err {
        CodecError::MalformedDocument { position, .. } => assert_eq!(position, 38),
        other => panic!("expected a malformed document, got {:?}", other),
    }
}
