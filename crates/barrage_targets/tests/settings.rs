use std::io::Cursor;

use barrage_targets::{
    read_all_targets, Header, Target, TargetFormat, TargetSettings, UnknownFormat, TARGET_FORMATS,
};
use bytes::Bytes;
use pretty_assertions::assert_eq;

#[test]
fn formats_parse_and_display() {
    assert_eq!(TARGET_FORMATS, ["http", "json"]);
    for name in TARGET_FORMATS {
        let format: TargetFormat = name.parse().unwrap();
        assert_eq!(format.to_string(), name);
    }
    assert_eq!(
        "yaml".parse::<TargetFormat>(),
        Err(UnknownFormat("yaml".to_string()))
    );
    assert_eq!(TargetFormat::default(), TargetFormat::Json);
}

#[test]
fn settings_pick_the_decoder() {
    let http = TargetSettings {
        format: TargetFormat::Http,
        ..TargetSettings::default()
    };
    let targets = read_all_targets(http.provider(Cursor::new(b"GET https://x/1\n".to_vec()))).unwrap();
    assert_eq!(targets, vec![Target::new("GET", "https://x/1")]);

    let json = TargetSettings::default();
    let targets = read_all_targets(
        json.provider(Cursor::new(br#"{"method":"GET","url":"https://x/2"}"#.to_vec())),
    )
    .unwrap();
    assert_eq!(targets, vec![Target::new("GET", "https://x/2")]);
}

#[test]
fn settings_defaults_reach_every_target() {
    let settings = TargetSettings {
        format: TargetFormat::Http,
        body: Bytes::from_static(b"ping"),
        header: [("Authorization", "Bearer t")].into_iter().collect::<Header>(),
    };
    let src = Cursor::new(b"POST https://x/1\n\nPOST https://x/2\nX-N: 2\n".to_vec());
    let targets = read_all_targets(settings.provider(src)).unwrap();

    assert_eq!(targets.len(), 2);
    for target in &targets {
        assert_eq!(target.body, Bytes::from_static(b"ping"));
        assert_eq!(target.header.get("Authorization"), Some("Bearer t"));
    }
    assert_eq!(targets[1].header.get("X-N"), Some("2"));
}
