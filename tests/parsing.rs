use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use wol_alias::config::Config;
use wol_alias::parse::ParseError;

fn expected() -> Config {
    Config {
        broadcast: Some("192.168.1.255".to_string()),
        port: Some(7),
        database: Some(PathBuf::from("/srv/wol/aliases.json")),
    }
}

#[test]
fn parsing_by_extension() {
    let dir = TempDir::new().unwrap();

    let yaml = dir.path().join("config.yaml");
    fs::write(&yaml, r#"
broadcast: 192.168.1.255
port: 7
database: /srv/wol/aliases.json
"#).unwrap();

    let toml = dir.path().join("config.toml");
    fs::write(&toml, r#"
broadcast = "192.168.1.255"
port = 7
database = "/srv/wol/aliases.json"
"#).unwrap();

    let json = dir.path().join("config.json");
    fs::write(&json, r#"
{
    "broadcast": "192.168.1.255",
    "port": 7,
    "database": "/srv/wol/aliases.json"
}
"#).unwrap();

    for p in [yaml, toml, json] {
        assert_eq!(Config::try_from(p.as_path()).unwrap(), expected());
    }
}

#[test]
fn partial_config() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("config.toml");
    fs::write(&p, "port = 7\n").unwrap();
    let cfg = Config::try_from(p.as_path()).unwrap();
    assert_eq!(cfg.port, Some(7));
    assert_eq!(cfg.broadcast, None);
    let opts = cfg.wake_options(None, None, None);
    assert_eq!(opts.broadcast, "255.255.255.255");
    assert_eq!(opts.port, 7);
}

#[test]
fn explicit_config_errors() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Config::try_from(dir.path().join("missing.yaml").as_path()),
        Err(ParseError::FileNotFound(_))
    ));
    assert!(matches!(
        Config::try_from(dir.path()),
        Err(ParseError::PathIsDirectory(_))
    ));

    let p = dir.path().join("config.json");
    fs::write(&p, r#"{ "port": "nine" }"#).unwrap();
    assert!(matches!(Config::try_from(p.as_path()), Err(ParseError::SerdeJsonError(_))));
}

#[test]
fn default_search() {
    let home = TempDir::new().unwrap();
    assert_eq!(Config::search(home.path()), None);
    assert_eq!(Config::load_default(home.path()).unwrap(), Config::default());

    let folder = home.path().join(".config").join("wol");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("config.json"), r#"{ "port": 9 }"#).unwrap();
    fs::write(folder.join("config.yaml"), "port: 7\n").unwrap();

    assert_eq!(Config::search(home.path()), Some(folder.join("config.yaml")));
    assert_eq!(Config::load_default(home.path()).unwrap().port, Some(7));
}

#[cfg(feature = "cmd")]
#[test]
fn operation_parsing() {
    use wol_alias::cmd::{CommandKind, Operation, RuntimeError};

    let args = |a: &[&str]| a.iter().map(|s| s.to_string()).collect::<Vec<String>>();

    assert_eq!(Operation::parse(&args(&["list", "extra"])).unwrap(), Operation::List);
    assert_eq!(
        Operation::parse(&args(&["Remove", "nas"])).unwrap(),
        Operation::Remove { name: "nas".to_string() }
    );
    assert_eq!(
        Operation::parse(&args(&["alias", "nas", "00:11:22:33:44:55", ""])).unwrap(),
        Operation::Alias { name: "nas".to_string(), mac: "00:11:22:33:44:55".to_string(), iface: None }
    );

    let implicit = Operation::parse(&args(&["nas"])).unwrap();
    assert_eq!(implicit, Operation::Wake { target: "nas".to_string() });
    assert_eq!(implicit.kind(), CommandKind::Wake);

    for bad in [&["remove"][..], &["wake", ""][..], &[][..]] {
        let e = Operation::parse(&args(bad)).unwrap_err();
        assert!(matches!(e, RuntimeError::Validation(_)));
        assert_eq!(e.exit_code(), 2);
    }
}
