//! End-to-end lookup against a synthesized database tree

use std::{fs, path::Path, thread};

use tempfile::tempdir;
use terminfo_db::{Database, caps, decode};

/// Compile a small entry with a couple of capabilities of each kind
fn make_entry(names: &str) -> Vec<u8> {
    let strings: &[&[u8]] = &[b"\x07", b"\r"];
    let str_size: u16 = strings.iter().map(|s| s.len() as u16 + 1).sum();

    let mut buffer = vec![];
    buffer.extend_from_slice(&u16::to_le_bytes(0x011a));
    buffer.extend_from_slice(&u16::to_le_bytes(names.len() as u16 + 1));
    buffer.extend_from_slice(&u16::to_le_bytes(2)); // booleans
    buffer.extend_from_slice(&u16::to_le_bytes(3)); // numbers
    buffer.extend_from_slice(&u16::to_le_bytes(strings.len() as u16 + 1));
    buffer.extend_from_slice(&u16::to_le_bytes(str_size));
    buffer.extend_from_slice(names.as_bytes());
    buffer.push(0);
    // bw absent, am set
    buffer.extend_from_slice(&[0xff, 1]);
    // cols 80, it absent, lines 24
    buffer.extend_from_slice(&u16::to_le_bytes(80));
    buffer.extend_from_slice(&u16::to_le_bytes(0xffff));
    buffer.extend_from_slice(&u16::to_le_bytes(24));
    // cbt absent, bel, cr
    buffer.extend_from_slice(&u16::to_le_bytes(0xffff));
    let mut offset = 0u16;
    for string in strings {
        buffer.extend_from_slice(&u16::to_le_bytes(offset));
        offset += string.len() as u16 + 1;
    }
    for string in strings {
        buffer.extend_from_slice(string);
        buffer.push(0);
    }
    buffer
}

fn write_entry(root: &Path, name: &str, names: &str) {
    let leaf_dir = root.join(&name[..1]);
    if !leaf_dir.is_dir() {
        fs::create_dir(&leaf_dir).unwrap();
    }
    fs::write(leaf_dir.join(name), make_entry(names)).unwrap();
}

#[test]
fn lookup_decodes_capabilities() {
    let temp_dir = tempdir().unwrap();
    write_entry(temp_dir.path(), "aterm", "aterm|a test terminal");

    let database = Database::new();
    let terminfo = database.load(temp_dir.path(), "aterm").unwrap();

    assert_eq!(terminfo.names, vec!["aterm", "a test terminal"]);
    assert_eq!(terminfo.boolean(caps::bool_index("am").unwrap()), Some(true));
    assert_eq!(terminfo.boolean(caps::bool_index("bw").unwrap()), None);
    assert_eq!(terminfo.number(caps::num_index("cols").unwrap()), Some(80));
    assert_eq!(terminfo.number(caps::num_index("lines").unwrap()), Some(24));
    assert_eq!(terminfo.number(caps::num_index("it").unwrap()), None);
    assert_eq!(terminfo.string(caps::string_index("bel").unwrap()), Some("\x07"));
    assert_eq!(terminfo.string(caps::string_index("cr").unwrap()), Some("\r"));
    assert_eq!(terminfo.string(caps::string_index("cbt").unwrap()), None);
}

#[test]
fn lookup_matches_direct_decode() {
    let temp_dir = tempdir().unwrap();
    write_entry(temp_dir.path(), "bterm", "bterm");

    let database = Database::new();
    let loaded = database.load(temp_dir.path(), "bterm").unwrap();
    let mut decoded = decode(&make_entry("bterm")).unwrap();

    // The lookup path is the only thing that sets the source path.
    assert!(decoded.path.as_os_str().is_empty());
    decoded.path.clone_from(&loaded.path);
    assert_eq!(*loaded, decoded);
}

#[test]
fn concurrent_lookups() {
    let temp_dir = tempdir().unwrap();
    for name in ["cterm", "dterm", "eterm"] {
        write_entry(temp_dir.path(), name, name);
    }

    let database = Database::new();
    let database = &database;
    let root = temp_dir.path();
    thread::scope(|scope| {
        for _ in 0..4 {
            for name in ["cterm", "dterm", "eterm"] {
                scope.spawn(move || {
                    let terminfo = database.load(root, name).unwrap();
                    assert_eq!(terminfo.names, vec![name]);
                });
            }
        }
    });
}
