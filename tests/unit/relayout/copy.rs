use super::*;
use std::fs;
use tempfile::TempDir;

/// Places every `.png` as field `f` of layer 0 and skips everything else.
struct PngOnly;

impl Classifier for PngOnly {
    fn classify(&self, rel_path: &str) -> Vec<Placement> {
        if rel_path.ends_with(".png") {
            vec![Placement::Color {
                layer: 0,
                field: "f".into(),
            }]
        } else {
            Vec::new()
        }
    }
}

fn mapping(root: &Path, name: &str) -> DirectoryMapping {
    let src = root.join("src").join(name);
    fs::create_dir_all(&src).unwrap();
    DirectoryMapping {
        src,
        dest: root.join("dest").join(name),
    }
}

#[test]
fn copies_classified_files_and_skips_the_rest() {
    let tmp = TempDir::new().unwrap();
    let m = mapping(tmp.path(), "a");
    fs::write(m.src.join("x.png"), b"png").unwrap();
    fs::write(m.src.join("notes.txt"), b"txt").unwrap();

    let report = relayout(&[m.clone()], &PngOnly, ".png", &RelayoutOptions::default()).unwrap();
    assert_eq!(report.directories, 1);
    assert_eq!(report.copied, 1);
    assert_eq!(report.skipped, 1);
    assert!(report.failures.is_empty());
    assert_eq!(fs::read(m.dest.join("0_f.png")).unwrap(), b"png");
    assert!(!m.dest.join("notes.txt").exists());
    assert_eq!(
        report.discovered.iter().cloned().collect::<Vec<_>>(),
        vec![(0, "f".to_string())]
    );
}

#[test]
fn missing_source_is_a_copy_failure_not_an_abort() {
    let tmp = TempDir::new().unwrap();
    let good = mapping(tmp.path(), "good");
    fs::write(good.src.join("x.png"), b"1").unwrap();
    let missing = DirectoryMapping {
        src: tmp.path().join("src/missing"),
        dest: tmp.path().join("dest/missing"),
    };

    let report = relayout(
        &[missing.clone(), good.clone()],
        &PngOnly,
        ".png",
        &RelayoutOptions::default(),
    )
    .unwrap();
    assert_eq!(report.directories, 2);
    assert_eq!(report.copied, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::Copy);
    assert_eq!(report.failures[0].path, missing.src);
    // The destination directory is still created for every combination.
    assert!(missing.dest.is_dir());
}

#[test]
fn parallel_and_serial_reports_agree() {
    let tmp = TempDir::new().unwrap();
    let mappings: Vec<_> = (0..6)
        .map(|i| {
            let m = mapping(tmp.path(), &format!("d{i}"));
            fs::write(m.src.join("img.png"), [i as u8]).unwrap();
            m
        })
        .collect();

    let serial = relayout(&mappings, &PngOnly, ".png", &RelayoutOptions::default()).unwrap();
    let opts = RelayoutOptions {
        parallel: true,
        threads: Some(3),
        ..RelayoutOptions::default()
    };
    let parallel = relayout(&mappings, &PngOnly, ".png", &opts).unwrap();

    assert_eq!(serial.copied, 6);
    assert_eq!(parallel.copied, serial.copied);
    assert_eq!(parallel.discovered, serial.discovered);
    for (i, m) in mappings.iter().enumerate() {
        assert_eq!(fs::read(m.dest.join("0_f.png")).unwrap(), vec![i as u8]);
    }
}

#[test]
fn zero_threads_is_rejected() {
    let opts = RelayoutOptions {
        parallel: true,
        threads: Some(0),
        ..RelayoutOptions::default()
    };
    let err = relayout(&[], &PngOnly, ".png", &opts).unwrap_err();
    assert!(matches!(err, ConvertError::MalformedManifest(_)));
}

#[test]
fn cancelled_runs_start_no_directories() {
    let tmp = TempDir::new().unwrap();
    let m = mapping(tmp.path(), "a");
    fs::write(m.src.join("x.png"), b"1").unwrap();

    let opts = RelayoutOptions::default();
    opts.cancel.cancel();
    let report = relayout(&[m.clone()], &PngOnly, ".png", &opts).unwrap();
    assert_eq!(report.cancelled, 1);
    assert_eq!(report.directories, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, m.src);
    assert!(!m.dest.exists());
}

#[test]
fn list_files_is_recursive_and_sorted() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("b/c")).unwrap();
    fs::write(tmp.path().join("z.txt"), b"").unwrap();
    fs::write(tmp.path().join("b/c/y.png"), b"").unwrap();
    fs::write(tmp.path().join("a.im"), b"").unwrap();

    let listing = list_files(tmp.path());
    assert!(listing.errors.is_empty());
    let rels: Vec<&str> = listing.files.iter().map(|f| f.rel.as_str()).collect();
    assert_eq!(rels, ["a.im", "b/c/y.png", "z.txt"]);
    assert_eq!(listing.files[1].path, tmp.path().join("b/c/y.png"));
}

#[test]
fn missing_root_is_a_listing_error() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("absent");
    let listing = list_files(&root);
    assert!(listing.files.is_empty());
    assert_eq!(listing.errors.len(), 1);
    assert_eq!(listing.errors[0].0, root);
}

#[cfg(unix)]
#[test]
fn non_utf8_file_names_are_copied_from_their_real_path() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tmp = TempDir::new().unwrap();
    let m = mapping(tmp.path(), "a");
    let name = OsStr::from_bytes(b"pressure\xff.png");
    if fs::write(m.src.join(name), b"raw").is_err() {
        // Filesystems that reject non-UTF-8 names cannot hold such a store.
        return;
    }

    let report = relayout(&[m.clone()], &PngOnly, ".png", &RelayoutOptions::default()).unwrap();
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(report.copied, 1);
    assert_eq!(fs::read(m.dest.join("0_f.png")).unwrap(), b"raw");
}

#[cfg(unix)]
#[test]
fn unreadable_subdirectory_does_not_hide_sibling_files() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let m = mapping(tmp.path(), "a");
    fs::create_dir_all(m.src.join("good")).unwrap();
    fs::write(m.src.join("good/x.png"), b"x").unwrap();
    let locked = m.src.join("locked");
    fs::create_dir_all(&locked).unwrap();
    fs::write(locked.join("y.png"), b"y").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users read through permission bits; nothing to observe then.
    let readable = fs::read_dir(&locked).is_ok();
    let report = relayout(&[m.clone()], &PngOnly, ".png", &RelayoutOptions::default()).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    if readable {
        return;
    }

    assert_eq!(report.copied, 1);
    assert_eq!(fs::read(m.dest.join("0_f.png")).unwrap(), b"x");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::Copy);
    assert_eq!(report.failures[0].path, locked);
}

#[test]
fn cancel_token_clones_share_state() {
    let token = CancelToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());
    token.cancel();
    assert!(clone.is_cancelled());
}
