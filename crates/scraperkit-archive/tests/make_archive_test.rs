//! End-to-end archive builds from scratch directories.

use scraperkit_archive::{make_archive, Archive, BuildRequest, Error};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x30\0\0\0\x30";

/// `build/` with four files, plus a redirects file beside it.
fn build_tree() -> TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let build = tmp.path().join("build");
    fs::create_dir(&build).unwrap();
    fs::write(build.join("welcome"), "<html><title>Coucou</title></html>").unwrap();
    fs::write(build.join("style.css"), "body { background-color: red; }").unwrap();
    fs::write(build.join("app.js"), "console.log(window);").unwrap();
    fs::write(build.join("commons48.png"), PNG).unwrap();
    fs::write(tmp.path().join("redirects.tsv"), "A\tAccueil\t\tcommons48.png\n").unwrap();
    tmp
}

fn request(tmp: &Path) -> BuildRequest {
    let mut request = BuildRequest::new(
        tmp.join("build"),
        tmp.join("test.zim"),
        "test_zim",
        "welcome",
        "commons48.png",
        "Test ZIM",
        "A test archive",
    );
    request.redirects_file = Some(tmp.join("redirects.tsv"));
    request
}

#[test]
fn builds_example_tree() {
    let tmp = build_tree();
    let fpath = make_archive(&request(tmp.path())).unwrap();
    assert_eq!(fpath, tmp.path().join("test.zim"));

    let mut archive = Archive::open(&fpath).unwrap();
    // 4 items, 1 alias, mainPage, illustration, counter
    assert_eq!(archive.entry_count(), 8);
    assert_eq!(archive.main_path(), Some("welcome"));

    let css = archive.get_item("style.css").unwrap();
    assert_eq!(css.mimetype, "text/css");
    assert_eq!(css.title, "");
    assert_eq!(archive.get_item("commons48.png").unwrap().title, "");
    let js = archive.get_item("app.js").unwrap().mimetype;
    assert!(js == "application/javascript" || js == "text/javascript");

    let welcome = archive.get_item("welcome").unwrap();
    assert_eq!(welcome.mimetype, "text/html");
    assert_eq!(welcome.title, "Coucou");

    let alias = archive.get_item("A/Accueil").unwrap();
    assert_eq!(alias.path, "commons48.png");
    assert_eq!(alias.content, PNG);

    assert!(archive.get_suggestions("coucou").contains(&"welcome".to_string()));
    assert_eq!(archive.get_suggestions_count("bienvenue"), 0);

    assert_eq!(archive.metadata()["Title"], "Test ZIM");
    assert_eq!(archive.metadata()["Name"], "test_zim");
}

#[test]
fn nested_files_use_slash_paths() {
    let tmp = build_tree();
    let sub = tmp.path().join("build").join("assets").join("img");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("logo.png"), PNG).unwrap();

    let fpath = make_archive(&request(tmp.path())).unwrap();
    let mut archive = Archive::open(&fpath).unwrap();
    assert_eq!(archive.get_item("assets/img/logo.png").unwrap().mimetype, "image/png");
    assert_eq!(archive.entry_count(), 9);
}

#[test]
fn missing_build_dir_is_io_error() {
    let tmp = build_tree();
    let mut request = request(tmp.path());
    request.build_dir = tmp.path().join("nope");

    let err = make_archive(&request).unwrap_err();
    assert!(err.is_io());
    assert!(!request.fpath.exists());
}

#[test]
fn missing_illustration_is_io_error() {
    let tmp = build_tree();
    let mut request = request(tmp.path());
    request.illustration = "missing.png".into();

    let err = make_archive(&request).unwrap_err();
    assert!(matches!(err, Error::IllustrationNotFound { .. }));
    assert!(err.is_io());
    assert!(!request.fpath.exists());
}

#[test]
fn missing_redirects_file_leaves_no_archive() {
    let tmp = build_tree();
    let mut request = request(tmp.path());
    request.redirects_file = Some(tmp.path().join("toto.tsv"));

    let err = make_archive(&request).unwrap_err();
    assert!(err.is_io());
    assert!(!request.fpath.exists());
}

#[test]
fn bad_redirect_target_leaves_no_archive_either_way() {
    for workaround in [true, false] {
        let tmp = build_tree();
        fs::write(
            tmp.path().join("redirects.tsv"),
            "A\tAccueil\t\tcommons48.png\nA\tBienvenue\tBienvenue\tnowhere.html\n",
        )
        .unwrap();
        let mut request = request(tmp.path());
        request.workaround_nocancel = workaround;

        let err = make_archive(&request).unwrap_err();
        assert!(matches!(err, Error::RedirectTarget { .. }), "{err}");
        assert!(!request.fpath.exists(), "workaround={workaround}");
    }
}

#[test]
fn malformed_redirects_leave_no_archive_either_way() {
    for workaround in [true, false] {
        let tmp = build_tree();
        fs::write(tmp.path().join("redirects.tsv"), "A\tAccueil\tcommons48.png\n").unwrap();
        let mut request = request(tmp.path());
        request.workaround_nocancel = workaround;

        let err = make_archive(&request).unwrap_err();
        assert!(err.is_redirect());
        assert!(!request.fpath.exists(), "workaround={workaround}");

        // No staging leftovers either.
        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| !n.ends_with(".tmp")), "{names:?}");
    }
}

#[test]
fn duplicate_alias_follows_policy() {
    let tmp = build_tree();
    fs::write(
        tmp.path().join("redirects.tsv"),
        " \twelcome\t\tcommons48.png\n",
    )
    .unwrap();

    let err = make_archive(&request(tmp.path())).unwrap_err();
    assert!(matches!(err, Error::DuplicateEntry(p) if p == "welcome"));
    assert!(!tmp.path().join("test.zim").exists());

    let mut request = request(tmp.path());
    request.ignore_duplicates = true;
    let fpath = make_archive(&request).unwrap();
    let mut archive = Archive::open(&fpath).unwrap();
    assert_eq!(archive.get_item("welcome").unwrap().title, "Coucou");
    assert_eq!(archive.entry_count(), 7);
}

#[test]
fn archive_inside_build_dir_is_not_indexed() {
    let tmp = build_tree();
    let mut request = request(tmp.path());
    request.fpath = tmp.path().join("build").join("test.zim");

    let fpath = make_archive(&request).unwrap();
    let archive = Archive::open(&fpath).unwrap();
    assert_eq!(archive.entry_count(), 8);
    assert!(archive.paths().all(|p| !p.ends_with(".tmp")));
}

#[test]
fn request_from_toml() {
    let request: BuildRequest = toml::from_str(
        r#"
        build_dir = "/srv/build"
        fpath = "/srv/out/test.zim"
        name = "test_zim"
        main_page = "welcome"
        illustration = "commons48.png"
        title = "Test ZIM"
        description = "A test archive"
        redirects_file = "/srv/redirects.tsv"
        tags = ["_category:test", "nopic"]
        "#,
    )
    .unwrap();

    assert!(request.workaround_nocancel);
    assert!(!request.ignore_duplicates);
    assert_eq!(request.language, "eng");
    assert_eq!(request.creator, "-");
    assert_eq!(request.date.len(), 10);
    assert_eq!(request.tags.len(), 2);
    assert_eq!(request.redirects_file.as_deref(), Some(Path::new("/srv/redirects.tsv")));
}

#[test]
fn failed_build_keeps_earlier_archive_either_way() {
    for workaround in [true, false] {
        let tmp = build_tree();
        let fpath = tmp.path().join("test.zim");
        fs::write(&fpath, b"previous archive").unwrap();
        fs::write(tmp.path().join("redirects.tsv"), "A\tAccueil\tcommons48.png\n").unwrap();
        let mut request = request(tmp.path());
        request.workaround_nocancel = workaround;

        assert!(make_archive(&request).is_err());
        assert_eq!(
            fs::read(&fpath).unwrap(),
            b"previous archive",
            "workaround={workaround}"
        );
    }
}

#[test]
fn reserved_front_entry_path_is_rejected() {
    let tmp = build_tree();
    let meta = tmp.path().join("build").join("M");
    fs::create_dir(&meta).unwrap();
    fs::write(meta.join("Counter"), "text/html=99").unwrap();
    let mut request = request(tmp.path());
    request.ignore_duplicates = true;

    let err = make_archive(&request).unwrap_err();
    assert!(matches!(err, Error::ReservedPath(p) if p == "M/Counter"));
    assert!(!request.fpath.exists());
}

#[cfg(unix)]
#[test]
fn symlinked_files_are_included() {
    let tmp = build_tree();
    let build = tmp.path().join("build");
    fs::remove_file(build.join("style.css")).unwrap();
    fs::write(tmp.path().join("real.css"), "body { color: blue; }").unwrap();
    std::os::unix::fs::symlink(tmp.path().join("real.css"), build.join("style.css")).unwrap();

    let fpath = make_archive(&request(tmp.path())).unwrap();
    let mut archive = Archive::open(&fpath).unwrap();
    let css = archive.get_item("style.css").unwrap();
    assert_eq!(css.mimetype, "text/css");
    assert_eq!(css.content, b"body { color: blue; }");
    assert_eq!(archive.entry_count(), 8);
}
