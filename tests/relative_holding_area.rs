//! Changes the process working directory, so it lives alone in this binary.

use std::env;
use std::fs;
use std::io;

use delete_core::prelude::*;
use delete_core::{RestoreResolver, RestoreTarget, TrashEngine};
use tempfile::TempDir;

#[test]
fn relative_holding_area_behaves_like_absolute() {
    let temp = TempDir::new().unwrap();
    let previous = env::current_dir().unwrap();
    env::set_current_dir(temp.path()).unwrap();
    let cwd = env::current_dir().unwrap();

    let settings = Settings::new("./.Trash", "./.Trash.db");
    let notifier = MemoryNotifier::new();
    let mut session = Session::open(&settings, &notifier).unwrap();
    assert_eq!(session.holding_area().path(), cwd.join(".Trash"));

    fs::write("a.txt", "alpha").unwrap();
    assert_eq!(session.run(&Action::Put(vec!["a.txt".into()]), &mut io::sink()), ExitStatusLike::Ok);
    let full = cwd.join(".Trash/a.txt").display().to_string();
    assert_eq!(session.run(&Action::Restore(vec![full]), &mut io::sink()), ExitStatusLike::Ok);
    assert_eq!(fs::read_to_string(cwd.join("a.txt")).unwrap(), "alpha");
    session.close().unwrap();

    let holding = HoldingArea::new("./.Trash").unwrap();
    let mut catalog = SqliteCatalog::open_in_memory().unwrap();
    TrashEngine::new(&holding, &RealFileSystem, &mut catalog, &notifier)
        .move_to_trash("a.txt".as_ref())
        .unwrap();

    let err = TrashEngine::new(&holding, &RealFileSystem, &mut catalog, &notifier)
        .move_to_trash("./.Trash".as_ref())
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidPath(_)));

    let resolver = RestoreResolver::new(&holding, &RealFileSystem, &mut catalog, &notifier);
    assert_eq!(
        resolver.classify("a.txt").unwrap(),
        RestoreTarget::TrashRelative(cwd.join(".Trash/a.txt"))
    );

    env::set_current_dir(previous).unwrap();
}
