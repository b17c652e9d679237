//! End-to-end command tests over a file-backed pool.

use quadpool::{FilePool, RecordStore};
use quadpool_shell::Interpreter;
use tempfile::tempdir;

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn commands_run_against_a_pool_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.pool");
    let pool = FilePool::create(&path, 32 * 1024).unwrap();
    let mut shell = Interpreter::new(RecordStore::new(pool));

    assert_eq!(
        shell.execute("insert 250 8100 lighthouse").unwrap(),
        "Inserted lighthouse at (250, 8100)"
    );
    assert_eq!(
        shell.execute("search 250 8100 0").unwrap(),
        "Searched 1 nodes\nFound lighthouse at (250, 8100)"
    );

    // The record bytes really live in the pool file.
    let bytes = std::fs::read(&path).unwrap();
    assert!(contains_subslice(&bytes, b"lighthouse"));

    assert_eq!(
        shell.execute("remove lighthouse").unwrap(),
        "Removed lighthouse at (250, 8100)"
    );
    assert_eq!(
        shell.execute("find lighthouse").unwrap(),
        "No records named 'lighthouse'"
    );
}

#[test]
fn splits_and_merges_work_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.pool");
    let pool = FilePool::create(&path, 32 * 1024).unwrap();
    let mut shell = Interpreter::new(RecordStore::new(pool));

    let corners = [
        (0, 0, "nw"),
        (16383, 0, "ne"),
        (0, 16383, "sw"),
        (16383, 16383, "se"),
    ];
    for (x, y, name) in corners {
        shell.execute(&format!("insert {x} {y} {name}")).unwrap();
    }

    // Four corners split into one leaf per quadrant: five nodes visited
    // by a whole-domain search.
    let output = shell.execute("search 8192 8192 16382").unwrap();
    assert!(output.starts_with("Searched 5 nodes"));
    for (_, _, name) in corners {
        assert!(output.contains(name), "{name} missing from {output}");
    }

    for (x, y, _) in corners {
        assert!(shell
            .execute(&format!("remove {x} {y}"))
            .unwrap()
            .starts_with("Removed"));
    }
    assert!(shell.tree().is_empty());
    assert_eq!(
        shell.tree().store().free_list().free_bytes(),
        32 * 1024
    );
}
