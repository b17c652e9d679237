//! End-to-end command tests over an in-memory pool.

use quadpool_shell::{Interpreter, DEFAULT_POOL_BYTES};

fn shell() -> Interpreter<quadpool::MemoryPool> {
    Interpreter::in_memory(DEFAULT_POOL_BYTES)
}

fn run(shell: &mut Interpreter<quadpool::MemoryPool>, line: &str) -> String {
    shell
        .execute(line)
        .unwrap_or_else(|| panic!("no output for '{line}'"))
}

#[test]
fn insert_find_search_remove_lifecycle() {
    let mut shell = shell();

    assert_eq!(
        run(&mut shell, "insert 100 200 depot"),
        "Inserted depot at (100, 200)"
    );
    assert_eq!(
        run(&mut shell, "insert 4000 4000 mill"),
        "Inserted mill at (4000, 4000)"
    );

    assert_eq!(run(&mut shell, "find depot"), "Found depot at (100, 200)");

    // Two records in one root leaf: a single visited node.
    assert_eq!(
        run(&mut shell, "search 90 190 25"),
        "Searched 1 nodes\nFound depot at (100, 200)"
    );

    assert_eq!(
        run(&mut shell, "remove 100 200"),
        "Removed depot at (100, 200)"
    );
    assert_eq!(run(&mut shell, "find depot"), "No records named 'depot'");
    assert_eq!(run(&mut shell, "remove mill"), "Removed mill at (4000, 4000)");
    assert!(shell.tree().is_empty());
    assert!(shell.names().is_empty());
}

#[test]
fn duplicate_points_are_rejected_and_index_stays_consistent() {
    let mut shell = shell();
    run(&mut shell, "insert 7 7 original");
    assert_eq!(
        run(&mut shell, "insert 7 7 pretender"),
        "Insert failed: a record at (7, 7) already exists"
    );
    assert_eq!(
        run(&mut shell, "find pretender"),
        "No records named 'pretender'"
    );
    assert_eq!(run(&mut shell, "find original"), "Found original at (7, 7)");
}

#[test]
fn duplicate_names_find_all_and_remove_one() {
    let mut shell = shell();
    run(&mut shell, "insert 10 10 twin");
    run(&mut shell, "insert 20 20 twin");

    assert_eq!(
        run(&mut shell, "find twin"),
        "Found twin at (10, 10)\nFound twin at (20, 20)"
    );

    // Removing by name takes the earliest-recorded entry only.
    assert_eq!(run(&mut shell, "remove twin"), "Removed twin at (10, 10)");
    assert_eq!(run(&mut shell, "find twin"), "Found twin at (20, 20)");
    assert_eq!(
        run(&mut shell, "remove twin"),
        "Removed twin at (20, 20)"
    );
    assert_eq!(
        run(&mut shell, "remove twin"),
        "Remove failed: no record named 'twin'"
    );
}

#[test]
fn coordinates_are_validated_before_any_mutation() {
    let mut shell = shell();
    assert_eq!(
        run(&mut shell, "insert 20000 5 nowhere"),
        "Insert failed: coordinates are out of bounds"
    );
    assert_eq!(
        run(&mut shell, "insert -1 5 nowhere"),
        "Insert failed: coordinates are out of bounds"
    );
    assert_eq!(
        run(&mut shell, "remove 16384 0"),
        "Remove failed: coordinates are out of bounds"
    );
    assert!(shell.tree().is_empty());
    assert!(shell.names().is_empty());
}

#[test]
fn search_parameters_are_validated() {
    let mut shell = shell();
    run(&mut shell, "insert 5 5 here");

    assert_eq!(
        run(&mut shell, "search -5 5 10"),
        "Search failed: coordinates are out of bounds"
    );
    assert_eq!(
        run(&mut shell, "search 5 5 -1"),
        "Search failed: the radius is out of range"
    );
    assert_eq!(
        run(&mut shell, "search 5 5 16383"),
        "Search failed: the radius is out of range"
    );
    assert_eq!(
        run(&mut shell, "search 5 5 16382"),
        "Searched 1 nodes\nFound here at (5, 5)"
    );
}

#[test]
fn fruitless_searches_say_so() {
    let mut shell = shell();
    run(&mut shell, "insert 1000 1000 lonely");
    assert_eq!(
        run(&mut shell, "search 9000 9000 50"),
        "Searched 1 nodes\nNo records within 50 units of (9000, 9000)"
    );
}

#[test]
fn removing_an_absent_point_reports_failure() {
    let mut shell = shell();
    run(&mut shell, "insert 40 40 keeper");
    assert_eq!(
        run(&mut shell, "remove 999 999"),
        "Remove failed: no record at (999, 999)"
    );
    assert_eq!(run(&mut shell, "find keeper"), "Found keeper at (40, 40)");
}

#[test]
fn debug_prints_structure_and_free_list() {
    let mut shell = shell();
    run(&mut shell, "insert 10 20 origin");

    let output = run(&mut shell, "debug");
    let mut lines = output.lines();
    assert_eq!(lines.next(), Some("10,20,origin;|"));
    assert_eq!(lines.next(), Some("Freelist:"));
    assert!(lines.next().unwrap().contains("bytes"));
}

#[test]
fn makenull_empties_tree_pool_and_names() {
    let mut shell = shell();
    for line in [
        "insert 1 1 a",
        "insert 2 2 b",
        "insert 3 3 c",
        "insert 4 4 d",
        "insert 12000 9000 e",
    ] {
        run(&mut shell, line);
    }

    assert_eq!(run(&mut shell, "makenull"), "Storage is now empty");
    assert_eq!(run(&mut shell, "find a"), "No records named 'a'");
    assert_eq!(
        run(&mut shell, "search 1 1 100"),
        "Searched 1 nodes\nNo records within 100 units of (1, 1)"
    );

    // Every pool byte is reclaimable again.
    let free = shell.tree().store().free_list();
    assert_eq!(free.free_bytes(), DEFAULT_POOL_BYTES);
    assert_eq!(free.blocks().len(), 1);
}

#[test]
fn deep_structures_survive_a_command_storm() {
    let mut shell = shell();
    let points: Vec<(i32, i32)> = (0..60)
        .map(|i| ((i * 577) % 16384, (i * 991) % 16384))
        .collect();

    for &(x, y) in &points {
        assert!(run(&mut shell, &format!("insert {x} {y} n{x}_{y}")).starts_with("Inserted"));
    }
    for &(x, y) in &points {
        assert_eq!(
            run(&mut shell, &format!("remove {x} {y}")),
            format!("Removed n{x}_{y} at ({x}, {y})")
        );
    }
    assert!(shell.tree().is_empty());
    assert_eq!(
        shell.tree().store().free_list().free_bytes(),
        DEFAULT_POOL_BYTES
    );
}
