//! Command interpreter over the pool-backed quadtree and the name index.
//!
//! One command per line:
//!
//! ```text
//! insert x y name
//! remove x y
//! remove name
//! find name
//! search x y radius
//! debug
//! makenull
//! ```
//!
//! The interpreter owns the spatial index and the secondary name index
//! and keeps the two consistent: the quadtree is keyed by point, the
//! name index resolves name-based commands to points. Coordinates are
//! validated against the tree domain before any structure is touched.

use quadpool::{MemoryPool, NameIndex, PageStore, PointRecord, RecordStore, StoreError};
use quadpool_spatial::{QuadTree, TreeError, MAX_COORD};

/// Pool capacity used when none is given on the command line.
pub const DEFAULT_POOL_BYTES: usize = 64 * 1024;

/// Executes record commands against a quadtree and a name index.
pub struct Interpreter<S: PageStore> {
    tree: QuadTree<S>,
    names: NameIndex,
}

impl Interpreter<MemoryPool> {
    /// An interpreter over a fresh in-memory pool.
    pub fn in_memory(capacity: usize) -> Self {
        Interpreter::new(RecordStore::new(MemoryPool::new(capacity)))
    }
}

impl<S: PageStore> Interpreter<S> {
    pub fn new(store: RecordStore<S>) -> Self {
        Interpreter {
            tree: QuadTree::new(store),
            names: NameIndex::new(),
        }
    }

    pub fn tree(&self) -> &QuadTree<S> {
        &self.tree
    }

    pub fn names(&self) -> &NameIndex {
        &self.names
    }

    /// Execute one command line. Returns `None` for blank lines,
    /// otherwise the printable result.
    pub fn execute(&mut self, line: &str) -> Option<String> {
        let mut tokens = line.split_whitespace();
        let command = tokens.next()?;
        let args: Vec<&str> = tokens.collect();

        let output = match command.to_ascii_lowercase().as_str() {
            "insert" => self.insert(&args),
            "remove" => self.remove(&args),
            "find" => self.find(&args),
            "search" => self.search(&args),
            "debug" => self.debug(),
            "makenull" => self.makenull(),
            _ => format!("Invalid command '{command}'"),
        };
        Some(output)
    }

    fn insert(&mut self, args: &[&str]) -> String {
        let [x, y, name] = args else {
            return "Insert commands must be in the form 'insert x y name'".into();
        };
        let (Ok(x), Ok(y)) = (x.parse::<i32>(), y.parse::<i32>()) else {
            return "Insert commands must be in the form 'insert x y name'".into();
        };
        if !in_domain(x, y) {
            return "Insert failed: coordinates are out of bounds".into();
        }

        match self.tree.insert(&PointRecord::new(x, y, *name)) {
            Ok(_) => {
                self.names.insert(name, x, y);
                format!("Inserted {name} at ({x}, {y})")
            }
            Err(TreeError::DuplicatePoint { .. }) => {
                format!("Insert failed: a record at ({x}, {y}) already exists")
            }
            Err(TreeError::Store(StoreError::OutOfSpace { .. })) => {
                "Insert failed: the pool is out of space".into()
            }
            Err(TreeError::Store(StoreError::RecordTooLarge { .. })) => {
                "Insert failed: the name is too long".into()
            }
            Err(e) => {
                log::error!("insert {name} at ({x}, {y}): {e}");
                format!("Insert failed: {e}")
            }
        }
    }

    fn remove(&mut self, args: &[&str]) -> String {
        match args {
            [x, y] => {
                let (Ok(x), Ok(y)) = (x.parse::<i32>(), y.parse::<i32>()) else {
                    return "Remove commands must be in the form 'remove x y' or 'remove name'"
                        .into();
                };
                if !in_domain(x, y) {
                    return "Remove failed: coordinates are out of bounds".into();
                }
                self.remove_point(x, y)
            }
            [name] => {
                let Some(&(x, y)) = self.names.find(name).first() else {
                    return format!("Remove failed: no record named '{name}'");
                };
                self.remove_point(x, y)
            }
            _ => "Remove commands must be in the form 'remove x y' or 'remove name'".into(),
        }
    }

    fn remove_point(&mut self, x: i32, y: i32) -> String {
        match self.tree.remove(x, y) {
            Ok(record) => {
                if !self.names.remove_entry(record.name(), x, y) {
                    log::warn!("name index had no entry for {record}");
                }
                format!("Removed {} at ({x}, {y})", record.name())
            }
            Err(TreeError::PointNotFound { .. }) => {
                format!("Remove failed: no record at ({x}, {y})")
            }
            Err(e) => {
                log::error!("remove at ({x}, {y}): {e}");
                format!("Remove failed: {e}")
            }
        }
    }

    fn find(&self, args: &[&str]) -> String {
        let [name] = args else {
            return "Find commands must be in the form 'find name'".into();
        };
        let matches = self.names.find(name);
        if matches.is_empty() {
            return format!("No records named '{name}'");
        }
        matches
            .iter()
            .map(|&(x, y)| format!("Found {name} at ({x}, {y})"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn search(&mut self, args: &[&str]) -> String {
        let [x, y, radius] = args else {
            return "Search commands must be in the form 'search x y radius'".into();
        };
        let (Ok(x), Ok(y), Ok(radius)) =
            (x.parse::<i32>(), y.parse::<i32>(), radius.parse::<i32>())
        else {
            return "Search commands must be in the form 'search x y radius'".into();
        };
        if !in_domain(x, y) {
            return "Search failed: coordinates are out of bounds".into();
        }
        if radius < 0 || radius >= MAX_COORD {
            return "Search failed: the radius is out of range".into();
        }

        match self.tree.search(x, y, radius) {
            Ok(hits) => {
                let mut lines = vec![format!("Searched {} nodes", self.tree.last_search_visits())];
                if hits.is_empty() {
                    lines.push(format!("No records within {radius} units of ({x}, {y})"));
                } else {
                    for record in &hits {
                        lines.push(format!(
                            "Found {} at ({}, {})",
                            record.name(),
                            record.x(),
                            record.y()
                        ));
                    }
                }
                lines.join("\n")
            }
            Err(e) => {
                log::error!("search at ({x}, {y}) radius {radius}: {e}");
                format!("Search failed: {e}")
            }
        }
    }

    fn debug(&self) -> String {
        match self.tree.render() {
            Ok(rendered) => format!("{rendered}\n{}", self.tree.store().free_list()),
            Err(e) => format!("Debug failed: {e}"),
        }
    }

    fn makenull(&mut self) -> String {
        if let Err(e) = self.tree.clear() {
            log::error!("makenull: {e}");
            return format!("Makenull failed: {e}");
        }
        self.names.clear();
        "Storage is now empty".into()
    }
}

fn in_domain(x: i32, y: i32) -> bool {
    (0..=MAX_COORD).contains(&x) && (0..=MAX_COORD).contains(&y)
}
