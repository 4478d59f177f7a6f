#![allow(unused_macros)]

/// Helper macro for reading locked items
///
/// ```rust, ignore
///  let relations = read_lock!(spec_relations);
///  println!("{:?}", relations.base);
/// ```
macro_rules! read_lock {
    ($arc_rwlock:expr) => {
        $arc_rwlock.read().expect("Failed to acquire read lock")
    };
}

/// Helper macro for writing to locked items
///
/// ```rust, ignore
///  let mut relations = write_lock!(spec_relations);
///  *relations = Arc::new(TypeRelations::default());
/// ```
macro_rules! write_lock {
    ($arc_rwlock:expr) => {
        $arc_rwlock.write().expect("Failed to acquire write lock")
    };
}
