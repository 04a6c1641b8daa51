use avl_bst::{AvlTree, Bst, KeyBound};

fn main() {
    let mut tree = AvlTree::new();
    tree.insert(0, "zero");
    tree.insert(1, "one");
    tree.insert(2, "two");
    tree.insert(2, "two");
    tree.insert(3, "three");
    tree.insert(4, "four");
    tree.insert(5, "five");
    assert_eq!(tree.get(&1).map(|node| *node.value()), Ok("one"));
    tree.delete(&1);
    assert!(tree.get(&1).is_err());
    println!("{tree:?}");
    println!(
        "len: {}, inserts: {}, height: {}",
        tree.len(),
        tree.insert_count(),
        tree.height()
    );

    let empty = Bst::<i32, ()>::new();
    assert_eq!(empty.max_key(), KeyBound::NegInfinity);
    assert_eq!(empty.min_key(), KeyBound::PosInfinity);
}
