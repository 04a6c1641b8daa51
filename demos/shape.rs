use avl_bst::{AvlTree, Balance, Bst, NodeRef, Tree};

fn print_sideways<B: Balance>(node: Option<NodeRef<'_, i32, (), B>>, level: usize) {
    if let Some(node) = node {
        print_sideways(node.right(), level + 1);
        println!("{}{} (bf {})", "    ".repeat(level), node.key(), node.balance_factor());
        print_sideways(node.left(), level + 1);
    }
}

fn show<B: Balance>(name: &str, tree: &Tree<i32, (), B>) {
    println!("{name}, height {}:", tree.height());
    print_sideways(tree.root(), 0);
    println!();
}

fn main() {
    let keys = 1..=7;
    let bst: Bst<i32, ()> = keys.clone().map(|key| (key, ())).collect();
    let avl: AvlTree<i32, ()> = keys.map(|key| (key, ())).collect();
    show("Plain BST from sorted input", &bst);
    show("AVL tree from sorted input", &avl);
}
