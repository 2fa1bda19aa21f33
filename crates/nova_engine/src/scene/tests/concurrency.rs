//! Concurrent hierarchy mutation under snapshot-based traversal

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::scene::entity::{Entity, EntityRef};
use crate::scene::search::{find_all, SearchFilter};

#[test]
fn test_concurrent_edits_never_corrupt_traversal() {
    let root = Entity::new("root");
    let stable: Vec<EntityRef> = (0..8)
        .map(|i| {
            let child = Entity::new(format!("stable-{i}"));
            root.add_child(&child);
            child
        })
        .collect();
    let churn: Vec<EntityRef> = (0..8).map(|i| Entity::new(format!("churn-{i}"))).collect();

    let stop = Arc::new(AtomicBool::new(false));
    let mut workers = Vec::new();
    for chunk in churn.chunks(2) {
        let root = Arc::clone(&root);
        let mine: Vec<EntityRef> = chunk.to_vec();
        let stop = Arc::clone(&stop);
        workers.push(thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                for child in &mine {
                    root.add_child(child);
                }
                for child in &mine {
                    root.remove_child(child);
                }
            }
        }));
    }

    // Traverse while the writers churn: every snapshot must be duplicate
    // free and contain at least the stable children.
    for _ in 0..500 {
        let found = find_all(&root, &SearchFilter::any());
        let mut seen = HashSet::new();
        for entity in &found {
            assert!(seen.insert(entity.id()), "duplicate entry in traversal");
        }
        for child in &stable {
            assert!(seen.contains(&child.id()), "stable child missing");
        }
    }

    stop.store(true, Ordering::SeqCst);
    for worker in workers {
        worker.join().unwrap();
    }

    // Quiesced: each churn child is either attached exactly once or gone.
    let final_children = root.children();
    let mut counts = HashSet::new();
    for child in &final_children {
        assert!(counts.insert(child.id()), "duplicate child after churn");
    }
}

#[test]
fn test_concurrent_reparenting_keeps_backrefs_consistent() {
    let left = Entity::new("left");
    let right = Entity::new("right");
    let child = Entity::new("contested");

    let mut workers = Vec::new();
    for target in [Arc::clone(&left), Arc::clone(&right)] {
        let child = Arc::clone(&child);
        workers.push(thread::spawn(move || {
            for _ in 0..200 {
                target.add_child(&child);
            }
        }));
    }
    for worker in workers {
        worker.join().unwrap();
    }

    // The child ends under exactly one parent, and that parent's list
    // contains it exactly once.
    let parent = child.parent().unwrap();
    let holders = [&left, &right]
        .iter()
        .filter(|p| p.children().iter().any(|c| Arc::ptr_eq(c, &child)))
        .count();
    assert_eq!(holders, 1);
    assert!(Arc::ptr_eq(&parent, &left) || Arc::ptr_eq(&parent, &right));
    assert!(parent.children().iter().any(|c| Arc::ptr_eq(c, &child)));
}
