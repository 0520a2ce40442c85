use praxos_fifo::Fifo;

#[test]
fn pops_in_push_order() {
    let mut q: Fifo<u32, 8> = Fifo::new();
    for v in [3, 1, 4, 1, 5] {
        q.push(v).unwrap();
    }
    assert_eq!(q.len(), 5);

    let drained: Vec<u32> = std::iter::from_fn(|| q.pop()).collect();
    assert_eq!(drained, [3, 1, 4, 1, 5]);
    assert!(q.is_empty());
}

#[test]
fn pop_on_empty_returns_none() {
    let mut q: Fifo<u8, 2> = Fifo::new();
    assert_eq!(q.pop(), None);

    // Still none after a push/pop round trip.
    q.push(9).unwrap();
    assert_eq!(q.pop(), Some(9));
    assert_eq!(q.pop(), None);
}

#[test]
fn push_on_full_hands_the_value_back() {
    let mut q: Fifo<&str, 2> = Fifo::new();
    q.push("a").unwrap();
    q.push("b").unwrap();
    assert!(q.is_full());

    // The rejected value must come back unchanged.
    assert_eq!(q.push("c"), Err("c"));
    assert_eq!(q.len(), 2);
    assert_eq!(q.pop(), Some("a"));
}

#[test]
fn ring_wraps_around_cleanly() {
    let mut q: Fifo<u32, 3> = Fifo::new();

    // Cycle enough times that head and tail lap the array repeatedly.
    for round in 0..10 {
        q.push(round).unwrap();
        q.push(round + 100).unwrap();
        assert_eq!(q.pop(), Some(round));
        assert_eq!(q.pop(), Some(round + 100));
    }
    assert!(q.is_empty());
}

#[test]
fn interleaved_push_pop_preserves_order_across_wrap() {
    let mut q: Fifo<u32, 4> = Fifo::new();
    q.push(1).unwrap();
    q.push(2).unwrap();
    assert_eq!(q.pop(), Some(1));
    q.push(3).unwrap();
    q.push(4).unwrap();
    q.push(5).unwrap(); // tail has wrapped past the array end here
    assert!(q.is_full());

    let drained: Vec<u32> = std::iter::from_fn(|| q.pop()).collect();
    assert_eq!(drained, [2, 3, 4, 5]);
}

#[test]
fn clear_empties_and_allows_reuse() {
    let mut q: Fifo<String, 3> = Fifo::new();
    q.push("x".into()).unwrap();
    q.push("y".into()).unwrap();
    q.clear();
    assert!(q.is_empty());
    assert_eq!(q.pop(), None);

    q.push("z".into()).unwrap();
    assert_eq!(q.pop(), Some("z".into()));
}

#[test]
fn iter_walks_oldest_to_newest() {
    let mut q: Fifo<u32, 3> = Fifo::new();
    q.push(10).unwrap();
    q.push(20).unwrap();
    assert_eq!(q.pop(), Some(10));
    q.push(30).unwrap();
    q.push(40).unwrap(); // wrapped

    let seen: Vec<u32> = q.iter().copied().collect();
    assert_eq!(seen, [20, 30, 40]);

    // Iteration must not consume.
    assert_eq!(q.len(), 3);
    assert_eq!(q.pop(), Some(20));
}

#[test]
fn zero_capacity_queue_rejects_everything() {
    let mut q: Fifo<u32, 0> = Fifo::new();
    assert!(q.is_empty());
    assert!(q.is_full());
    assert_eq!(q.push(1), Err(1));
    assert_eq!(q.pop(), None);
}
