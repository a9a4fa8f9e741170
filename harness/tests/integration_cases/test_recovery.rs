// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use harness::Shard;
use seqno_checkpoint::{default_logger, NO_OPS_PERFORMED};

#[test]
fn test_single_copy_shard() {
    let mut shard = Shard::new("p", &default_logger());
    assert!(shard.sync());
    assert_eq!(shard.tracker.get_checkpoint(), NO_OPS_PERFORMED);

    assert!(shard.index(10, &[]));
    assert_eq!(shard.tracker.get_checkpoint(), 9);
    assert_eq!(shard.checkpoint_on("p"), Some(9));
}

#[test]
fn test_recovering_copy_does_not_hold_back() {
    let mut shard = Shard::new("p", &default_logger());
    shard.index(5, &[]);
    shard.add_replica("r1");

    // r1 is still copying and does not count yet.
    assert!(shard.index(5, &["r1"]));
    assert!(shard.index(5, &["r1"]));
    assert_eq!(shard.tracker.get_checkpoint(), 14);

    shard.finish_recovery("r1");
    assert!(shard.index(1, &[]));
    assert_eq!(shard.tracker.get_checkpoint(), 15);
    assert_eq!(shard.checkpoint_on("r1"), Some(15));
}

#[test]
fn test_lagging_replica_pins_checkpoint_until_it_fails() {
    let mut shard = Shard::new("p", &default_logger());
    shard.add_replica("r1");
    shard.finish_recovery("r1");
    shard.index(3, &[]);
    assert_eq!(shard.tracker.get_checkpoint(), 2);

    assert!(!shard.index(10, &["r1"]));
    assert_eq!(shard.tracker.get_checkpoint(), 2);
    assert_eq!(shard.checkpoint_on("p"), Some(2));

    shard.fail("r1");
    assert!(shard.sync());
    assert_eq!(shard.tracker.get_checkpoint(), 12);
}

#[test]
fn test_relocation() {
    let mut shard = Shard::new("p", &default_logger());
    shard.add_replica("r1");
    shard.finish_recovery("r1");
    shard.index(4, &[]);

    shard.relocate("r1", "r1-moved");
    assert!(shard.tracker.membership().is_active(&"r1-moved".into()));
    assert!(!shard.tracker.membership().contains(&"r1".into()));
    assert_eq!(
        shard
            .tracker
            .get_local_checkpoint_for_allocation_id(&"r1-moved".into()),
        3
    );

    // A late report from the old copy is ignored.
    shard.tracker.update_local_checkpoint(&"r1".into(), 100);
    assert!(shard.index(2, &[]));
    assert_eq!(shard.tracker.get_checkpoint(), 5);
}

#[test]
fn test_out_of_order_reports() {
    let mut rng = rand::thread_rng();
    let mut shard = Shard::new("p", &default_logger());
    shard.add_replica("r1");
    shard.add_replica("r2");
    shard.finish_recovery("r1");
    shard.finish_recovery("r2");

    for round in 0..20 {
        let before = shard.tracker.get_checkpoint();
        shard.index_out_of_order(&mut rng, 7);
        assert_eq!(shard.tracker.get_checkpoint(), shard.max_seq_no(), "round {}", round);
        assert!(shard.tracker.get_checkpoint() > before);
        for id in &["p", "r1", "r2"] {
            assert_eq!(shard.checkpoint_on(id), Some(shard.max_seq_no()));
        }
    }
}
