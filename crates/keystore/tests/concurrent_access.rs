//! Concurrent use of the key registry store from many threads.

use rayon::prelude::*;
use shardline_keystore::{CertificateLoader, KeyRegistryStore};
use shardline_test_helpers::{write_certificate_bundle, TestCommittee};
use shardline_types::{
    BlsScheme, CommitteeBitmap, ShardGroupId, StaticShardTopology, ValidatorId,
};
use std::collections::BTreeMap;

const COMMITTEE_SIZE: usize = 32;

fn make_topology() -> StaticShardTopology {
    StaticShardTopology::new().with_root(
        ShardGroupId(1),
        [ShardGroupId(1001), ShardGroupId(1002), ShardGroupId(1003)],
    )
}

#[test]
fn concurrent_adds_over_disjoint_ids_are_all_visible() {
    let scheme = BlsScheme::default();
    let store = KeyRegistryStore::new(&make_topology(), scheme, CertificateLoader::new("unused"));
    let committee = TestCommittee::generate(0, COMMITTEE_SIZE, 21);

    let encoded: Vec<_> = (0..COMMITTEE_SIZE)
        .map(|p| committee.encoded_key(p, &scheme))
        .collect();

    let inserted: usize = (0..COMMITTEE_SIZE)
        .into_par_iter()
        .map(|position| {
            store
                .add_pub_key(
                    ShardGroupId(1001),
                    committee.validator_id(position),
                    &encoded[position],
                )
                .map(usize::from)
                .unwrap()
        })
        .sum();

    assert_eq!(inserted, COMMITTEE_SIZE);
    for (id, key) in committee.members() {
        assert_eq!(store.get_pub_key(ShardGroupId(1001), id), Some(key));
    }

    let all: Vec<_> = (0..COMMITTEE_SIZE).collect();
    assert_eq!(
        store.get_aggregate_pub_key(ShardGroupId(1001), &committee.bitmap(&all), 0),
        Some(committee.aggregate_key(&all))
    );
}

#[test]
fn concurrent_adds_create_each_new_shard_once() {
    let scheme = BlsScheme::default();
    let store = KeyRegistryStore::new(&make_topology(), scheme, CertificateLoader::new("unused"));
    let committee = TestCommittee::generate(0, 8, 4);

    (0..64usize).into_par_iter().for_each(|i| {
        let shard = ShardGroupId(5000 + (i % 4) as u64);
        let position = i % 8;
        store
            .add_pub_key(
                shard,
                committee.validator_id(position),
                &committee.encoded_key(position, &scheme),
            )
            .unwrap();
    });

    // beacon, one root, three children, four new shards
    assert_eq!(store.registry_count(), 9);
    for shard in 5000..5004 {
        let bitmap = CommitteeBitmap::from_positions(8, 0..8);
        let aggregate = store
            .get_aggregate_pub_key(ShardGroupId(shard), &bitmap, 0)
            .unwrap();
        assert_eq!(aggregate.signers(), 8);
    }
}

#[test]
fn aggregation_runs_alongside_reset() {
    let dir = tempfile::tempdir().unwrap();
    let scheme = BlsScheme::default();
    let committee = TestCommittee::generate(0, 16, 8);
    let path = write_certificate_bundle(dir.path(), &committee.bundle_entries(&scheme));
    let store = KeyRegistryStore::new(&make_topology(), scheme, CertificateLoader::new(path));

    let ids: Vec<_> = (0..16).map(ValidatorId).collect();
    let request = BTreeMap::from([(ShardGroupId(1002), ids)]);
    let positions: Vec<_> = (0..16).collect();
    let bitmap = committee.bitmap(&positions);
    let expected = committee.aggregate_key(&positions);

    rayon::join(
        || {
            let summary = store.reset(&request);
            assert_eq!(summary.total_refreshed(), 16);
        },
        || {
            for _ in 0..20 {
                let aggregate = store
                    .get_aggregate_pub_key(ShardGroupId(1002), &bitmap, 0)
                    .unwrap();
                // Reset holds the registry lock throughout, so readers see
                // either none or all of the refreshed keys.
                assert!(aggregate.is_identity() || aggregate == expected);
            }
        },
    );

    assert_eq!(
        store.get_aggregate_pub_key(ShardGroupId(1002), &bitmap, 0),
        Some(expected)
    );
}
