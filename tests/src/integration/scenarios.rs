//! # Protocol Scenarios
//!
//! Named protocol situations replayed through the full node:
//!
//! - a key revealed twice across transactions
//! - a batch made only of deactivations
//! - a writer that exceeds the unlocked allowance

#[cfg(test)]
mod tests {
    use crate::node::{add_service, TestNode};
    use shared_types::ports::{ContentAddressableStore, OperationStore};
    use shared_types::{OperationType, ProtocolParameters};
    use st_01_operations::{create_request, deactivate_request, update_request, KeySet};
    use st_02_anchor_files::{AnchoredDataSerializer, CoreIndexFile};
    use st_03_fee_manager::FeeManager;

    #[tokio::test]
    async fn test_key_revealed_twice_applies_once() {
        let node = TestNode::new(ProtocolParameters::for_testing());
        let params = node.params.clone();
        let (k0, k1, k2) = (KeySet::from_seed(1), KeySet::from_seed(2), KeySet::from_seed(3));
        let create = create_request(&k0, vec![], &params).unwrap();
        let suffix = create.did_unique_suffix.clone();
        node.publish(&[&create]).await;

        let first = update_request(&suffix, &k0, &k1, vec![add_service("first")], &params).unwrap();
        node.publish(&[&first]).await;
        let second =
            update_request(&suffix, &k0, &k2, vec![add_service("second")], &params).unwrap();
        node.publish(&[&second]).await;

        let state = node.resolve(&suffix).await.unwrap();
        assert_eq!(state.last_operation_transaction_number, 2);
        assert!(state.document.service("first").is_some());
        assert!(state.document.service("second").is_none());
        assert_eq!(
            state.next_update_commitment_hash,
            Some(k1.update_commitment(&params).unwrap())
        );

        let mut stored = node.operation_store.get(&suffix).await.unwrap();
        assert_eq!(stored.len(), 3);
        for _ in 0..stored.len() {
            stored.rotate_left(1);
            assert_eq!(node.resolver.resolve_operations(&stored), Some(state.clone()));
        }
        stored.reverse();
        assert_eq!(node.resolver.resolve_operations(&stored), Some(state));
    }

    #[tokio::test]
    async fn test_deactivate_only_batch_omits_provisional_index() {
        let node = TestNode::new(ProtocolParameters::for_testing());
        let keys = KeySet::from_seed(7);
        let create = create_request(&keys, vec![add_service("home")], &node.params).unwrap();
        let suffix = create.did_unique_suffix.clone();
        node.publish(&[&create]).await;

        let deactivate = deactivate_request(&suffix, &keys, &node.params).unwrap();
        let summary = node.publish(&[&deactivate]).await;
        assert_eq!(summary.processed, 1);

        let transactions = node.transactions();
        let anchored =
            AnchoredDataSerializer::deserialize(&transactions[1].anchor_string, &node.params)
                .unwrap();
        let bytes = node.cas.get(&anchored.core_index_file_uri).unwrap();
        let core_index = CoreIndexFile::parse(&bytes, &node.params).unwrap();
        assert!(core_index.model.provisional_index_file_uri.is_none());
        assert!(core_index.model.core_proof_file_uri.is_some());
        assert_eq!(
            core_index.deactivate_did_suffixes().collect::<Vec<_>>(),
            vec![suffix.as_str()]
        );

        let stored = node.operation_store.get(&suffix).await.unwrap();
        assert_eq!(stored[1].operation_type, OperationType::Deactivate);
        let state = node.resolve(&suffix).await.unwrap();
        assert!(state.is_deactivated());
        assert_eq!(state.last_operation_transaction_number, 2);
    }

    #[tokio::test]
    async fn test_oversized_unlocked_batch_is_rejected() {
        let params = ProtocolParameters {
            max_number_of_operations_for_no_value_time_lock: 2,
            ..ProtocolParameters::for_testing()
        };
        // The writer builds batches under the network allowance; the observer
        // enforces a tighter one.
        let writer = TestNode::new(ProtocolParameters::for_testing());
        let observer = TestNode::new(params);

        let creates: Vec<_> = (1..=3)
            .map(|seed| create_request(&KeySet::from_seed(seed), vec![], &writer.params).unwrap())
            .collect();
        for create in &creates {
            writer.submit(create).await.unwrap();
        }
        assert_eq!(writer.anchor().await.unwrap(), 3);

        for file in writer.cas.files() {
            observer.cas.write(file).await.unwrap();
        }
        let transactions = writer.mine();
        let summary = observer
            .observer
            .process_transactions(&transactions)
            .await
            .unwrap();
        assert_eq!(summary.invalid, 1);
        assert!(observer.operation_store.is_empty());
    }

    #[test]
    fn test_minimum_fee_never_below_normalized_fee() {
        let fees = FeeManager::new(&ProtocolParameters::default());
        for (normalized_fee, operations) in [(1, 1), (1_000, 1), (1_000, 99), (1_000, 5_000)] {
            let fee = fees
                .compute_minimum_transaction_fee(normalized_fee, operations)
                .unwrap();
            assert!(fee >= normalized_fee);
        }
        assert_eq!(fees.compute_minimum_transaction_fee(1_000, 5_000).unwrap(), 50_000);
    }
}
