//! # End-to-End Flows
//!
//! Operations submitted to the pool, anchored by the batch writer, observed
//! by the transaction processor, and resolved from the operation store.
//!
//! ## Flows Tested:
//!
//! 1. **Create → resolve**: published identifiers resolve with their document
//! 2. **Lifecycle**: update, recover, stale update, deactivate, late update
//! 3. **Back-pressure**: a batch waits until the previous anchor is buried
//! 4. **Retry**: unavailable files are retried until they resolve,
//!    and an anchor whose dequeue failed is re-anchored without effect
//! 5. **Reorg**: reverting drops operations anchored after the fork point

#[cfg(test)]
mod tests {
    use crate::node::{add_service, TestNode, GENESIS_TIME};
    use shared_types::ports::ConfirmationStore;
    use shared_types::{ErrorCode, ProtocolParameters};
    use st_04_batch_writer::BatchWriterError;
    use st_01_operations::{
        create_request, deactivate_request, long_form_did, recover_request, update_request,
        KeySet,
    };

    fn node() -> TestNode {
        TestNode::new(ProtocolParameters::for_testing())
    }

    // =============================================================================
    // CREATE AND UPDATE
    // =============================================================================

    #[tokio::test]
    async fn test_published_create_resolves() {
        let node = node();
        let keys = KeySet::from_seed(1);
        let create = create_request(&keys, vec![add_service("home")], &node.params).unwrap();

        let summary = node.publish(&[&create]).await;
        assert_eq!(summary.processed, 1);

        let state = node.resolve(&create.did_unique_suffix).await.unwrap();
        assert_eq!(state.last_operation_transaction_number, 1);
        assert!(state.document.service("home").is_some());
        assert_eq!(
            state.next_update_commitment_hash,
            Some(keys.update_commitment(&node.params).unwrap())
        );
        assert_eq!(
            state.next_recovery_commitment_hash,
            Some(keys.recovery_commitment(&node.params).unwrap())
        );
    }

    #[tokio::test]
    async fn test_published_update_applies_patches() {
        let node = node();
        let (k0, k1) = (KeySet::from_seed(1), KeySet::from_seed(2));
        let create = create_request(&k0, vec![add_service("home")], &node.params).unwrap();
        let suffix = create.did_unique_suffix.clone();
        node.publish(&[&create]).await;

        let update =
            update_request(&suffix, &k0, &k1, vec![add_service("blog")], &node.params).unwrap();
        node.publish(&[&update]).await;

        let state = node.resolve(&suffix).await.unwrap();
        assert_eq!(state.last_operation_transaction_number, 2);
        assert!(state.document.service("home").is_some());
        assert!(state.document.service("blog").is_some());
        assert_eq!(
            state.next_update_commitment_hash,
            Some(k1.update_commitment(&node.params).unwrap())
        );
    }

    #[tokio::test]
    async fn test_unknown_suffix_resolves_to_none() {
        let node = node();
        let create = create_request(&KeySet::from_seed(1), vec![], &node.params).unwrap();
        assert!(node.resolve(&create.did_unique_suffix).await.is_none());
    }

    // =============================================================================
    // FULL LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_identifier_lifecycle() {
        let node = node();
        let params = node.params.clone();
        let k: Vec<KeySet> = (10..14).map(KeySet::from_seed).collect();

        let create = create_request(&k[0], vec![add_service("a")], &params).unwrap();
        let suffix = create.did_unique_suffix.clone();
        node.publish(&[&create]).await;

        let update = update_request(&suffix, &k[0], &k[1], vec![add_service("b")], &params).unwrap();
        node.publish(&[&update]).await;

        let recover =
            recover_request(&suffix, &k[0], &k[2], vec![add_service("c")], &params).unwrap();
        node.publish(&[&recover]).await;

        let state = node.resolve(&suffix).await.unwrap();
        assert_eq!(state.last_operation_transaction_number, 3);
        assert!(state.document.service("a").is_none());
        assert!(state.document.service("b").is_none());
        assert!(state.document.service("c").is_some());
        assert_eq!(
            state.next_recovery_commitment_hash,
            Some(k[2].recovery_commitment(&params).unwrap())
        );

        let update = update_request(&suffix, &k[2], &k[3], vec![add_service("d")], &params).unwrap();
        node.publish(&[&update]).await;

        // Reveals an update key consumed before the recovery.
        let stale = update_request(&suffix, &k[1], &k[3], vec![add_service("x")], &params).unwrap();
        node.publish(&[&stale]).await;

        let state = node.resolve(&suffix).await.unwrap();
        assert_eq!(state.last_operation_transaction_number, 4);
        assert!(state.document.service("d").is_some());
        assert!(state.document.service("x").is_none());

        let deactivate = deactivate_request(&suffix, &k[2], &params).unwrap();
        node.publish(&[&deactivate]).await;

        let late = update_request(&suffix, &k[3], &k[0], vec![add_service("y")], &params).unwrap();
        node.publish(&[&late]).await;

        let state = node.resolve(&suffix).await.unwrap();
        assert!(state.is_deactivated());
        assert_eq!(state.last_operation_transaction_number, 6);
        assert_eq!(state.next_recovery_commitment_hash, None);
        assert_eq!(state.next_update_commitment_hash, None);
        assert!(state.document.services.is_empty());
    }

    #[tokio::test]
    async fn test_long_form_resolves_before_and_after_publication() {
        let node = node();
        let create =
            create_request(&KeySet::from_seed(3), vec![add_service("home")], &node.params).unwrap();
        let did = long_form_did(&create, &node.params).unwrap();

        let unpublished = node.resolver.resolve_long_form(&did).await.unwrap().unwrap();
        assert_eq!(unpublished.last_operation_transaction_number, 0);

        node.publish(&[&create]).await;
        let published = node.resolver.resolve_long_form(&did).await.unwrap().unwrap();
        assert_eq!(published.last_operation_transaction_number, 1);
        assert_eq!(published.document, unpublished.document);
    }

    // =============================================================================
    // BATCHING
    // =============================================================================

    #[tokio::test]
    async fn test_pool_rejects_second_operation_for_queued_identifier() {
        let node = node();
        let (k0, k1) = (KeySet::from_seed(1), KeySet::from_seed(2));
        let create = create_request(&k0, vec![], &node.params).unwrap();
        let update =
            update_request(&create.did_unique_suffix, &k0, &k1, vec![], &node.params).unwrap();

        node.submit(&create).await.unwrap();
        let err = node.submit(&update).await.unwrap_err();
        assert_eq!(
            err.code(),
            Some(ErrorCode::QueueingMultipleOperationsPerDidNotAllowed)
        );
        assert_eq!(node.queue.len(), 1);
    }

    #[tokio::test]
    async fn test_batch_capped_at_max_operations() {
        let params = ProtocolParameters {
            max_operations_per_batch: 2,
            ..ProtocolParameters::for_testing()
        };
        let node = TestNode::new(params);
        let creates: Vec<_> = (1..=3)
            .map(|seed| create_request(&KeySet::from_seed(seed), vec![], &node.params).unwrap())
            .collect();
        for create in &creates {
            node.submit(create).await.unwrap();
        }

        assert_eq!(node.anchor().await.unwrap(), 2);
        assert_eq!(node.queue.len(), 1);
        // chunk, provisional index, core index
        assert_eq!(node.cas.write_count(), 3);

        let summary = node.observe().await;
        assert_eq!(summary.processed, 1);
        assert_eq!(node.operation_store.len(), 2);
        assert!(node.resolve(&creates[0].did_unique_suffix).await.is_some());
        assert!(node.resolve(&creates[2].did_unique_suffix).await.is_none());
    }

    #[tokio::test]
    async fn test_next_batch_waits_for_confirmation_depth() {
        let node = node();
        let first = create_request(&KeySet::from_seed(1), vec![], &node.params).unwrap();
        let second = create_request(&KeySet::from_seed(2), vec![], &node.params).unwrap();

        node.submit(&first).await.unwrap();
        assert_eq!(node.anchor().await.unwrap(), 1);

        node.submit(&second).await.unwrap();
        assert_eq!(node.anchor().await.unwrap(), 0, "previous anchor unconfirmed");
        assert_eq!(node.blockchain.writes().len(), 1);

        node.observe().await;
        assert_eq!(node.anchor().await.unwrap(), 0, "confirmed in the current block");

        node.advance_blocks(node.params.min_confirmations_before_next_write - 1);
        assert_eq!(node.anchor().await.unwrap(), 0, "one block short");

        node.advance_blocks(1);
        assert_eq!(node.anchor().await.unwrap(), 1);
        assert!(node.queue.is_empty());
    }

    // =============================================================================
    // FAILURES
    // =============================================================================

    #[tokio::test]
    async fn test_unavailable_files_resolve_after_retry() {
        let node = node();
        let create = create_request(&KeySet::from_seed(1), vec![], &node.params).unwrap();
        node.submit(&create).await.unwrap();
        node.anchor().await.unwrap();

        node.cas.set_reachable(false);
        let summary = node.observe().await;
        assert_eq!(summary.retry_later, 1);
        assert_eq!(node.unresolvable.len(), 1);
        assert!(node.resolve(&create.did_unique_suffix).await.is_none());

        node.cas.set_reachable(true);
        let summary = node.observer.retry_unresolvable(10).await.unwrap();
        assert_eq!(summary.processed, 1);
        assert!(node.unresolvable.is_empty());
        assert!(node.resolve(&create.did_unique_suffix).await.is_some());
    }

    #[tokio::test]
    async fn test_anchor_written_but_not_dequeued_is_reanchored_once() {
        let node = node();
        let (k0, k1, k2) = (KeySet::from_seed(1), KeySet::from_seed(2), KeySet::from_seed(3));
        let create = create_request(&k0, vec![add_service("home")], &node.params).unwrap();
        let suffix = create.did_unique_suffix.clone();
        node.publish(&[&create]).await;

        let update =
            update_request(&suffix, &k0, &k1, vec![add_service("blog")], &node.params).unwrap();
        node.submit(&update).await.unwrap();
        node.queue.fail_next_dequeue();
        assert!(matches!(
            node.anchor().await,
            Err(BatchWriterError::Store(_))
        ));
        assert_eq!(node.blockchain.writes().len(), 2, "anchor reached the chain");
        assert_eq!(node.queue.len(), 1, "operation still queued");

        let next = update_request(&suffix, &k1, &k2, vec![], &node.params).unwrap();
        let err = node.submit(&next).await.unwrap_err();
        assert_eq!(
            err.code(),
            Some(ErrorCode::QueueingMultipleOperationsPerDidNotAllowed)
        );

        assert_eq!(node.anchor().await.unwrap(), 0, "failed cycle's anchor unconfirmed");
        node.observe().await;
        node.advance_blocks(node.params.min_confirmations_before_next_write);
        assert_eq!(node.anchor().await.unwrap(), 1);
        assert!(node.queue.is_empty());

        let writes = node.blockchain.writes();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[2].anchor_string, writes[1].anchor_string, "same bytes re-anchored");
        assert_eq!(node.observe().await.processed, 1);

        let state = node.resolve(&suffix).await.unwrap();
        assert_eq!(state.last_operation_transaction_number, 2);

        let reference = TestNode::new(ProtocolParameters::for_testing());
        reference.publish(&[&create]).await;
        reference.publish(&[&update]).await;
        assert_eq!(Some(state), reference.resolve(&suffix).await);
        node.submit(&next).await.unwrap();
    }

    #[tokio::test]
    async fn test_underpaid_transaction_is_ignored() {
        let node = node();
        let create = create_request(&KeySet::from_seed(1), vec![], &node.params).unwrap();
        node.submit(&create).await.unwrap();
        node.anchor().await.unwrap();

        let mut transactions = node.mine();
        transactions[0].transaction_fee_paid = 1;
        let summary = node
            .observer
            .process_transactions(&transactions)
            .await
            .unwrap();
        assert_eq!(summary.invalid, 1);
        assert!(node.unresolvable.is_empty());
        assert!(node.resolve(&create.did_unique_suffix).await.is_none());
    }

    #[tokio::test]
    async fn test_reorg_reverts_later_operations() {
        let node = node();
        let (k0, k1) = (KeySet::from_seed(1), KeySet::from_seed(2));
        let create = create_request(&k0, vec![], &node.params).unwrap();
        let suffix = create.did_unique_suffix.clone();
        node.publish(&[&create]).await;
        let update = update_request(&suffix, &k0, &k1, vec![add_service("late")], &node.params)
            .unwrap();
        node.publish(&[&update]).await;

        let transactions = node.transactions();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].transaction_time, GENESIS_TIME);

        node.observer.revert_to(Some(&transactions[0])).await.unwrap();
        let state = node.resolve(&suffix).await.unwrap();
        assert_eq!(state.last_operation_transaction_number, 1);
        assert!(state.document.service("late").is_none());

        let last = node.confirmations.get_last_submitted().await.unwrap().unwrap();
        assert_eq!(last.confirmed_at, None);

        node.observer.revert_to(None).await.unwrap();
        assert!(node.resolve(&suffix).await.is_none());
    }
}
