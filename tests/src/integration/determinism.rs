//! # Replay Determinism
//!
//! A node that observes the same transactions in a different order must
//! resolve every identifier to the same state. The history below mixes
//! two identifiers per batch, so operations also differ in their index
//! within a transaction.

#[cfg(test)]
mod tests {
    use crate::node::{add_service, TestNode};
    use proptest::prelude::*;
    use shared_types::ports::ContentAddressableStore;
    use shared_types::{ProtocolParameters, Transaction};
    use st_01_operations::{
        create_request, deactivate_request, recover_request, update_request, KeySet,
        OperationRequest,
    };
    use st_05_resolver::DidState;
    use std::sync::OnceLock;

    struct History {
        transactions: Vec<Transaction>,
        files: Vec<Vec<u8>>,
        suffixes: [String; 2],
        states: [DidState; 2],
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    fn history() -> &'static History {
        static HISTORY: OnceLock<History> = OnceLock::new();
        HISTORY.get_or_init(|| runtime().block_on(record_history()))
    }

    async fn record_history() -> History {
        let node = TestNode::new(ProtocolParameters::for_testing());
        let p = node.params.clone();
        let k: Vec<KeySet> = (40..46).map(KeySet::from_seed).collect();
        let j: Vec<KeySet> = (50..56).map(KeySet::from_seed).collect();

        let a = create_request(&k[0], vec![add_service("a0")], &p).unwrap();
        let b = create_request(&j[0], vec![add_service("b0")], &p).unwrap();
        let (sa, sb) = (a.did_unique_suffix.clone(), b.did_unique_suffix.clone());
        let service = |id: &str| vec![add_service(id)];

        let batches: Vec<[OperationRequest; 2]> = vec![
            [a, b],
            [
                update_request(&sa, &k[0], &k[1], service("a1"), &p).unwrap(),
                update_request(&sb, &j[0], &j[1], service("b1"), &p).unwrap(),
            ],
            [
                update_request(&sa, &k[1], &k[2], service("a2"), &p).unwrap(),
                recover_request(&sb, &j[0], &j[2], service("b2"), &p).unwrap(),
            ],
            [
                recover_request(&sa, &k[0], &k[3], service("a3"), &p).unwrap(),
                update_request(&sb, &j[2], &j[3], service("b3"), &p).unwrap(),
            ],
            [
                update_request(&sa, &k[3], &k[4], service("a4"), &p).unwrap(),
                update_request(&sb, &j[1], &j[5], service("stale"), &p).unwrap(),
            ],
            [
                update_request(&sa, &k[1], &k[5], service("stale"), &p).unwrap(),
                deactivate_request(&sb, &j[2], &p).unwrap(),
            ],
        ];
        for [first, second] in &batches {
            let summary = node.publish(&[first, second]).await;
            assert_eq!(summary.processed, 1);
        }

        let states = [
            node.resolve(&sa).await.unwrap(),
            node.resolve(&sb).await.unwrap(),
        ];
        History {
            transactions: node.transactions(),
            files: node.cas.files(),
            suffixes: [sa, sb],
            states,
        }
    }

    async fn replay(transactions: &[Transaction]) -> Vec<Option<DidState>> {
        let history = history();
        let node = TestNode::new(ProtocolParameters::for_testing());
        for file in &history.files {
            node.cas.write(file.clone()).await.unwrap();
        }
        let summary = node
            .observer
            .process_transactions(transactions)
            .await
            .unwrap();
        assert_eq!(summary.processed, transactions.len());

        let mut states = Vec::new();
        for suffix in &history.suffixes {
            states.push(node.resolve(suffix).await);
        }
        states
    }

    #[test]
    fn test_recorded_history_final_states() {
        let history = history();
        let [a, b] = &history.states;

        assert_eq!(history.transactions.len(), 6);
        assert_eq!(a.last_operation_transaction_number, 5);
        assert!(a.document.service("a3").is_some());
        assert!(a.document.service("a4").is_some());
        assert!(a.document.service("a2").is_none());
        assert!(a.document.service("stale").is_none());

        assert!(b.is_deactivated());
        assert_eq!(b.last_operation_transaction_number, 6);
    }

    #[test]
    fn test_replay_in_chain_order_matches() {
        let history = history();
        let states = runtime().block_on(replay(&history.transactions));
        let expected: Vec<_> = history.states.iter().cloned().map(Some).collect();
        assert_eq!(states, expected);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_replay_order_does_not_change_resolution(
            permuted in Just(history().transactions.clone()).prop_shuffle()
        ) {
            let history = history();
            let states = runtime().block_on(replay(&permuted));
            let expected: Vec<_> = history.states.iter().cloned().map(Some).collect();
            prop_assert_eq!(states, expected);
        }
    }
}
