//! Storage tests against PostgreSQL
//!
//! These run only when `TEST_DATABASE_URL` points at a scratch database.

use core_kernel::{ClaimId, PortError};
use domain_claims::ClaimStatus;
use domain_workflow::{AdjudicationEngine, ClaimRepository, NoopObserver, StagePlan, WorkflowResultStore};
use infra_db::{PostgresClaimRepository, PostgresWorkflowResultStore};
use test_utils::{approving_registry, require_database, ClaimRecordBuilder, EvidenceFixtures};
use uuid::Uuid;

fn unique_claim_id() -> String {
    format!("CLM-{}", Uuid::new_v4().simple())
}

mod claim_repository_tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_update() {
        let pool = require_database!();
        let repository = PostgresClaimRepository::new(pool);
        let mut claim = ClaimRecordBuilder::new().with_id(&unique_claim_id()).build();

        repository.insert(&claim).await.unwrap();
        assert_eq!(repository.get(&claim.id).await.unwrap(), claim);

        claim.begin_processing().unwrap();
        repository.update(&claim).await.unwrap();
        assert_eq!(repository.get(&claim.id).await.unwrap().status, ClaimStatus::InProgress);
    }

    #[tokio::test]
    async fn test_begin_processing_admits_one_run() {
        let pool = require_database!();
        let repository = PostgresClaimRepository::new(pool);
        let mut claim = ClaimRecordBuilder::new().with_id(&unique_claim_id()).build();
        repository.insert(&claim).await.unwrap();

        claim.begin_processing().unwrap();
        repository.begin_processing(&claim).await.unwrap();
        let err = repository.begin_processing(&claim).await.unwrap_err();
        assert!(matches!(err, PortError::Conflict { .. }));

        let missing = ClaimRecordBuilder::new().with_id(&unique_claim_id()).build();
        assert!(repository.begin_processing(&missing).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let pool = require_database!();
        let repository = PostgresClaimRepository::new(pool);
        let claim = ClaimRecordBuilder::new().with_id(&unique_claim_id()).build();

        repository.insert(&claim).await.unwrap();
        let err = repository.insert(&claim).await.unwrap_err();
        assert!(matches!(err, PortError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_missing_claim_is_not_found() {
        let pool = require_database!();
        let repository = PostgresClaimRepository::new(pool);
        let claim_id = ClaimId::new(unique_claim_id()).unwrap();
        assert!(repository.get(&claim_id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_health_check() {
        let pool = require_database!();
        let repository = PostgresClaimRepository::new(pool);
        assert!(core_kernel::HealthCheckable::health_check(&repository).await.is_operational());
    }
}

mod result_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_history_is_append_only_and_ordered() {
        let pool = require_database!();
        let store = PostgresWorkflowResultStore::new(pool);
        let claim = ClaimRecordBuilder::new().with_id(&unique_claim_id()).build();
        let engine = AdjudicationEngine::with_registry(approving_registry(), StagePlan::standard().unwrap());

        let first = engine
            .adjudicate(&claim, &EvidenceFixtures::complete(), &NoopObserver)
            .await
            .unwrap();
        let second = engine
            .adjudicate(&claim, &EvidenceFixtures::complete(), &NoopObserver)
            .await
            .unwrap();
        store.store(&first).await.unwrap();
        store.store(&second).await.unwrap();

        let history = store.get_history(&claim.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].record_id, first.record_id);
        assert_eq!(history[1], second);
        assert_eq!(store.get_latest(&claim.id).await.unwrap().record_id, second.record_id);
    }

    #[tokio::test]
    async fn test_latest_without_results_is_not_found() {
        let pool = require_database!();
        let store = PostgresWorkflowResultStore::new(pool);
        let claim_id = ClaimId::new(unique_claim_id()).unwrap();

        assert!(store.get_latest(&claim_id).await.unwrap_err().is_not_found());
        assert!(store.get_history(&claim_id).await.unwrap().is_empty());
    }
}
