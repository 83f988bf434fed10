//! Integration tests for journal generation and voiding.

mod common;

use common::*;
use larder_core::StockError;
use larder_core::journal::JournalStatus;
use larder_core::posting::SourceType;
use larder_db::entities::sea_orm_active_enums::{JournalState, LineSide};
use larder_db::{
    AccountRepository, InventoryRepository, JournalRepository, JournalWithLines, PostingRepository,
};
use larder_shared::types::{Amount, BranchId, BranchScope, CompanyId, UserId};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn side_total(journal: &JournalWithLines, side: LineSide) -> Amount {
    journal
        .lines
        .iter()
        .filter(|line| line.side == side)
        .map(|line| line.amount.parse::<Amount>().unwrap())
        .sum()
}

#[tokio::test]
async fn test_receipt_journal_is_balanced_and_traced() {
    let db = setup_db().await;
    let scope = setup_scope(&db).await;

    let source = submitted(&db, &scope, SourceType::GoodsReceipt).await;
    let posted = PostingRepository::new(db.clone())
        .post_receipt(
            &scope,
            receipt(
                source,
                day(1),
                vec![
                    receipt_line(flour(), dec!(2.5), dec!(1000)),
                    receipt_line(sugar(), dec!(1), dec!(300)),
                ],
            ),
        )
        .await
        .unwrap();

    let journal = JournalRepository::new(db.clone())
        .find_journal(&scope, SourceType::GoodsReceipt, source.source_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(journal.journal.status, JournalState::Posted);
    assert_eq!(side_total(&journal, LineSide::Debit), Amount::new(dec!(2800)));
    assert_eq!(side_total(&journal, LineSide::Credit), Amount::new(dec!(2800)));
    assert_eq!(journal.journal.created_by, scope.actor_id().into_inner());

    let debit_lots: Vec<_> = journal
        .lines
        .iter()
        .filter(|line| line.side == LineSide::Debit)
        .map(|line| line.lot_id)
        .collect();
    let lot_ids: Vec<_> = posted.lots.iter().map(|lot| Some(lot.id.into_inner())).collect();
    assert_eq!(debit_lots, lot_ids);

    let credits: Vec<_> = journal
        .lines
        .iter()
        .filter(|line| line.side == LineSide::Credit)
        .collect();
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0].account_code, "2100");
    assert_eq!(
        journal.lines.iter().map(|l| l.line_no).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn test_generate_journal_returns_the_existing_journal() {
    let db = setup_db().await;
    let scope = setup_scope(&db).await;

    let source = submitted(&db, &scope, SourceType::GoodsReceipt).await;
    let posted = PostingRepository::new(db.clone())
        .post_receipt(
            &scope,
            receipt(source, day(1), vec![receipt_line(flour(), dec!(1), dec!(50))]),
        )
        .await
        .unwrap();

    let journals = JournalRepository::new(db.clone());
    let first = journals
        .generate_journal(&scope, SourceType::GoodsReceipt, source.source_id)
        .await
        .unwrap();
    let second = journals
        .generate_journal(&scope, SourceType::GoodsReceipt, source.source_id)
        .await
        .unwrap();

    assert!(!first.created);
    assert_eq!(Some(first.id()), posted.document.journal_id);
    assert_eq!(first.id(), second.id());
}

#[tokio::test]
async fn test_generate_journal_requires_posted_document() {
    let db = setup_db().await;
    let scope = setup_scope(&db).await;
    let source = submitted(&db, &scope, SourceType::GoodsReceipt).await;

    let err = JournalRepository::new(db.clone())
        .generate_journal(&scope, SourceType::GoodsReceipt, source.source_id)
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::InvalidState { .. }));

    let err = JournalRepository::new(db.clone())
        .generate_journal(&scope, SourceType::GoodsReceipt, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_zero_value_posting_skips_journal() {
    let db = setup_db().await;
    let scope = setup_scope(&db).await;

    let source = submitted(&db, &scope, SourceType::GoodsReceipt).await;
    let posted = PostingRepository::new(db.clone())
        .post_receipt(
            &scope,
            receipt(source, day(1), vec![receipt_line(flour(), dec!(5), dec!(0))]),
        )
        .await
        .unwrap();
    assert!(posted.document.journal_id.is_none());
    assert_eq!(posted.projections[0].after, qty(dec!(5)));

    let err = JournalRepository::new(db.clone())
        .generate_journal(&scope, SourceType::GoodsReceipt, source.source_id)
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::NonPostable { .. }));
}

#[tokio::test]
async fn test_void_writes_mirrored_reversal() {
    let db = setup_db().await;
    let scope = setup_scope(&db).await;

    let source = submitted(&db, &scope, SourceType::GoodsReceipt).await;
    let posted = PostingRepository::new(db.clone())
        .post_receipt(
            &scope,
            receipt(source, day(1), vec![receipt_line(flour(), dec!(4), dec!(250))]),
        )
        .await
        .unwrap();
    let journal_id = posted.document.journal_id.unwrap();

    let journals = JournalRepository::new(db.clone());
    let result = journals
        .void_journal(&scope, journal_id, "duplicate delivery note")
        .await
        .unwrap();

    let original = &result.original;
    let reversal = &result.reversal;
    assert_eq!(original.journal.status, JournalState::Voided);
    assert_eq!(
        JournalStatus::from(original.journal.status),
        JournalStatus::Voided
    );
    assert_eq!(
        original.journal.void_reason.as_deref(),
        Some("duplicate delivery note")
    );
    assert_eq!(original.journal.voided_by, Some(scope.actor_id().into_inner()));
    assert_eq!(original.journal.total_debit, "1000.000");

    assert!(reversal.created);
    assert_eq!(reversal.journal.reversal_of, Some(journal_id.into_inner()));
    assert_eq!(reversal.journal.source_id, journal_id.into_inner());
    assert_eq!(reversal.lines.len(), original.lines.len());
    for (rev, orig) in reversal.lines.iter().zip(&original.lines) {
        assert_eq!(rev.account_code, orig.account_code);
        assert_eq!(rev.amount, orig.amount);
        assert_ne!(rev.side, orig.side);
        assert!(rev.memo.starts_with("Reversal: "));
    }
    assert_eq!(
        side_total(reversal, LineSide::Debit),
        side_total(reversal, LineSide::Credit)
    );

    let stored = journals
        .find_journal(&scope, SourceType::JournalReversal, journal_id.into_inner())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id(), reversal.id());

    let reloaded = journals.get_journal(&scope, journal_id).await.unwrap();
    assert_eq!(reloaded.journal.status, JournalState::Voided);
    assert_eq!(reloaded.lines.len(), original.lines.len());
    assert!(!reloaded.created);
}

#[tokio::test]
async fn test_void_twice_is_invalid_state() {
    let db = setup_db().await;
    let scope = setup_scope(&db).await;

    let source = submitted(&db, &scope, SourceType::GoodsReceipt).await;
    let posted = PostingRepository::new(db.clone())
        .post_receipt(
            &scope,
            receipt(source, day(1), vec![receipt_line(flour(), dec!(1), dec!(10))]),
        )
        .await
        .unwrap();
    let journal_id = posted.document.journal_id.unwrap();
    let journals = JournalRepository::new(db.clone());

    let result = journals.void_journal(&scope, journal_id, "wrong item").await.unwrap();

    let err = journals
        .void_journal(&scope, journal_id, "again")
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::InvalidState { .. }));

    // A reversal cannot itself be voided.
    let err = journals
        .void_journal(&scope, result.reversal.id(), "undo the undo")
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATE");

    let err = journals
        .void_journal(&scope, journal_id, "   ")
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
}

#[tokio::test]
async fn test_journals_are_invisible_to_other_branches() {
    let db = setup_db().await;
    let scope = setup_scope(&db).await;

    let source = submitted(&db, &scope, SourceType::GoodsReceipt).await;
    let posted = PostingRepository::new(db.clone())
        .post_receipt(
            &scope,
            receipt(source, day(1), vec![receipt_line(flour(), dec!(1), dec!(10))]),
        )
        .await
        .unwrap();
    let journal_id = posted.document.journal_id.unwrap();

    let other = sibling_branch(&scope);
    let journals = JournalRepository::new(db.clone());
    let err = journals
        .void_journal(&other, journal_id, "not mine")
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::NotFound { .. }));
    let err = journals.get_journal(&other, journal_id).await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
    assert!(
        journals
            .find_journal(&other, SourceType::GoodsReceipt, source.source_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_missing_account_aborts_posting() {
    let db = setup_db().await;
    // No accounts seeded for this company.
    let scope = BranchScope::verified(CompanyId::new(), BranchId::new(), UserId::new());

    let source = submitted(&db, &scope, SourceType::GoodsReceipt).await;
    let err = PostingRepository::new(db.clone())
        .post_receipt(
            &scope,
            receipt(source, day(1), vec![receipt_line(flour(), dec!(1), dec!(10))]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::MissingAccount { code: "1300" }));
    assert!(err.is_fatal());

    let inventory = InventoryRepository::new(db.clone());
    assert!(inventory.find_item_by_key(&scope, &flour()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_seeding_accounts_twice_creates_nothing_new() {
    let db = setup_db().await;
    let scope = setup_scope(&db).await;
    let accounts = AccountRepository::new(db.clone());

    let created = accounts.seed_defaults(scope.company_id()).await.unwrap();
    assert_eq!(created, 0);

    let codes: Vec<_> = accounts
        .list(scope.company_id())
        .await
        .unwrap()
        .into_iter()
        .map(|account| account.code)
        .collect();
    assert_eq!(codes, vec!["1300", "2100", "5100", "5200"]);

    assert!(accounts.list(CompanyId::new()).await.unwrap().is_empty());
}
