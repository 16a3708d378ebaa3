mod common;

use std::time::Duration;

use common::{round_prices, test_ledger, test_settings, HangingPriceSource, MemoryReceiptSink};
use fuelstation::application::{DispenserLedger, LedgerSettings, PurchaseOutcome};
use fuelstation::domain::{FuelType, PriceOrigin, PriceTable};
use fuelstation::pricing::{parse_feed, FetchError, FixedPriceSource};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_start_takes_a_live_snapshot() {
    let (ledger, source, _receipts) = test_ledger(round_prices()).await;

    assert_eq!(source.calls(), 1);
    assert_eq!(ledger.prices(), &round_prices());
    assert_eq!(ledger.price_origin(), &PriceOrigin::Live);
}

#[tokio::test]
async fn test_bad_status_installs_exact_fallback_table() {
    let (mut ledger, source, _receipts) = test_ledger(round_prices()).await;
    source.set(Err(FetchError::BadStatus(500)));

    let refresh = ledger.refresh_prices().await;

    let expected = PriceTable::new(dec!(2.03), dec!(2.28), dec!(1.99));
    assert_eq!(refresh.table, expected);
    assert_eq!(ledger.prices(), &expected);
    assert_eq!(
        refresh.origin,
        PriceOrigin::Fallback("Bad HTTP status: 500".to_string())
    );
}

#[tokio::test]
async fn test_every_fetch_failure_falls_back_as_a_whole() {
    let failures = [
        FetchError::Transport("connection refused".into()),
        FetchError::BadStatus(404),
        FetchError::MalformedPayload("missing field `diesel`".into()),
    ];

    for failure in failures {
        let (mut ledger, source, _receipts) = test_ledger(round_prices()).await;
        source.set(Err(failure));

        let refresh = ledger.refresh_prices().await;

        assert_eq!(refresh.table, PriceTable::fallback());
        assert!(refresh.origin.is_fallback());
    }
}

#[tokio::test]
async fn test_fresh_values_never_mix_with_fallback() {
    let (mut ledger, source, _receipts) = test_ledger(round_prices()).await;

    // a payload with one good entry and one missing is rejected entirely
    let partial = parse_feed(r#"{"ron95": 9.99, "ron97": 9.99}"#);
    source.set(partial);
    let refresh = ledger.refresh_prices().await;

    assert_eq!(refresh.table, PriceTable::fallback());
    for (fuel, price) in ledger.prices().iter() {
        assert_eq!(price, PriceTable::fallback().price(fuel));
    }
}

#[tokio::test]
async fn test_feed_recovers_after_fallback() {
    let (mut ledger, source, _receipts) = test_ledger(round_prices()).await;

    source.set(Err(FetchError::Transport("timeout".into())));
    ledger.refresh_prices().await;
    assert!(ledger.price_origin().is_fallback());

    let newer = PriceTable::new(dec!(2.05), dec!(3.47), dec!(2.15));
    source.set(Ok(newer));
    let refresh = ledger.refresh_prices().await;

    assert_eq!(refresh.table, newer);
    assert_eq!(refresh.origin, PriceOrigin::Live);
}

#[tokio::test]
async fn test_purchase_refreshes_prices_first() {
    let (mut ledger, source, _receipts) = test_ledger(round_prices()).await;
    let calls_before = source.calls();

    source.set(Ok(PriceTable::new(dec!(4), dec!(5), dec!(2))));
    let outcome = ledger.purchase(0, "ron95", dec!(20)).await.unwrap();

    assert_eq!(source.calls(), calls_before + 1);
    match outcome {
        PurchaseOutcome::Completed(done) => {
            assert_eq!(done.sale.price_per_litre, dec!(4));
            assert_eq!(done.sale.litres, dec!(5));
        }
        PurchaseOutcome::LowLevel(_) => panic!("expected a sale"),
    }
}

#[tokio::test]
async fn test_purchase_is_charged_at_fallback_price_when_feed_fails() {
    let (mut ledger, source, _receipts) = test_ledger(round_prices()).await;
    source.set(Err(FetchError::BadStatus(503)));

    let outcome = ledger.purchase(0, "diesel", dec!(19.90)).await.unwrap();

    match outcome {
        PurchaseOutcome::Completed(done) => {
            assert_eq!(done.sale.fuel, FuelType::Diesel);
            assert_eq!(done.sale.price_per_litre, dec!(1.99));
            assert_eq!(done.sale.litres, dec!(10));
        }
        PurchaseOutcome::LowLevel(_) => panic!("expected a sale"),
    }
}

#[tokio::test]
async fn test_slow_feed_times_out_into_fallback() {
    let settings = LedgerSettings {
        fetch_timeout: Duration::from_millis(20),
        ..test_settings()
    };

    let ledger = DispenserLedger::start(settings, HangingPriceSource, MemoryReceiptSink::new())
        .await
        .unwrap();

    assert_eq!(ledger.prices(), &PriceTable::fallback());
    match ledger.price_origin() {
        PriceOrigin::Fallback(reason) => assert!(reason.contains("no response within 20 ms")),
        PriceOrigin::Live => panic!("expected the fallback table"),
    }
}

#[tokio::test]
async fn test_fixed_source_station() {
    let ledger = DispenserLedger::start(
        test_settings(),
        FixedPriceSource::station_default(),
        MemoryReceiptSink::new(),
    )
    .await
    .unwrap();

    assert_eq!(ledger.price_origin(), &PriceOrigin::Live);
    assert_eq!(ledger.prices().price(FuelType::Ron97), dec!(3.47));
}
