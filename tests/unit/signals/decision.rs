//! Unit tests for score classification

use mafafx::models::SignalState;
use mafafx::signals::classify;

#[test]
fn test_classification_boundaries() {
    assert_eq!(classify(10), SignalState::StrongBuy);
    assert_eq!(classify(6), SignalState::StrongBuy);
    assert_eq!(classify(5), SignalState::Buy);
    assert_eq!(classify(2), SignalState::Buy);
    assert_eq!(classify(1), SignalState::Neutral);
    assert_eq!(classify(0), SignalState::Neutral);
    assert_eq!(classify(-1), SignalState::Neutral);
    assert_eq!(classify(-2), SignalState::Sell);
    assert_eq!(classify(-5), SignalState::Sell);
    assert_eq!(classify(-6), SignalState::StrongSell);
    assert_eq!(classify(-10), SignalState::StrongSell);
}

#[test]
fn test_state_labels() {
    assert_eq!(SignalState::StrongBuy.to_string(), "STRONG BUY");
    assert_eq!(SignalState::Neutral.label(), "NEUTRAL");
    assert!(SignalState::Buy.is_bullish());
    assert!(SignalState::StrongSell.is_bearish());
    assert!(!SignalState::Neutral.is_bullish() && !SignalState::Neutral.is_bearish());
    assert_eq!(SignalState::default(), SignalState::Neutral);
}
