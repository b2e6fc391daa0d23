use fpl_forecast::forecast::{FitError, forecast, forecast_remaining};

#[test]
fn short_season_example_yields_two_integer_weeks() {
    let out = forecast(&[0, 0, 10, 12], 6);
    assert_eq!(out.observed, vec![0, 0, 10, 12]);
    assert_eq!(out.predicted.len(), 2);
}

#[test]
fn empty_observed_becomes_zero_season() {
    let out = forecast(&[], 39);
    assert_eq!(out.observed, vec![0; 39]);
    assert!(out.predicted.is_empty());
}

#[test]
fn complete_or_overfull_season_has_no_forecast() {
    let full: Vec<u32> = (0..6).map(|w| w * 50).collect();
    assert!(forecast(&full, 6).predicted.is_empty());
    let over: Vec<u32> = (0..8).map(|w| w * 50).collect();
    let out = forecast(&over, 6);
    assert!(out.predicted.is_empty());
    assert_eq!(out.observed, over);
}

#[test]
fn forecast_fills_the_rest_of_the_season() {
    let observed = vec![0, 0, 0, 61, 109, 177, 232, 290, 335, 402];
    for season in [11, 20, 39] {
        let out = forecast(&observed, season);
        assert_eq!(out.predicted.len(), season - observed.len());
        assert_eq!(out.observed.len() + out.predicted.len(), season);
        assert_eq!(out.observed, observed);
    }
}

#[test]
fn rising_totals_keep_rising() {
    let observed = vec![0, 55, 118, 170, 233, 290, 349, 401, 466, 520];
    let predicted = forecast_remaining(&observed, 39).expect("fit should succeed");
    assert_eq!(predicted.len(), 29);
    assert!(predicted[0] > 520);
    assert!(predicted.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn degenerate_inputs_do_not_panic() {
    assert!(forecast(&[42], 10).predicted.is_empty());
    assert!(forecast(&[7, 7, 7, 7], 10).predicted.is_empty());
    assert_eq!(
        forecast_remaining(&[42], 10),
        Err(FitError::TooShort { len: 1 })
    );
    assert_eq!(forecast_remaining(&[7, 7, 7, 7], 10), Err(FitError::Constant));
}

#[test]
fn degenerate_input_on_complete_season_is_not_an_error() {
    assert_eq!(forecast_remaining(&[5, 5], 2), Ok(Vec::new()));
}
