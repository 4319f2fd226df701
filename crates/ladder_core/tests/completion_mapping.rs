use ladder_core::{
    completion_color, completion_fraction, completion_percent, CompletionBand, CompletionView, Rgb,
};
use rust_decimal::Decimal;

fn amount(value: i64) -> Decimal {
    Decimal::from(value)
}

#[test]
fn fraction_uses_default_for_unset_or_non_positive_target() {
    let default = amount(20_000);
    assert_eq!(completion_fraction(amount(5_000), None, default), 0.25);
    assert_eq!(completion_fraction(amount(5_000), Some(amount(0)), default), 0.25);
    assert_eq!(completion_fraction(amount(5_000), Some(amount(-3)), default), 0.25);
    assert_eq!(completion_fraction(amount(5_000), Some(amount(10_000)), default), 0.5);
}

#[test]
fn fraction_is_zero_when_no_positive_target_exists() {
    assert_eq!(completion_fraction(amount(5_000), None, Decimal::ZERO), 0.0);
    assert_eq!(
        completion_fraction(amount(5_000), Some(amount(-1)), amount(-1)),
        0.0
    );
}

#[test]
fn fraction_stays_within_unit_interval() {
    let currents = [0, 1, 999, 10_000, 20_000, 1_000_000];
    let targets = [None, Some(-500), Some(0), Some(1), Some(10_000)];
    let defaults = [-1, 0, 1, 20_000];

    for current in currents {
        for target in targets {
            for default in defaults {
                let fraction =
                    completion_fraction(amount(current), target.map(amount), amount(default));
                assert!(
                    (0.0..=1.0).contains(&fraction),
                    "fraction {fraction} out of range for {current}/{target:?}/{default}"
                );
            }
        }
    }
}

#[test]
fn percent_rounds_to_nearest_integer() {
    assert_eq!(completion_percent(0.0), 0);
    assert_eq!(completion_percent(0.494), 49);
    assert_eq!(completion_percent(0.496), 50);
    assert_eq!(completion_percent(1.0), 100);
}

#[test]
fn color_is_continuous_at_midpoint() {
    let below = completion_color(0.5 - 1e-9);
    let at = completion_color(0.5);
    let above = completion_color(0.5 + 1e-9);
    assert_eq!(below, Rgb::MAGENTA);
    assert_eq!(at, Rgb::MAGENTA);
    assert_eq!(above, Rgb::MAGENTA);
}

#[test]
fn color_channels_are_monotonic_within_each_half() {
    let mut previous = completion_color(0.0);
    for step in 1..=100 {
        let t = f64::from(step) / 100.0;
        let color = completion_color(t);
        assert_eq!(color.g, 0);
        if t <= 0.5 {
            assert_eq!(color.r, 255);
            assert!(color.b >= previous.b, "blue decreased at {t}");
        } else {
            assert_eq!(color.b, 255);
            assert!(color.r <= previous.r, "red increased at {t}");
        }
        previous = color;
    }
    assert_eq!(previous, Rgb::BLUE);
}

#[test]
fn quarter_points_interpolate_linearly() {
    assert_eq!(completion_color(0.25), Rgb { r: 255, g: 0, b: 128 });
    assert_eq!(completion_color(0.75), Rgb { r: 128, g: 0, b: 255 });
    assert_eq!(completion_color(0.25).to_css(), "rgb(255, 0, 128)");
}

#[test]
fn completion_view_combines_display_fields() {
    let view = CompletionView::new(amount(13_000), Some(amount(20_000)), amount(20_000));
    assert_eq!(view.fraction, 0.65);
    assert_eq!(view.percent, 65);
    assert_eq!(view.fill_bucket, 70);
    assert_eq!(view.band, CompletionBand::Mid);

    let full = CompletionView::new(amount(25_000), None, amount(20_000));
    assert_eq!(full.percent, 100);
    assert_eq!(full.band, CompletionBand::High);
    assert_eq!(full.color, Rgb::BLUE);
}
