/// Exponential moving averages over daily quantities

/// Single left-to-right EMA scan, seeded with the first value.
///
/// `ema += alpha * (value - ema)` with `alpha = 2 / (window + 1)`. Recomputed
/// in full on every call; histories stay small enough that incremental state
/// is not worth carrying.
pub fn ema(values: &[f64], window: usize) -> f64 {
    let Some((&first, rest)) = values.split_first() else {
        return 0.0;
    };
    let alpha = 2.0 / (window as f64 + 1.0);
    let mut ema = first;
    for &value in rest {
        ema += alpha * (value - ema);
    }
    ema
}
