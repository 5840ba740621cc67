// Logarithmic/linear power conversions.
// Non-positive linear input has no logarithm; those map to -inf.

pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

pub fn linear_to_db(ratio: f64) -> f64 {
    if ratio <= 0.0 {
        return f64::NEG_INFINITY;
    }
    10.0 * ratio.log10()
}

pub fn dbm_to_mw(dbm: f64) -> f64 {
    db_to_linear(dbm)
}

pub fn mw_to_dbm(mw: f64) -> f64 {
    linear_to_db(mw)
}
