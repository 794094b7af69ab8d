//! Radio signal calculations shared by the loss models.
//!
//! Units:
//! - Power: dBm, mW (conversion provided)
//! - Loss and gain: dB
//! - Distance: meters

/// Deterministic log-distance path loss in dB relative to the reference point.
///
/// # Formula
///
/// ```text
/// PL(d) = 10 × n × log₁₀(d / d₀)
/// ```
///
/// The reference loss `PL(d₀)` is not included; callers add it. The result is
/// only meaningful for `d > d₀`.
pub fn log_distance_path_loss(distance: f64, exponent: f64, reference_distance: f64) -> f64 {
    10.0 * exponent * (distance / reference_distance).log10()
}

/// Largest distance at which a link budget of `budget_db` is not yet spent.
///
/// Solves `budget = 10 n log₁₀(d / d₀)` for `d`:
///
/// ```text
/// d = d₀ × 10^(budget / (10 × n))
/// ```
///
/// Shadowing is intentionally ignored so the estimate is stable across
/// calls. A non-positive budget yields `d₀`; a non-positive exponent means the
/// signal never decays with distance and yields infinity.
pub fn effective_distance(budget_db: f64, exponent: f64, reference_distance: f64) -> f64 {
    if exponent <= 0.0 {
        return f64::INFINITY;
    }
    if budget_db <= 0.0 {
        return reference_distance;
    }
    reference_distance * 10f64.powf(budget_db / (10.0 * exponent))
}

/// Convert power from dBm to milliwatts.
///
/// ```text
/// 0 dBm   → 1 mW
/// 20 dBm  → 100 mW
/// -10 dBm → 0.1 mW
/// ```
pub fn dbm_to_mw(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0)
}

/// Convert power from milliwatts to dBm.
///
/// Inverse of [`dbm_to_mw`]. For `mw <= 0` this returns -∞ or NaN.
pub fn mw_to_dbm(mw: f64) -> f64 {
    10.0 * mw.log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_loss_per_decade_is_ten_n() {
        assert!((log_distance_path_loss(10.0, 2.5, 1.0) - 25.0).abs() < 1e-12);
        assert!((log_distance_path_loss(100.0, 3.0, 1.0) - 60.0).abs() < 1e-12);
        assert!((log_distance_path_loss(20.0, 2.0, 2.0) - 20.0).abs() < 1e-12);
        assert_eq!(log_distance_path_loss(5.0, 3.0, 5.0), 0.0);
    }

    #[test]
    fn effective_distance_inverts_path_loss() {
        let d = effective_distance(30.0, 3.0, 1.0);
        assert!((d - 10.0).abs() < 1e-9);
        assert!((log_distance_path_loss(d, 3.0, 1.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn effective_distance_edge_cases() {
        assert_eq!(effective_distance(-5.0, 3.0, 2.0), 2.0);
        assert_eq!(effective_distance(0.0, 3.0, 2.0), 2.0);
        assert_eq!(effective_distance(10.0, 0.0, 1.0), f64::INFINITY);
    }

    #[test]
    fn effective_distance_grows_with_budget() {
        let low = effective_distance(10.0, 2.7, 1.0);
        let mid = effective_distance(40.0, 2.7, 1.0);
        let high = effective_distance(80.0, 2.7, 1.0);
        assert!(low < mid && mid < high);
    }

    #[test]
    fn dbm_mw_conversion() {
        assert!((dbm_to_mw(20.0) - 100.0).abs() < 1e-9);
        assert!((dbm_to_mw(-10.0) - 0.1).abs() < 1e-12);
        for v in [-100.0, -50.0, 0.0, 10.0] {
            assert!((mw_to_dbm(dbm_to_mw(v)) - v).abs() < 1e-9);
        }
        assert_eq!(mw_to_dbm(0.0), f64::NEG_INFINITY);
    }
}
