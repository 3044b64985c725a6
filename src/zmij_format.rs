//! Canonical text for floats.

use num_traits::float::FloatCore;
use zmij::Float;

/// Shortest round-trip text of `f` that still reads as a YAML float: `.nan`, `.inf`, `-.inf`,
/// or digits that always carry a `.` (zmij may render `4e-6`, which becomes `4.0e-6`).
pub(crate) fn float_string<F: Float + FloatCore>(f: F) -> String {
    if f.is_nan() {
        return ".nan".to_string();
    }
    if f.is_infinite() {
        return if f.is_sign_positive() { ".inf" } else { "-.inf" }.to_string();
    }
    let mut buf = zmij::Buffer::new();
    let s = buf.format_finite(f);
    let mut out = String::with_capacity(s.len() + 2);
    if s.contains('.') {
        out.push_str(s);
    } else if let Some(exp_pos) = s.find(['e', 'E']) {
        out.push_str(&s[..exp_pos]);
        out.push_str(".0");
        out.push_str(&s[exp_pos..]);
    } else {
        out.push_str(s);
        out.push_str(".0");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_has_a_fraction() {
        assert_eq!(float_string(1.0f64), "1.0");
        assert_eq!(float_string(0.5f64), "0.5");
        assert!(float_string(4e-6f64).contains(".0e") || float_string(4e-6f64).contains('.'));
        assert_eq!(float_string(f64::NEG_INFINITY), "-.inf");
        assert_eq!(float_string(f64::NAN), ".nan");
    }
}
