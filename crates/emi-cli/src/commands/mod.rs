pub mod afford;
pub mod schedule;

/// Tenure in months from `--tenure-months` or `--tenure-years`.
pub fn tenure_from_flags(
    months: Option<u32>,
    years: Option<u32>,
) -> Result<u32, Box<dyn std::error::Error>> {
    match (months, years) {
        (Some(m), _) => Ok(m),
        (None, Some(y)) => y
            .checked_mul(12)
            .ok_or_else(|| "--tenure-years is too large".into()),
        (None, None) => {
            Err("--tenure-months or --tenure-years is required (or provide --input)".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenure_from_flags() {
        assert_eq!(tenure_from_flags(Some(18), None).unwrap(), 18);
        assert_eq!(tenure_from_flags(None, Some(20)).unwrap(), 240);
        assert!(tenure_from_flags(None, None).is_err());
    }
}
