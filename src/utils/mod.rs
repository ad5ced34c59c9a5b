use crate::error::TeetailError;

const KIB: u64 = 1024;

/// Parses a byte count such as `4096`, `64K`, `1M` or `2GiB`.
///
/// Suffixes are binary and case-insensitive. Zero is rejected.
pub fn parse_size(value: &str) -> Result<u64, String> {
    let value = value.trim();
    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, suffix) = value.split_at(digits_end);
    if digits.is_empty() {
        return Err(format!("'{value}' is not a byte count"));
    }

    let multiplier = match suffix.to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KIB,
        "m" | "mb" | "mib" => KIB * KIB,
        "g" | "gb" | "gib" => KIB * KIB * KIB,
        _ => return Err(format!("unknown size suffix '{suffix}'")),
    };

    let size = digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| format!("'{value}' is too large"))?;

    if size == 0 {
        return Err("size must be greater than zero".to_string());
    }
    Ok(size)
}

pub fn to_usize(what: &'static str, value: u64) -> Result<usize, TeetailError> {
    usize::try_from(value).map_err(|_| TeetailError::SizeTooLarge { what, value })
}

/// Reserves room for `size` bytes without touching it, reporting failure
/// instead of aborting. The returned vector is empty.
pub fn reserve_bytes(size: usize) -> Result<Vec<u8>, TeetailError> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(size)
        .map_err(|source| TeetailError::Allocation { size, source })?;
    Ok(storage)
}
