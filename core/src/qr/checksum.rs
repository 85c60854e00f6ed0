// bobabble/src/qr/checksum.rs

//! The order payload's `verification` field.
//!
//! This is a 31-multiplier string hash, not a MAC. It catches a mistyped or
//! truncated scan and casual edits. Anyone who knows the format can forge it.

const SALT: &str = "BOBABBLE";

/// Hex checksum of `"{order_id}-{timestamp}-BOBABBLE"`.
///
/// Each UTF-16 code unit is folded in as `hash = hash * 31 + unit` with 32-bit
/// signed wraparound; the result is the absolute value in uppercase hex.
pub fn verification_hash(order_id: &str, timestamp: &str) -> String {
  let combined = format!("{}-{}-{}", order_id, timestamp, SALT);
  let hash = combined
    .encode_utf16()
    .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)));
  // Widen first so i32::MIN has an absolute value.
  format!("{:X}", i64::from(hash).abs())
}

#[cfg(test)]
mod tests {
  use super::*;

  // Reference hash over the same UTF-16 units, computed without wraparound tricks.
  fn reference(input: &str) -> String {
    let mut hash: i64 = 0;
    for unit in input.encode_utf16() {
      hash = (hash * 31 + i64::from(unit)) as i32 as i64;
    }
    format!("{:X}", hash.abs())
  }

  #[test]
  fn matches_reference_fold() {
    let cases = [
      ("ord-1", "2024-05-01T12:00:00.000Z"),
      ("", ""),
      ("9f1c2d3e-aaaa-bbbb-cccc-0123456789ab", "2025-12-31T23:59:59.999Z"),
      ("ünïcødé", "☕"),
    ];
    for (id, ts) in cases {
      assert_eq!(verification_hash(id, ts), reference(&format!("{}-{}-BOBABBLE", id, ts)));
    }
  }

  #[test]
  fn known_values() {
    assert_eq!(verification_hash("ord-1", "2024-05-01T12:00:00.000Z"), "9D0BDCB");
    assert_eq!(verification_hash("order-42", "2024-01-01T00:00:00.000Z"), "1DC8B3C2");
  }

  #[test]
  fn is_uppercase_hex() {
    let hash = verification_hash("order-42", "2024-01-01T00:00:00.000Z");
    assert!(!hash.is_empty());
    assert!(hash.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
  }

  #[test]
  fn one_character_change_alters_hash() {
    let a = verification_hash("order-42", "2024-01-01T00:00:00.000Z");
    let b = verification_hash("order-43", "2024-01-01T00:00:00.000Z");
    assert_ne!(a, b);
  }
}
