//! # Order identifiers
//!
//! Identifiers have the form
//!
//! ```text
//!    ord_{millis}_{random}
//! ```
//!
//! where `millis` is the creation time in milliseconds since the Unix epoch and `random` is nine characters drawn
//! uniformly from `[0-9a-z]`. Both parts are base-36. The time component keeps identifiers roughly sortable and the
//! random component separates orders created in the same millisecond (36^9 ≈ 10^14 possibilities).

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::db_types::{OrderId, ORDER_ID_PREFIX};

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_PART_LEN: usize = 9;

pub fn generate_order_id(now: DateTime<Utc>) -> OrderId {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    let mut rng = rand::thread_rng();
    let random = (0..RANDOM_PART_LEN)
        .map(|_| BASE36_DIGITS[rng.gen_range(0..BASE36_DIGITS.len())] as char)
        .collect::<String>();
    OrderId(format!("{ORDER_ID_PREFIX}{}_{random}", to_base36(millis)))
}

pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".into();
    }
    let mut digits = Vec::with_capacity(13);
    while value > 0 {
        #[allow(clippy::cast_possible_truncation)]
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
