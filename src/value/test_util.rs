// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! `quickcheck::Arbitrary` impls for the value model, used by the
//! property-based tests and exposed through the `arbitrary` feature.
use super::{Document, Timestamp, Value};
use quickcheck::{Arbitrary, Gen};
use rust_decimal::Decimal;
use uuid::Uuid;

impl Arbitrary for Value {
    fn arbitrary(g: &mut Gen) -> Self {
        arbitrary_at_depth(g, 2)
    }
}

/// Generates a value tree at most `depth` levels deep. At depth zero only
/// leaf kinds are produced, which bounds recursion.
fn arbitrary_at_depth(g: &mut Gen, depth: usize) -> Value {
    let max_tag = if depth == 0 { 9 } else { 11 };
    let tag = usize::arbitrary(g) % (max_tag + 1);
    match tag {
        0 => Value::Null,
        1 => Value::Boolean(bool::arbitrary(g)),
        2 => Value::Int32(i32::arbitrary(g)),
        3 => Value::Int64(i64::arbitrary(g)),
        4 => Value::Double(f64::arbitrary(g)),
        5 => Value::Decimal(Decimal::new(i64::arbitrary(g), u32::arbitrary(g) % 28)),
        6 => Value::String(String::arbitrary(g)),
        7 => Value::Binary(Vec::arbitrary(g)),
        8 => Value::DateTime(arbitrary_timestamp(g)),
        9 => Value::Guid(Uuid::from_u128(u128::arbitrary(g))),
        10 => {
            let len = usize::arbitrary(g) % 4;
            Value::Array(
                (0..len)
                    .map(|_| arbitrary_at_depth(g, depth - 1))
                    .collect(),
            )
        }
        _ => {
            let len = usize::arbitrary(g) % 4;
            Value::Document(
                (0..len)
                    .map(|_| (String::arbitrary(g), arbitrary_at_depth(g, depth - 1)))
                    .collect::<Document>(),
            )
        }
    }
}

fn arbitrary_timestamp(g: &mut Gen) -> Timestamp {
    let span = i128::from(Timestamp::MAX.as_millis()) - i128::from(Timestamp::MIN.as_millis()) + 1;
    let offset = i128::from(i64::arbitrary(g)).rem_euclid(span);
    let millis = (i128::from(Timestamp::MIN.as_millis()) + offset) as i64;
    Timestamp::from_millis(millis).expect("offset is within the supported range")
}
