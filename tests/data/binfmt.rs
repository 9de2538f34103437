//! Legacy value-codec tag selection.

use yangforge::data::binfmt::{
    serializable_tag, ValueTag, STRING_BYTES_LENGTH_THRESHOLD,
};
use yangforge::data::DataValue;

#[test]
fn string_small_vs_large() {
    assert_eq!(
        serializable_tag(&DataValue::string("foobar")),
        ValueTag::StringType
    );

    let large = large_string(STRING_BYTES_LENGTH_THRESHOLD);
    assert!(large.len() >= STRING_BYTES_LENGTH_THRESHOLD);
    assert_eq!(
        serializable_tag(&DataValue::string(&large)),
        ValueTag::StringBytesType
    );
}

// Doubles a seed string until it crosses the requested size.
fn large_string(min_size: usize) -> String {
    let mut s = String::from("X");
    while s.len() < min_size {
        let copy = s.clone();
        s.push_str(&copy);
    }
    s
}
