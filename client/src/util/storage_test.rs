use super::*;

#[test]
fn decode_reads_valid_json() {
    assert_eq!(decode::<bool>("true"), Some(true));
    assert_eq!(decode::<Vec<u32>>("[1,2]"), Some(vec![1, 2]));
}

#[test]
fn decode_treats_corrupt_value_as_absent() {
    assert_eq!(decode::<bool>("{not json"), None);
    assert_eq!(decode::<u32>("\"text\""), None);
}

#[cfg(not(feature = "csr"))]
#[test]
fn native_store_is_empty() {
    save_json(HELP_SEEN_KEY, &true);
    assert!(!help_seen());
    assert_eq!(load_json::<bool>(SESSION_KEY), None);
}
