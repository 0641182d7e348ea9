/// Attribute names that collide with DynamoDB reserved words, and the placeholder used
/// for each in projections.
///
/// This is not the full DynamoDB list. A reserved word missing from here (such as
/// `character`) is passed through literally and the request will be rejected by
/// DynamoDB rather than by us.
static RESERVED_WORDS: &[(&str, &str)] = &[
    ("comment", "#cmt"),
    ("count", "#cnt"),
    ("data", "#dat"),
    ("date", "#dt"),
    ("group", "#grp"),
    ("key", "#k"),
    ("location", "#loc"),
    ("name", "#n"),
    ("order", "#ord"),
    ("role", "#rl"),
    ("size", "#sz"),
    ("status", "#sts"),
    ("timestamp", "#ts"),
    ("type", "#typ"),
    ("user", "#usr"),
    ("value", "#vl"),
    ("year", "#yr"),
];

/// The placeholder for `field` if it is a known reserved word.
///
/// Matching ignores ASCII case, as DynamoDB does.
pub fn reserved_placeholder(field: &str) -> Option<&'static str> {
    RESERVED_WORDS
        .iter()
        .find(|(word, _)| word.eq_ignore_ascii_case(field))
        .map(|(_, placeholder)| *placeholder)
}

pub fn is_reserved(field: &str) -> bool {
    reserved_placeholder(field).is_some()
}
