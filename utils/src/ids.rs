use nanoid::nanoid;

const RUN_ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Unique run identifier; lowercase alphanumeric so it is safe in work
/// directory names, image tags and state keys.
pub fn new_run_id() -> String {
    format!("run-{}", nanoid!(12, &RUN_ID_ALPHABET))
}
