// Short stable content identifiers
//
// XXH3 (64-bit) over UTF-8 bytes, printed in base 36. Identical input always yields the same id
// on every platform, so server and client agree on stylesheet ids.
use xxhash_rust::xxh3::xxh3_64;

/// Separator between cache path segments
pub const PATH_SEPARATOR: &str = "%";

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(13);
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    buf.into_iter().map(char::from).collect()
}

/// Hash arbitrary text into a short id
pub fn hash(text: &str) -> String {
    to_base36(xxh3_64(text.as_bytes()))
}

/// Stylesheet id for a scope path plus its compiled text
pub fn unique_hash(path: &[String], css: &str) -> String {
    hash(&format!("{}{}", path.join(PATH_SEPARATOR), css))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_rendering() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u64::MAX), "3w5e11264sgsf");
    }

    #[test]
    fn hash_is_the_base36_xxh3_digest() {
        assert_eq!(hash(""), to_base36(xxh3_64(b"")));
        assert_eq!(hash("token%Button"), to_base36(xxh3_64(b"token%Button")));
        assert!(hash("x").len() <= 13);
    }

    #[test]
    fn hash_is_deterministic_and_content_sensitive() {
        let a = hash(".a{color:red;}");
        assert_eq!(a, hash(".a{color:red;}"));
        assert_ne!(a, hash(".a{color:blue;}"));
        assert!(a.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn unique_hash_covers_path_and_text() {
        let path = vec!["token".to_string(), "Button".to_string()];
        let other = vec!["token".to_string(), "Input".to_string()];
        assert_ne!(unique_hash(&path, "x"), unique_hash(&other, "x"));
        assert_eq!(unique_hash(&path, "x"), hash("token%Buttonx"));
    }
}
