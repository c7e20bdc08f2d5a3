use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest, Sha1};

use crate::error::{TypeError, TypeResult};

/// Width of a [`ContentHash`] in bytes.
pub const HASH_LEN: usize = 20;

/// Hex digits per group in the grouped text formats.
const GROUP_LEN: usize = 8;
const GROUP_COUNT: usize = HASH_LEN * 2 / GROUP_LEN;

/// SHA-1 digest identifying a piece of content.
///
/// Ordering is the unsigned big-endian comparison of the raw bytes, so
/// sorting hashes sorts their `N`-formatted text the same way.
///
/// Two values must not be confused: [`ContentHash::EMPTY`] (all zeros) is the
/// identity of *absent* input, while `ContentHash::hash(b"")` is the real
/// digest of zero bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ContentHash([u8; HASH_LEN]);

/// Text layouts understood by [`ContentHash::format`] and [`ContentHash::parse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HashFormat {
    /// `N`: 40 contiguous lowercase hex digits.
    #[default]
    Plain,
    /// `D`: five groups of eight digits joined by `-`.
    Dashed,
    /// `S`: five groups of eight digits joined by a space.
    Spaced,
}

impl HashFormat {
    /// Resolve a single-letter format specifier, ignoring case.
    pub fn from_spec(spec: &str) -> TypeResult<Self> {
        match spec {
            "N" | "n" => Ok(Self::Plain),
            "D" | "d" => Ok(Self::Dashed),
            "S" | "s" => Ok(Self::Spaced),
            "" => Err(TypeError::format(spec, "format specifier must not be empty")),
            _ => Err(TypeError::format(
                spec,
                "format specifier must be one of N, D or S",
            )),
        }
    }

    fn separator(self) -> Option<char> {
        match self {
            Self::Plain => None,
            Self::Dashed => Some('-'),
            Self::Spaced => Some(' '),
        }
    }
}

impl ContentHash {
    /// The all-zero identity of absent input.
    pub const EMPTY: Self = Self([0u8; HASH_LEN]);

    /// SHA-1 over the exact byte sequence.
    pub fn hash(data: &[u8]) -> Self {
        let digest = Sha1::digest(data);
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(&digest);
        Self(out)
    }

    /// SHA-1 over the UTF-8 encoding of `text`.
    pub fn hash_str(text: &str) -> Self {
        Self::hash(text.as_bytes())
    }

    /// Hash optional input; `None` yields [`ContentHash::EMPTY`].
    pub fn hash_opt(data: Option<&[u8]>) -> Self {
        data.map_or(Self::EMPTY, Self::hash)
    }

    /// Wrap a pre-computed digest.
    pub const fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Copy a digest out of a slice that must be exactly [`HASH_LEN`] long.
    pub fn from_slice(bytes: &[u8]) -> TypeResult<Self> {
        let arr: [u8; HASH_LEN] = bytes.try_into().map_err(|_| TypeError::InvalidLength {
            expected: HASH_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// `true` for [`ContentHash::EMPTY`].
    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; HASH_LEN]
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Lowercase hex, the `N` format.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First eight hex digits, for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Render using a single-letter specifier (`N`, `D` or `S`, any case).
    ///
    /// An empty or unknown specifier is a format error rather than a silent
    /// fallback to `N`.
    pub fn format(&self, spec: &str) -> TypeResult<String> {
        Ok(self.to_formatted(HashFormat::from_spec(spec)?))
    }

    /// Render in `format`.
    pub fn to_formatted(&self, format: HashFormat) -> String {
        let plain = self.to_hex();
        let Some(sep) = format.separator() else {
            return plain;
        };
        let mut out = String::with_capacity(plain.len() + GROUP_COUNT - 1);
        for (i, group) in plain.as_bytes().chunks(GROUP_LEN).enumerate() {
            if i > 0 {
                out.push(sep);
            }
            // chunks of an ASCII hex string are ASCII
            out.extend(group.iter().map(|&b| b as char));
        }
        out
    }

    /// Parse any of the three text formats, with an optional `0x` prefix.
    pub fn parse(text: &str) -> TypeResult<Self> {
        if text.trim().is_empty() {
            return Err(TypeError::format(text, "hash text is empty"));
        }
        if text.trim() != text {
            return Err(TypeError::format(
                text,
                "hash text has leading or trailing whitespace",
            ));
        }

        let body = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);

        let digits = match body.len() {
            n if n == HASH_LEN * 2 => body.to_string(),
            n if n == HASH_LEN * 2 + GROUP_COUNT - 1 => ungroup(text, body)?,
            n => {
                return Err(TypeError::format(
                    text,
                    format!("expected 40 hex digits or 5 groups of 8, got {n} characters"),
                ))
            }
        };

        let bytes = hex::decode(&digits).map_err(|e| TypeError::format(text, e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

/// Strip the separators out of a `D` or `S` formatted body.
fn ungroup(text: &str, body: &str) -> TypeResult<String> {
    let sep = match body.as_bytes()[GROUP_LEN] {
        b'-' => '-',
        b' ' => ' ',
        _ => return Err(TypeError::format(text, "unsupported group separator")),
    };
    let groups: Vec<&str> = body.split(sep).collect();
    if groups.len() != GROUP_COUNT || groups.iter().any(|g| g.len() != GROUP_LEN) {
        return Err(TypeError::format(
            text,
            format!("expected {GROUP_COUNT} groups of {GROUP_LEN} hex digits separated by {sep:?}"),
        ));
    }
    Ok(groups.concat())
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; HASH_LEN]> for ContentHash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ContentHash> for [u8; HASH_LEN] {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

impl AsRef<[u8]> for ContentHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Hex text for human-readable formats, raw bytes otherwise.
impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_str(HashVisitor)
        } else {
            deserializer.deserialize_bytes(HashVisitor)
        }
    }
}

struct HashVisitor;

impl<'de> Visitor<'de> for HashVisitor {
    type Value = ContentHash;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 20-byte SHA-1 digest or its hex text")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        ContentHash::parse(v).map_err(E::custom)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        ContentHash::from_slice(v).map_err(E::custom)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut out = [0u8; HASH_LEN];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        Ok(ContentHash(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ABC: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";

    // -----------------------------------------------------------------------
    // Hashing
    // -----------------------------------------------------------------------

    #[test]
    fn absent_input_is_empty() {
        assert_eq!(ContentHash::hash_opt(None), ContentHash::EMPTY);
        assert_eq!(ContentHash::EMPTY, ContentHash::from_bytes([0u8; HASH_LEN]));
        assert_eq!(ContentHash::EMPTY, ContentHash::default());
        assert!(ContentHash::EMPTY.is_empty());
    }

    #[test]
    fn zero_length_input_is_not_empty() {
        let h = ContentHash::hash(b"");
        assert_eq!(h.to_hex(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_ne!(h, ContentHash::EMPTY);
        assert_eq!(ContentHash::hash_opt(Some(&b""[..])), h);
    }

    #[test]
    fn known_vectors() {
        assert_eq!(ContentHash::hash_str("abc").to_hex(), ABC);
        assert_eq!(
            ContentHash::hash_str("abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq")
                .to_hex(),
            "84983e441c3bd26ebaae4aa1f95129e5e54670f1"
        );
        assert_eq!(
            ContentHash::hash_str(&"a".repeat(1_000_000)).to_hex(),
            "34aa973cd4c4daa4f61eeb2bdbad27316534016f"
        );
    }

    #[test]
    fn control_strings_never_hash_to_empty() {
        for n in 1..50 {
            let text = "\0".repeat(n);
            assert_ne!(ContentHash::hash_str(&text), ContentHash::EMPTY);
        }
    }

    #[test]
    fn from_slice_checks_length() {
        let h = ContentHash::hash_str("abc");
        assert_eq!(ContentHash::from_slice(h.as_bytes()).unwrap(), h);
        assert_eq!(
            ContentHash::from_slice(&[1, 2, 3]),
            Err(TypeError::InvalidLength {
                expected: HASH_LEN,
                actual: 3
            })
        );
    }

    // -----------------------------------------------------------------------
    // Formatting
    // -----------------------------------------------------------------------

    #[test]
    fn format_specifiers() {
        let h = ContentHash::parse(ABC).unwrap();
        assert_eq!(h.to_string(), ABC);
        assert_eq!(h.format("N").unwrap(), ABC);
        assert_eq!(h.format("n").unwrap(), ABC);

        let dashed = "a9993e36-4706816a-ba3e2571-7850c26c-9cd0d89d";
        assert_eq!(h.format("D").unwrap(), dashed);
        assert_eq!(h.format("d").unwrap(), dashed);

        let spaced = "a9993e36 4706816a ba3e2571 7850c26c 9cd0d89d";
        assert_eq!(h.format("S").unwrap(), spaced);
        assert_eq!(h.format("s").unwrap(), spaced);
    }

    #[test]
    fn bad_format_specifiers() {
        let h = ContentHash::hash_str("abc");
        for spec in ["", " ", "x", "nn", "DD"] {
            assert!(
                matches!(h.format(spec), Err(TypeError::Format { .. })),
                "{spec:?} should be rejected"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parse_accepts_all_formats_with_optional_prefix() {
        let h = ContentHash::hash_str("abc");
        for format in [HashFormat::Plain, HashFormat::Dashed, HashFormat::Spaced] {
            let text = h.to_formatted(format);
            assert_eq!(ContentHash::parse(&text).unwrap(), h);
            assert_eq!(ContentHash::parse(&format!("0x{text}")).unwrap(), h);
        }
        assert_eq!(ContentHash::parse(&ABC.to_uppercase()).unwrap(), h);
    }

    #[test]
    fn parse_rejects_trailing_digit() {
        let h = ContentHash::hash_str("abc");
        for format in [HashFormat::Plain, HashFormat::Dashed, HashFormat::Spaced] {
            let text = format!("{}a", h.to_formatted(format));
            assert!(ContentHash::parse(&text).is_err(), "{text}");
        }
    }

    #[test]
    fn parse_rejects_malformed_text() {
        let cases = [
            "",
            "  ",
            "0x",
            " a9993e364706816aba3e25717850c26c9cd0d89d",
            "a9993e364706816aba3e25717850c26c9cd0d89d ",
            "a9993e364706816aba3e25717850c26c9cd0d89",
            "g9993e364706816aba3e25717850c26c9cd0d89d",
            "a9993e36_4706816a_ba3e2571_7850c26c_9cd0d89d",
            "a9993e36-4706816a ba3e2571-7850c26c-9cd0d89d",
            "a9993e3-64706816a-ba3e2571-7850c26c-9cd0d89d",
        ];
        for text in cases {
            assert!(
                matches!(ContentHash::parse(text), Err(TypeError::Format { .. })),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn empty_round_trips_through_text() {
        let empty = ContentHash::EMPTY;
        assert_eq!(ContentHash::parse(&empty.to_string()).unwrap(), empty);
        assert_eq!(
            ContentHash::parse(&empty.format("D").unwrap()).unwrap(),
            empty
        );
        assert_eq!(
            ContentHash::parse(&format!("0x{}", empty.format("S").unwrap())).unwrap(),
            empty
        );
    }

    // -----------------------------------------------------------------------
    // Ordering & serde
    // -----------------------------------------------------------------------

    #[test]
    fn ordering_is_big_endian_unsigned() {
        let mut low = [0u8; HASH_LEN];
        low[HASH_LEN - 1] = 0xff;
        let mut high = [0u8; HASH_LEN];
        high[0] = 0x01;
        assert!(ContentHash::from_bytes(low) < ContentHash::from_bytes(high));
        assert!(ContentHash::from_bytes([0x80; HASH_LEN]) > ContentHash::from_bytes([0x7f; HASH_LEN]));
        assert!(ContentHash::EMPTY < ContentHash::hash(b""));
    }

    #[test]
    fn serde_json_uses_hex() {
        let h = ContentHash::hash_str("abc");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{ABC}\""));
        let parsed: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, h);
    }

    #[test]
    fn serde_bincode_uses_raw_bytes() {
        let h = ContentHash::hash_str("abc");
        let bytes = bincode::serialize(&h).unwrap();
        // u64 length prefix plus the digest
        assert_eq!(bytes.len(), 8 + HASH_LEN);
        let parsed: ContentHash = bincode::deserialize(&bytes).unwrap();
        assert_eq!(parsed, h);
    }

    proptest! {
        #[test]
        fn text_formats_round_trip(bytes in proptest::array::uniform20(any::<u8>())) {
            let h = ContentHash::from_bytes(bytes);
            for spec in ["N", "D", "S"] {
                let text = h.format(spec).unwrap();
                prop_assert_eq!(ContentHash::parse(&text).unwrap(), h);
            }
        }

        #[test]
        fn order_matches_plain_text_order(a in proptest::array::uniform20(any::<u8>()),
                                          b in proptest::array::uniform20(any::<u8>())) {
            let (ha, hb) = (ContentHash::from_bytes(a), ContentHash::from_bytes(b));
            prop_assert_eq!(ha.cmp(&hb), ha.to_hex().cmp(&hb.to_hex()));
        }
    }
}
