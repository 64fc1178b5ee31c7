//! Identifier and subject key types.
//!
//! Colormaps are registered against opaque subjects: blocks, block states,
//! dimensions and fluids. Each subject kind gets its own key type so the
//! storage tables cannot mix them up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::ColormapError;

/// Namespace assumed when an identifier omits one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Namespaced resource identifier (`namespace:path`).
///
/// Cheap to clone; the backing string is shared.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    full: Arc<str>,
    split: usize,
}

impl Identifier {
    /// Parses `namespace:path` or a bare `path` (default namespace).
    pub fn parse(raw: &str) -> Result<Self, ColormapError> {
        let raw = raw.trim();
        let (namespace, path) = match raw.split_once(':') {
            Some((ns, path)) => (ns, path),
            None => (DEFAULT_NAMESPACE, raw),
        };

        let valid_ns = !namespace.is_empty()
            && namespace
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"_-.".contains(&b));
        let valid_path = !path.is_empty()
            && path
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"_-./".contains(&b));

        if !valid_ns || !valid_path {
            return Err(ColormapError::InvalidIdentifier(raw.to_string()));
        }

        Ok(Self {
            full: format!("{namespace}:{path}").into(),
            split: namespace.len(),
        })
    }

    /// Creates an identifier in the default namespace.
    ///
    /// Intended for built-in constant tables; the path is not validated.
    #[must_use]
    pub fn vanilla(path: &str) -> Self {
        Self {
            full: format!("{DEFAULT_NAMESPACE}:{path}").into(),
            split: DEFAULT_NAMESPACE.len(),
        }
    }

    /// Returns the namespace part.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.full[..self.split]
    }

    /// Returns the path part.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.full[self.split + 1..]
    }

    /// Returns the full `namespace:path` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl TryFrom<String> for Identifier {
    type Error = ColormapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.full.to_string()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.full)
    }
}

/// Key for block colormaps (grass, leaves, vines, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockKey(pub Identifier);

/// Key for fluid colormaps (fog inside water, lava, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FluidKey(pub Identifier);

/// Key for per-dimension sky and fog colormaps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DimensionKey(pub Identifier);

macro_rules! identifier_key {
    ($key:ident) => {
        impl $key {
            /// Parses the key from an identifier string.
            pub fn parse(raw: &str) -> Result<Self, ColormapError> {
                Identifier::parse(raw).map(Self)
            }

            /// Returns the underlying identifier.
            #[must_use]
            pub fn id(&self) -> &Identifier {
                &self.0
            }
        }

        impl fmt::Display for $key {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

identifier_key!(BlockKey);
identifier_key!(FluidKey);
identifier_key!(DimensionKey);

impl DimensionKey {
    /// The overworld dimension.
    #[must_use]
    pub fn overworld() -> Self {
        Self(Identifier::vanilla("overworld"))
    }
}

/// Key for a single block state: the block plus a canonical property list.
///
/// Written as `block[prop=value,...]`; properties are stored sorted so two
/// spellings of the same state compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockStateKey {
    /// Owning block
    pub block: Identifier,
    /// Sorted `name=value` pairs joined with commas
    pub properties: Arc<str>,
}

impl BlockStateKey {
    /// Parses `namespace:block[name=value,...]`.
    pub fn parse(raw: &str) -> Result<Self, ColormapError> {
        let raw = raw.trim();
        let (block, props) = match raw.split_once('[') {
            Some((block, rest)) => {
                let inner = rest
                    .strip_suffix(']')
                    .ok_or_else(|| ColormapError::InvalidIdentifier(raw.to_string()))?;
                (block, inner)
            },
            None => (raw, ""),
        };

        let mut pairs = Vec::new();
        for pair in props.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| ColormapError::InvalidIdentifier(raw.to_string()))?;
            pairs.push(format!("{}={}", name.trim(), value.trim()));
        }
        pairs.sort();

        Ok(Self {
            block: Identifier::parse(block)?,
            properties: pairs.join(",").into(),
        })
    }
}

impl TryFrom<String> for BlockStateKey {
    type Error = ColormapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BlockStateKey> for String {
    fn from(value: BlockStateKey) -> Self {
        value.to_string()
    }
}

impl fmt::Display for BlockStateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.properties.is_empty() {
            write!(f, "{}", self.block)
        } else {
            write!(f, "{}[{}]", self.block, self.properties)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_parse() {
        let id = Identifier::parse("mymod:glow_forest").expect("valid");
        assert_eq!(id.namespace(), "mymod");
        assert_eq!(id.path(), "glow_forest");
        assert_eq!(id.as_str(), "mymod:glow_forest");
    }

    #[test]
    fn test_identifier_rejects_uppercase() {
        assert!(Identifier::parse("Plains").is_err());
        assert!(Identifier::parse("minecraft:").is_err());
        assert!(Identifier::parse(":plains").is_err());
    }

    #[test]
    fn test_vanilla_equals_parsed() {
        let parsed = Identifier::parse("minecraft:plains").expect("valid");
        assert_eq!(parsed, Identifier::vanilla("plains"));
    }

    #[test]
    fn test_block_state_canonical_order() {
        let a = BlockStateKey::parse("minecraft:vine[west=true,east=false]").expect("valid");
        let b = BlockStateKey::parse("vine[ east=false , west=true ]").expect("valid");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "minecraft:vine[east=false,west=true]");
    }

    #[test]
    fn test_block_state_without_properties() {
        let key = BlockStateKey::parse("minecraft:grass_block").expect("valid");
        assert!(key.properties.is_empty());
        assert_eq!(key.to_string(), "minecraft:grass_block");
    }

    #[test]
    fn test_block_state_toml_roundtrip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Targets {
            states: Vec<BlockStateKey>,
        }

        let parsed: Targets =
            toml::from_str(r#"states = ["vine[west=true,east=false]", "minecraft:grass_block"]"#)
                .expect("valid toml");
        assert_eq!(
            parsed.states[0],
            BlockStateKey::parse("minecraft:vine[east=false,west=true]").expect("valid")
        );

        let text = toml::to_string(&parsed).expect("serialize");
        assert!(text.contains("minecraft:vine[east=false,west=true]"));
        let back: Targets = toml::from_str(&text).expect("reparse");
        assert_eq!(back, parsed);
    }

    #[test]
    fn test_block_state_rejects_bad_string_on_deserialize() {
        #[derive(Debug, Deserialize)]
        struct Targets {
            #[allow(dead_code)]
            states: Vec<BlockStateKey>,
        }

        assert!(toml::from_str::<Targets>(r#"states = ["vine[west"]"#).is_err());
    }

    #[test]
    fn test_block_state_unterminated() {
        assert!(BlockStateKey::parse("minecraft:vine[west=true").is_err());
    }
}
