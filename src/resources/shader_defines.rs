//! Shader Define Tokens
//!
//! An ordered list of preprocessor define tokens for one shader stage. Each
//! token is either a bare flag (`"LOG_DEPTH"`) or a `NAME VALUE` pair
//! (`"METADATA_PICKING_VALUE_TYPE float"`), and is emitted as
//! `#define <token>` in list order.
//!
//! Template tokens (everything added through [`ShaderDefines::push`]) are
//! interned [`Symbol`]s, so flag lookups are integer comparisons and clones
//! copy a small vector of integers. Values written by
//! [`ShaderDefines::replace`] are per-property and are kept as owned strings
//! instead, so they never accumulate in the global interner.
//!
//! Unlike a keyed map, adding a token never deduplicates: order and
//! multiplicity are preserved exactly. Only [`ShaderDefines::replace`]
//! matches by name.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::utils::interner::{self, Symbol};

#[derive(Debug, Clone)]
enum DefineToken {
    Interned(Symbol),
    Owned(Arc<str>),
}

impl DefineToken {
    #[inline]
    fn as_str(&self) -> &str {
        match self {
            Self::Interned(sym) => interner::resolve(*sym),
            Self::Owned(text) => text,
        }
    }
}

// Equality and hashing follow the token text, whatever the storage.
impl PartialEq for DefineToken {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Interned(a), Self::Interned(b)) => a == b,
            _ => self.as_str() == other.as_str(),
        }
    }
}

impl Eq for DefineToken {}

impl Hash for DefineToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

/// Ordered define tokens of a shader stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShaderDefines {
    tokens: SmallVec<[DefineToken; 8]>,
}

impl ShaderDefines {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: SmallVec::new(),
        }
    }

    /// Appends a token. Existing tokens with the same name are kept.
    pub fn push(&mut self, token: &str) {
        self.tokens.push(DefineToken::Interned(interner::intern(token)));
    }

    /// Appends an already interned token.
    #[inline]
    pub fn push_symbol(&mut self, token: Symbol) {
        self.tokens.push(DefineToken::Interned(token));
    }

    /// Returns `true` if a token equal to `token` is present.
    ///
    /// This is an exact match: `"LOG_DEPTH"` does not match `"LOG_DEPTH 1"`.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.iter().any(|t| t == token)
    }

    #[must_use]
    pub fn contains_symbol(&self, token: Symbol) -> bool {
        let text = interner::resolve(token);
        self.tokens.iter().any(|t| match t {
            DefineToken::Interned(sym) => *sym == token,
            DefineToken::Owned(owned) => &**owned == text,
        })
    }

    /// Returns `true` if any token's identifier equals `name`.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.iter().any(|token| define_name(token) == name)
    }

    /// Replaces the first token whose identifier equals `name` with
    /// `"{name} {value}"`.
    ///
    /// Returns `false` (and leaves the list untouched) when no such token
    /// exists; templates are expected to declare placeholder defines.
    pub fn replace(&mut self, name: &str, value: &str) -> bool {
        let position = self
            .tokens
            .iter()
            .position(|token| define_name(token.as_str()) == name);

        match position {
            Some(idx) => {
                self.tokens[idx] = DefineToken::Owned(Arc::from(format!("{name} {value}")));
                true
            }
            None => false,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterates tokens as strings, in order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens.iter().map(DefineToken::as_str)
    }

    /// Compute content hash (for caching)
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        use std::hash::BuildHasher;

        rustc_hash::FxBuildHasher.hash_one(self)
    }
}

/// Identifier part of a define token (`"NAME VALUE"` → `"NAME"`).
#[must_use]
pub fn define_name(token: &str) -> &str {
    token.split_whitespace().next().unwrap_or("")
}

impl<'a> FromIterator<&'a str> for ShaderDefines {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            tokens: iter
                .into_iter()
                .map(|token| DefineToken::Interned(interner::intern(token)))
                .collect(),
        }
    }
}

impl From<&[&str]> for ShaderDefines {
    fn from(tokens: &[&str]) -> Self {
        tokens.iter().copied().collect()
    }
}
