//! Shader Source Model
//!
//! A shader stage is an ordered list of text fragments plus an ordered list
//! of define tokens. Fragment order is significant: later fragments may
//! reference symbols declared by earlier ones.
//!
//! Derivation rules never mutate a base program's sources in place; they
//! clone, rewrite and hand the result to the shader cache.

use super::shader_defines::ShaderDefines;
use super::shader_text;

/// One shader stage (vertex or fragment).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShaderSource {
    fragments: Vec<String>,
    defines: ShaderDefines,
}

impl ShaderSource {
    #[must_use]
    pub fn new(fragments: Vec<String>, defines: ShaderDefines) -> Self {
        Self { fragments, defines }
    }

    /// Source made of fragments only, without defines.
    #[must_use]
    pub fn from_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            defines: ShaderDefines::new(),
        }
    }

    /// Builder-style define list replacement.
    #[must_use]
    pub fn with_defines(mut self, defines: ShaderDefines) -> Self {
        self.defines = defines;
        self
    }

    #[inline]
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    #[inline]
    #[must_use]
    pub fn defines(&self) -> &ShaderDefines {
        &self.defines
    }

    #[inline]
    pub fn defines_mut(&mut self) -> &mut ShaderDefines {
        &mut self.defines
    }

    /// Returns the fragment list with every `main` entry point renamed to
    /// `new_name`. Fragments without an entry point are copied unchanged.
    #[must_use]
    pub fn rename_entry_point(&self, new_name: &str) -> Vec<String> {
        self.fragments
            .iter()
            .map(|fragment| shader_text::replace_main(fragment, new_name).into_owned())
            .collect()
    }

    /// Renames the entry point of every fragment in place.
    pub fn rename_entry_point_in_place(&mut self, new_name: &str) {
        self.fragments = self.rename_entry_point(new_name);
    }

    pub fn append_fragment(&mut self, text: impl Into<String>) {
        self.fragments.push(text.into());
    }

    /// See [`ShaderDefines::replace`].
    pub fn replace_define(&mut self, name: &str, value: &str) -> bool {
        self.defines.replace(name, value)
    }

    /// Returns `true` if any fragment contains `word` as a whole identifier.
    #[must_use]
    pub fn any_fragment_contains_word(&self, word: &str) -> bool {
        self.fragments
            .iter()
            .any(|fragment| shader_text::contains_word(fragment, word))
    }

    /// Returns `true` if any fragment calls `name` after whitespace.
    #[must_use]
    pub fn any_fragment_calls(&self, name: &str) -> bool {
        self.fragments
            .iter()
            .any(|fragment| shader_text::contains_call(fragment, name))
    }

    /// Final stage text: one `#define` line per token, then the fragments
    /// joined by newlines.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut out = String::new();
        for token in self.defines.iter() {
            out.push_str("#define ");
            out.push_str(token);
            out.push('\n');
        }
        out.push_str(&self.fragments.join("\n"));
        out
    }
}
