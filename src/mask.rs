// 🔤 Mask Compiler - Serial number templates as matchers
// Turns a compact mask ("NNN-AA") into an anchored, reusable pattern
//
// Token alphabet:
//   N → digit 0-9
//   A → uppercase A-Z
//   a → lowercase a-z
//   X → alphanumeric (any case)
//   Z → one of '-', '_', '@'
//   anything else → literal character

use crate::error::{RegistryError, RegistryResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

// ============================================================================
// MASK POLICY
// ============================================================================

/// How characters outside the token table are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskPolicy {
    /// ASCII letters without a rule are rejected with `InvalidMaskToken`.
    /// Digits, punctuation and whitespace are literals.
    #[default]
    Strict,

    /// Every character without a rule is a literal. Never rejects a mask.
    Lenient,
}

impl MaskPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaskPolicy::Strict => "strict",
            MaskPolicy::Lenient => "lenient",
        }
    }
}

impl FromStr for MaskPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(MaskPolicy::Strict),
            "lenient" => Ok(MaskPolicy::Lenient),
            other => Err(format!("Unknown mask policy: {}", other)),
        }
    }
}

// ============================================================================
// MASK TOKENS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskToken {
    Digit,
    Upper,
    Lower,
    Alphanumeric,
    Symbol,
    Literal(char),
}

impl MaskToken {
    /// Rule for a table character, `None` when the character has no rule.
    fn from_rule(c: char) -> Option<MaskToken> {
        match c {
            'N' => Some(MaskToken::Digit),
            'A' => Some(MaskToken::Upper),
            'a' => Some(MaskToken::Lower),
            'X' => Some(MaskToken::Alphanumeric),
            'Z' => Some(MaskToken::Symbol),
            _ => None,
        }
    }

    /// Single-character regex class for this position.
    fn pattern(&self) -> String {
        match self {
            MaskToken::Digit => "[0-9]".to_string(),
            MaskToken::Upper => "[A-Z]".to_string(),
            MaskToken::Lower => "[a-z]".to_string(),
            MaskToken::Alphanumeric => "[A-Za-z0-9]".to_string(),
            MaskToken::Symbol => "[-_@]".to_string(),
            MaskToken::Literal(c) => regex::escape(&c.to_string()),
        }
    }

    /// Check a single character against this token.
    pub fn accepts(&self, c: char) -> bool {
        match self {
            MaskToken::Digit => c.is_ascii_digit(),
            MaskToken::Upper => c.is_ascii_uppercase(),
            MaskToken::Lower => c.is_ascii_lowercase(),
            MaskToken::Alphanumeric => c.is_ascii_alphanumeric(),
            MaskToken::Symbol => matches!(c, '-' | '_' | '@'),
            MaskToken::Literal(l) => *l == c,
        }
    }
}

/// Split a mask into tokens under the given policy.
pub fn tokenize(mask: &str, policy: MaskPolicy) -> RegistryResult<Vec<MaskToken>> {
    mask.chars()
        .enumerate()
        .map(|(position, c)| match MaskToken::from_rule(c) {
            Some(token) => Ok(token),
            None if policy == MaskPolicy::Strict && c.is_ascii_alphabetic() => {
                Err(RegistryError::InvalidMaskToken { token: c, position })
            }
            None => Ok(MaskToken::Literal(c)),
        })
        .collect()
}

// ============================================================================
// COMPILED MASK
// ============================================================================

/// Immutable matcher built from a mask string.
///
/// Matches the whole input: equal length, every position satisfying
/// the token at the same position.
#[derive(Debug, Clone)]
pub struct CompiledMask {
    tokens: Vec<MaskToken>,
    regex: Regex,
}

impl CompiledMask {
    pub fn new(mask: &str, policy: MaskPolicy) -> RegistryResult<Self> {
        let tokens = tokenize(mask, policy)?;

        let mut pattern = String::from("^");
        for token in &tokens {
            pattern.push_str(&token.pattern());
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|source| RegistryError::MaskCompile {
            mask: mask.to_string(),
            source,
        })?;

        Ok(CompiledMask {
            tokens,
            regex,
        })
    }

    pub fn tokens(&self) -> &[MaskToken] {
        &self.tokens
    }

    pub fn is_match(&self, serial_number: &str) -> bool {
        self.regex.is_match(serial_number)
    }
}

// ============================================================================
// MASK COMPILER
// ============================================================================

/// Compiles masks and keeps the matchers for reuse.
pub struct MaskCompiler {
    policy: MaskPolicy,
    cache: Arc<RwLock<HashMap<String, Arc<CompiledMask>>>>,
}

impl MaskCompiler {
    pub fn new(policy: MaskPolicy) -> Self {
        MaskCompiler {
            policy,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Compile a mask, or return the cached matcher for it.
    ///
    /// Masks that fail to compile are not cached.
    pub fn compile(&self, mask: &str) -> RegistryResult<Arc<CompiledMask>> {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(compiled) = cache.get(mask) {
                return Ok(Arc::clone(compiled));
            }
        }

        let compiled = Arc::new(CompiledMask::new(mask, self.policy)?);

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        let entry = cache
            .entry(mask.to_string())
            .or_insert_with(|| Arc::clone(&compiled));
        Ok(Arc::clone(entry))
    }

    /// Number of masks currently cached
    pub fn cached_count(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for MaskCompiler {
    fn default() -> Self {
        Self::new(MaskPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_token_class() {
        let compiler = MaskCompiler::default();

        let digit = compiler.compile("N").unwrap();
        assert!(digit.is_match("0"));
        assert!(digit.is_match("9"));
        assert!(!digit.is_match("a"));

        let upper = compiler.compile("A").unwrap();
        assert!(upper.is_match("Q"));
        assert!(!upper.is_match("q"));
        assert!(!upper.is_match("1"));

        let lower = compiler.compile("a").unwrap();
        assert!(lower.is_match("q"));
        assert!(!lower.is_match("Q"));

        let alnum = compiler.compile("X").unwrap();
        assert!(alnum.is_match("q"));
        assert!(alnum.is_match("Q"));
        assert!(alnum.is_match("5"));
        assert!(!alnum.is_match("-"));

        let symbol = compiler.compile("Z").unwrap();
        assert!(symbol.is_match("-"));
        assert!(symbol.is_match("_"));
        assert!(symbol.is_match("@"));
        assert!(!symbol.is_match("."));
    }

    #[test]
    fn test_full_string_match() {
        let compiler = MaskCompiler::default();
        let mask = compiler.compile("NNN-AA").unwrap();

        assert!(mask.is_match("123-AB"));
        assert!(mask.is_match("456-CD"));
        assert!(!mask.is_match("123-ABC"), "longer input must fail");
        assert!(!mask.is_match("123-A"), "shorter input must fail");
        assert!(!mask.is_match("x123-AB"), "no substring match");
        assert!(!mask.is_match("123_AB"), "literal must match exactly");
        assert!(!mask.is_match("123-AB\n"), "no trailing newline");
    }

    #[test]
    fn test_literals_are_escaped() {
        let compiler = MaskCompiler::default();
        let mask = compiler.compile("N.N*").unwrap();

        assert!(mask.is_match("1.2*"));
        assert!(!mask.is_match("1x2*"), "'.' is a literal, not a wildcard");
        assert!(!mask.is_match("1.22"));
    }

    #[test]
    fn test_empty_mask_matches_only_empty() {
        let compiler = MaskCompiler::default();
        let mask = compiler.compile("").unwrap();

        assert!(mask.is_match(""));
        assert!(!mask.is_match("1"));
    }

    #[test]
    fn test_strict_rejects_unknown_letter() {
        let compiler = MaskCompiler::new(MaskPolicy::Strict);

        match compiler.compile("NNB") {
            Err(RegistryError::InvalidMaskToken { token, position }) => {
                assert_eq!(token, 'B');
                assert_eq!(position, 2);
            }
            other => panic!("expected InvalidMaskToken, got {:?}", other),
        }
        assert_eq!(compiler.cached_count(), 0);
    }

    #[test]
    fn test_lenient_treats_unknown_letter_as_literal() {
        let compiler = MaskCompiler::new(MaskPolicy::Lenient);
        let mask = compiler.compile("SN-NNN").unwrap();

        // 'S' is literal, the second 'N' is a digit
        assert!(mask.is_match("S1-234"));
        assert!(!mask.is_match("T1-234"));
        assert_eq!(mask.tokens()[0], MaskToken::Literal('S'));
    }

    #[test]
    fn test_compiled_masks_are_cached() {
        let compiler = MaskCompiler::default();

        let first = compiler.compile("XXXX").unwrap();
        let second = compiler.compile("XXXX").unwrap();
        compiler.compile("NNNN").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(compiler.cached_count(), 2);
    }

    #[test]
    fn test_regex_agrees_with_token_classes() {
        let compiler = MaskCompiler::default();
        let masks = ["NAaXZ", "N-N", "XX@a", "ZZ"];
        let inputs = ["1Ab9_", "1-2", "aZ@b", "-@", "1Ab9", "1-22", "", "__"];

        for mask in masks {
            let compiled = compiler.compile(mask).unwrap();
            for input in inputs {
                let expected = input.chars().count() == compiled.tokens().len()
                    && compiled
                        .tokens()
                        .iter()
                        .zip(input.chars())
                        .all(|(token, c)| token.accepts(c));
                assert_eq!(
                    compiled.is_match(input),
                    expected,
                    "mask {:?} input {:?}",
                    mask,
                    input
                );
            }
        }
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("strict".parse::<MaskPolicy>().unwrap(), MaskPolicy::Strict);
        assert_eq!(" Lenient ".parse::<MaskPolicy>().unwrap(), MaskPolicy::Lenient);
        assert!("loose".parse::<MaskPolicy>().is_err());
    }
}
