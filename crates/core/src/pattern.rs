// User-supplied regex check

use crate::types::ValidationResult;
use regex::{Regex, RegexBuilder};
use regex_syntax::ast::{
    self, parse::ParserBuilder, Assertion, AssertionKind, Ast, ClassPerl, ClassPerlKind,
    ClassSetItem, Visitor,
};
use std::convert::Infallible;
use std::fmt;
use std::ops::Range;

/// Upper bound on the compiled program size of a user pattern.
pub const COMPILED_SIZE_LIMIT: usize = 1 << 20;

/// Flag bits accepted by [`RegexFlags::from_bits`].
pub mod bits {
    pub const IGNORECASE: u32 = 2;
    pub const MULTILINE: u32 = 8;
    pub const DOTALL: u32 = 16;
    pub const VERBOSE: u32 = 64;
    pub const ASCII: u32 = 256;
}

/// Matching semantics requested alongside a pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    /// `i`
    pub ignore_case: bool,
    /// `m`: `^`/`$` match at line boundaries
    pub multi_line: bool,
    /// `s`: `.` also matches `\n`
    pub dot_all: bool,
    /// `x`: whitespace and `#` comments in the pattern are ignored
    pub verbose: bool,
    /// `a`: `\d`, `\w`, `\s`, their negations and `\b` are ASCII-only
    pub ascii: bool,
}

impl RegexFlags {
    /// Parse a flag string such as `"im"`.
    ///
    /// Letters are case-insensitive, order and repetition do not matter,
    /// and letters outside `imsxa` are ignored.
    pub fn parse(letters: &str) -> Self {
        let mut flags = Self::default();
        for c in letters.chars() {
            match c.to_ascii_lowercase() {
                'i' => flags.ignore_case = true,
                'm' => flags.multi_line = true,
                's' => flags.dot_all = true,
                'x' => flags.verbose = true,
                'a' => flags.ascii = true,
                _ => {}
            }
        }
        flags
    }

    /// Decode an integer flag set. Unknown bits are ignored.
    pub fn from_bits(value: u32) -> Self {
        Self {
            ignore_case: value & bits::IGNORECASE != 0,
            multi_line: value & bits::MULTILINE != 0,
            dot_all: value & bits::DOTALL != 0,
            verbose: value & bits::VERBOSE != 0,
            ascii: value & bits::ASCII != 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Human-readable names of the active flags, always in `i, m, s, x, a` order.
    pub fn descriptions(&self) -> Vec<&'static str> {
        [
            (self.ignore_case, "case-insensitive"),
            (self.multi_line, "multiline"),
            (self.dot_all, "dotall"),
            (self.verbose, "verbose"),
            (self.ascii, "ASCII-only"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}

impl From<&str> for RegexFlags {
    fn from(letters: &str) -> Self {
        Self::parse(letters)
    }
}

/// A user pattern that failed to compile.
#[derive(Debug, thiserror::Error)]
#[error("Invalid regex pattern: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    source: regex::Error,
}

/// A user pattern compiled with its flags. Owned by a single check call.
pub struct CompiledPattern {
    pattern: String,
    flags: RegexFlags,
    regex: Regex,
}

impl CompiledPattern {
    pub fn compile(pattern: &str, flags: RegexFlags) -> Result<Self, PatternError> {
        let source = if flags.ascii {
            ascii_classes(pattern, flags.verbose)
        } else {
            pattern.to_string()
        };

        let regex = RegexBuilder::new(&source)
            .case_insensitive(flags.ignore_case)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .ignore_whitespace(flags.verbose)
            .size_limit(COMPILED_SIZE_LIMIT)
            .build()
            .map_err(|source| PatternError {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            pattern: pattern.to_string(),
            flags,
            regex,
        })
    }

    pub fn flags(&self) -> RegexFlags {
        self.flags
    }

    /// Unanchored search for the first occurrence in `text`.
    pub fn find(&self, text: &str) -> Option<String> {
        self.regex.find(text).map(|m| m.as_str().to_string())
    }
}

/// Rewrite the Perl classes and `\b` of `pattern` into ASCII-only forms.
///
/// Everything else keeps Unicode semantics. A pattern that does not parse
/// is returned as-is so compilation reports the original diagnostic.
fn ascii_classes(pattern: &str, verbose: bool) -> String {
    let Ok(parsed) = ParserBuilder::new()
        .ignore_whitespace(verbose)
        .build()
        .parse(pattern)
    else {
        return pattern.to_string();
    };

    let mut edits = ast::visit(&parsed, AsciiRewrites::default()).unwrap_or_default();
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));

    let mut source = pattern.to_string();
    for (range, replacement) in edits {
        source.replace_range(range, replacement);
    }
    source
}

/// Byte ranges of the nodes to replace, with their replacements.
#[derive(Default)]
struct AsciiRewrites {
    edits: Vec<(Range<usize>, &'static str)>,
}

impl AsciiRewrites {
    fn push(&mut self, span: &ast::Span, replacement: &'static str) {
        self.edits
            .push((span.start.offset..span.end.offset, replacement));
    }

    fn push_class(&mut self, class: &ClassPerl) {
        // Nested brackets are valid both inside and outside a class.
        let replacement = match (&class.kind, class.negated) {
            (ClassPerlKind::Digit, false) => "[0-9]",
            (ClassPerlKind::Digit, true) => "[^0-9]",
            (ClassPerlKind::Word, false) => "[0-9A-Za-z_]",
            (ClassPerlKind::Word, true) => "[^0-9A-Za-z_]",
            (ClassPerlKind::Space, false) => r"[\t\n\x0B\x0C\r\x20]",
            (ClassPerlKind::Space, true) => r"[^\t\n\x0B\x0C\r\x20]",
        };
        self.push(&class.span, replacement);
    }

    fn push_assertion(&mut self, assertion: &Assertion) {
        // `(?-u:\B)` can split a code point, so `\B` stays Unicode.
        if assertion.kind == AssertionKind::WordBoundary {
            self.push(&assertion.span, r"(?-u:\b)");
        }
    }
}

impl Visitor for AsciiRewrites {
    type Output = Vec<(Range<usize>, &'static str)>;
    type Err = Infallible;

    fn finish(self) -> Result<Self::Output, Self::Err> {
        Ok(self.edits)
    }

    fn visit_pre(&mut self, node: &Ast) -> Result<(), Self::Err> {
        match node {
            Ast::ClassPerl(class) => self.push_class(class),
            Ast::Assertion(assertion) => self.push_assertion(assertion),
            _ => {}
        }
        Ok(())
    }

    fn visit_class_set_item_pre(&mut self, item: &ClassSetItem) -> Result<(), Self::Err> {
        if let ClassSetItem::Perl(class) = item {
            self.push_class(class);
        }
        Ok(())
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("pattern", &self.pattern)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Search `text` for `pattern` using a letter flag string.
pub fn validate_regex(text: &str, pattern: &str, flags: &str) -> ValidationResult {
    validate_regex_with_flags(text, pattern, RegexFlags::parse(flags))
}

pub fn validate_regex_with_flags(text: &str, pattern: &str, flags: RegexFlags) -> ValidationResult {
    let compiled = match CompiledPattern::compile(pattern, flags) {
        Ok(compiled) => compiled,
        Err(e) => {
            tracing::debug!(pattern = %e.pattern, "user pattern rejected");
            return ValidationResult::new(false, text, e.to_string()).with_pattern(pattern);
        }
    };

    match compiled.find(text) {
        Some(matched) => {
            let names = compiled.flags().descriptions();
            let message = if names.is_empty() {
                "Pattern matched".to_string()
            } else {
                format!("Pattern matched ({})", names.join(", "))
            };
            ValidationResult::new(true, text, message)
                .with_pattern(pattern)
                .with_match(matched)
        }
        None => ValidationResult::new(false, text, "Pattern did not match").with_pattern(pattern),
    }
}
