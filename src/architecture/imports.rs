//! Import extraction and resolution.
//!
//! Extraction is lexical: comments, template literal bodies and regex literals are
//! blanked first, so import-looking text inside them is ignored, then two patterns
//! pick up the `... from '<specifier>'` and side-effect `import '<specifier>'`
//! shapes. Matches that begin inside a string literal are dropped.

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static FROM_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"\b(?:import|export)\b[\w*$\{\},\s]+?\bfrom\s*["']([^"'\r\n]+)["']"#)
		.expect("valid from-clause pattern")
});

static SIDE_EFFECT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"\bimport\s*["']([^"'\r\n]+)["']"#).expect("valid side-effect pattern")
});

/// Raw import specifiers in first-seen order, without duplicates.
pub fn extract_imports(content: &str) -> Vec<String> {
	let lexed = Lexed::new(content);
	let cleaned = lexed.text.as_str();

	let mut found: Vec<(usize, &str)> = FROM_CLAUSE
		.captures_iter(cleaned)
		.chain(SIDE_EFFECT.captures_iter(cleaned))
		.filter(|cap| cap.get(0).is_some_and(|m| !lexed.in_string(m.start())))
		.filter_map(|cap| cap.get(1))
		.map(|m| (m.start(), m.as_str().trim()))
		.filter(|(_, specifier)| !specifier.is_empty())
		.collect();
	found.sort_by_key(|(pos, _)| *pos);

	let mut seen = BTreeSet::new();
	found
		.into_iter()
		.filter(|(_, specifier)| seen.insert(*specifier))
		.map(|(_, specifier)| specifier.to_string())
		.collect()
}

/// Words after which a `/` starts a regular expression rather than a division.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
	"return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
	"do", "else", "yield", "await",
];

#[derive(Clone, Copy, PartialEq)]
enum Lex {
	Code,
	LineComment,
	BlockComment,
	Quoted(char),
	Template,
	Regex { in_class: bool },
}

/// Source text with comments, template literal bodies and regex literals replaced
/// by spaces. Byte offsets and line breaks are unchanged. Ordinary string literals
/// are kept since specifiers live in them; their byte ranges are recorded so that
/// import-looking text inside a string can be told apart from a statement.
struct Lexed {
	text: String,
	strings: Vec<Range<usize>>,
}

impl Lexed {
	fn new(content: &str) -> Self {
		let mut out = String::with_capacity(content.len());
		let mut strings = Vec::new();
		let mut state = Lex::Code;
		let mut chars = content.chars().peekable();
		let mut string_start = 0;
		// Last significant code character and the identifier it ends, if any.
		let mut last: Option<char> = None;
		let mut word = String::new();
		let mut word_open = false;

		let blank = |out: &mut String, c: char| {
			if c == '\n' {
				out.push('\n');
			} else {
				out.extend(std::iter::repeat_n(' ', c.len_utf8()));
			}
		};

		while let Some(c) = chars.next() {
			match state {
				Lex::Code => match c {
					'/' if chars.peek() == Some(&'/') => {
						chars.next();
						out.push_str("  ");
						state = Lex::LineComment;
					}
					'/' if chars.peek() == Some(&'*') => {
						chars.next();
						out.push_str("  ");
						state = Lex::BlockComment;
					}
					'/' if regex_allowed(last, &word) => {
						out.push(' ');
						state = Lex::Regex { in_class: false };
					}
					'"' | '\'' => {
						word_open = false;
						string_start = out.len();
						out.push(c);
						state = Lex::Quoted(c);
					}
					'`' => {
						out.push(' ');
						state = Lex::Template;
					}
					_ => {
						out.push(c);
						if is_ident(c) {
							if !word_open {
								word.clear();
							}
							word.push(c);
							word_open = true;
							last = Some(c);
						} else {
							word_open = false;
							if !c.is_whitespace() {
								last = Some(c);
							}
						}
					}
				},
				Lex::LineComment => {
					blank(&mut out, c);
					if c == '\n' {
						state = Lex::Code;
					}
				}
				Lex::BlockComment => {
					if c == '*' && chars.peek() == Some(&'/') {
						chars.next();
						out.push_str("  ");
						state = Lex::Code;
					} else {
						blank(&mut out, c);
					}
				}
				Lex::Quoted(quote) => {
					out.push(c);
					if c == '\\' {
						if let Some(escaped) = chars.next() {
							out.push(escaped);
						}
					} else if c == quote || c == '\n' {
						strings.push(string_start..out.len());
						last = Some(quote);
						word_open = false;
						state = Lex::Code;
					}
				}
				Lex::Template => {
					if c == '\\' {
						blank(&mut out, c);
						if let Some(escaped) = chars.next() {
							blank(&mut out, escaped);
						}
					} else if c == '`' {
						out.push(' ');
						last = Some('`');
						word_open = false;
						state = Lex::Code;
					} else {
						blank(&mut out, c);
					}
				}
				Lex::Regex { in_class } => {
					blank(&mut out, c);
					match c {
						'\\' => {
							if let Some(escaped) = chars.next() {
								blank(&mut out, escaped);
							}
						}
						'[' => state = Lex::Regex { in_class: true },
						']' => state = Lex::Regex { in_class: false },
						'/' if !in_class => {
							// Flags follow; the literal ends an expression like `)` does.
							last = Some(')');
							word_open = false;
							state = Lex::Code;
						}
						'\n' => state = Lex::Code,
						_ => {}
					}
				}
			}
		}

		if let Lex::Quoted(_) = state {
			strings.push(string_start..out.len());
		}

		Self { text: out, strings }
	}

	fn in_string(&self, offset: usize) -> bool {
		self.strings.iter().any(|range| range.contains(&offset))
	}
}

fn is_ident(c: char) -> bool {
	c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether a `/` after `last` opens a regex literal: at the start of the text,
/// after an operator or opening punctuation, or after a keyword such as `return`.
fn regex_allowed(last: Option<char>, word: &str) -> bool {
	match last {
		None => true,
		Some(c) if is_ident(c) => REGEX_PREFIX_KEYWORDS.contains(&word),
		Some(')' | ']' | '"' | '\'' | '`') => false,
		Some(_) => true,
	}
}

/// Path rewriting rules used by [`ImportResolver`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
	/// Alias prefix → project-relative prefix, tried in order.
	pub aliases: Vec<(String, String)>,
	/// Prefixes that mark a specifier as already project-relative.
	pub root_prefixes: Vec<String>,
	/// Extensions tried when the specifier omits one, with leading dot.
	pub extensions: Vec<String>,
}

impl Default for ResolverConfig {
	fn default() -> Self {
		Self {
			aliases: vec![
				("@/".into(), "src/".into()),
				("~/".into(), "src/".into()),
			],
			root_prefixes: vec!["src/".into()],
			extensions: [".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".vue", ".svelte"]
				.into_iter()
				.map(String::from)
				.collect(),
		}
	}
}

/// Paths of every file in a batch, in sorted order.
#[derive(Clone, Debug, Default)]
pub struct KnownPaths(BTreeSet<String>);

impl KnownPaths {
	/// Whether `path` is in the batch.
	pub fn contains(&self, path: &str) -> bool {
		self.0.contains(path)
	}

	/// Iterate in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}
}

impl<S: Into<String>> FromIterator<S> for KnownPaths {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self(iter.into_iter().map(Into::into).collect())
	}
}

/// Resolves raw specifiers to files of the batch.
#[derive(Clone, Debug, Default)]
pub struct ImportResolver {
	config: ResolverConfig,
}

impl ImportResolver {
	/// Resolver with the given rules.
	pub fn new(config: ResolverConfig) -> Self {
		Self { config }
	}

	/// Resolve `raw` as imported from `from_path`. Bare package specifiers and
	/// targets missing from `known` give `None`.
	pub fn resolve(&self, from_path: &str, raw: &str, known: &KnownPaths) -> Option<String> {
		let candidate = self.candidate(from_path, raw.trim())?;
		self.match_known(&candidate, known)
	}

	/// Project-relative candidate path for a specifier, before extension inference.
	fn candidate(&self, from_path: &str, raw: &str) -> Option<String> {
		let expanded = self
			.config
			.aliases
			.iter()
			.find(|(alias, _)| raw.starts_with(alias.as_str()))
			.map(|(alias, target)| format!("{target}{}", &raw[alias.len()..]))
			.unwrap_or_else(|| raw.to_string());

		if expanded.starts_with('.') {
			Some(join_relative(from_path, &expanded))
		} else if let Some(stripped) = expanded.strip_prefix('/') {
			Some(stripped.trim_start_matches('/').to_string())
		} else if self
			.config
			.root_prefixes
			.iter()
			.any(|prefix| expanded.starts_with(prefix.as_str()))
		{
			Some(expanded)
		} else {
			None
		}
	}

	fn match_known(&self, candidate: &str, known: &KnownPaths) -> Option<String> {
		let candidate = candidate.trim_end_matches('/');

		if known.contains(candidate) {
			return Some(candidate.to_string());
		}

		let exts = &self.config.extensions;
		let with_ext = exts.iter().map(|ext| format!("{candidate}{ext}"));
		let as_index = exts.iter().map(|ext| {
			if candidate.is_empty() {
				format!("index{ext}")
			} else {
				format!("{candidate}/index{ext}")
			}
		});
		if let Some(hit) = with_ext.chain(as_index).find(|p| known.contains(p)) {
			return Some(hit);
		}

		if candidate.is_empty() {
			return None;
		}
		substring_fallback(candidate, known)
	}
}

/// Any known path containing the candidate. Hits where the candidate ends on a
/// segment or extension boundary win over arbitrary substrings.
fn substring_fallback(candidate: &str, known: &KnownPaths) -> Option<String> {
	let mut loose = None;
	for path in known.iter() {
		for (idx, _) in path.match_indices(candidate) {
			let rest = &path[idx + candidate.len()..];
			if rest.is_empty() || rest.starts_with('.') || rest.starts_with('/') {
				return Some(path.to_string());
			}
			if loose.is_none() {
				loose = Some(path.to_string());
			}
		}
	}
	loose
}

/// Join a `.`-relative specifier onto the directory of `from_path`.
fn join_relative(from_path: &str, relative: &str) -> String {
	let mut segments: Vec<&str> = from_path.split('/').collect();
	segments.pop();
	segments.retain(|s| !s.is_empty());

	for part in relative.split('/') {
		match part {
			"" | "." => {}
			".." => {
				segments.pop();
			}
			other => segments.push(other),
		}
	}
	segments.join("/")
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn known(paths: &[&str]) -> KnownPaths {
		paths.iter().copied().collect()
	}

	#[test]
	fn extracts_common_shapes_in_order() {
		let src = r#"
import React from 'react';
import * as api from "../services/api";
import { a, b } from './a';
import type { T } from './types';
import './side-effect.css';
export { x } from "./x";
import {
	one,
	two,
} from '@/multi';
import React2 from 'react';
"#;
		assert_eq!(
			extract_imports(src),
			vec![
				"react",
				"../services/api",
				"./a",
				"./types",
				"./side-effect.css",
				"./x",
				"@/multi",
			]
		);
	}

	#[test]
	fn ignores_comments_and_templates() {
		let src = r#"
// import nope from './commented';
/* import also from './block'; */
const doc = `import fake from './template'`;
import real from "./real";
"#;
		assert_eq!(extract_imports(src), vec!["./real"]);
	}

	#[test]
	fn url_in_string_is_not_a_comment() {
		let src = "const u = 'http://x.y/z'; import a from './a';";
		assert_eq!(extract_imports(src), vec!["./a"]);
	}

	#[test]
	fn regex_literals_do_not_open_comments() {
		let src = "const clean = s => s.replace(/\\/*/g, '');\nimport a from './a';\nimport b from './b';";
		assert_eq!(extract_imports(src), vec!["./a", "./b"]);

		let src = "function f(s) { return /\\/*/.test(s); }\nimport a from './a';";
		assert_eq!(extract_imports(src), vec!["./a"]);

		let src = "const re = /[/*]/g;\nimport a from './a';";
		assert_eq!(extract_imports(src), vec!["./a"]);
	}

	#[test]
	fn division_is_not_a_regex() {
		let src = "let n = a / b; // import x from './x'\nimport c from './c';";
		assert_eq!(extract_imports(src), vec!["./c"]);

		let src = "const half = (w + 2) / 2; /* import z from './z' */\nimport c from './c';";
		assert_eq!(extract_imports(src), vec!["./c"]);
	}

	#[test]
	fn import_text_inside_strings_is_ignored() {
		let src = "const help = \"import x from './not-real'\";\nimport real from './real';";
		assert_eq!(extract_imports(src), vec!["./real"]);

		let src = "const s = 'import \"./fake\"';\nimport './real.css';";
		assert_eq!(extract_imports(src), vec!["./real.css"]);
	}

	#[test]
	fn nothing_parseable_gives_empty_list() {
		assert!(extract_imports("just some prose, no statements").is_empty());
		assert!(extract_imports("").is_empty());
		assert!(extract_imports("import from").is_empty());
	}

	#[test]
	fn relative_same_directory() {
		let r = ImportResolver::default();
		assert_eq!(
			r.resolve("src/a/b.x", "./c", &known(&["src/a/c.x"])),
			Some("src/a/c.x".into())
		);
	}

	#[test]
	fn relative_parent_directory() {
		let r = ImportResolver::default();
		assert_eq!(
			r.resolve("src/a/b.x", "../y", &known(&["src/y.x"])),
			Some("src/y.x".into())
		);
	}

	#[test]
	fn alias_with_extension_inference() {
		let r = ImportResolver::default();
		assert_eq!(
			r.resolve("src/pages/p.tsx", "@/utils/helpers", &known(&["src/utils/helpers.x"])),
			Some("src/utils/helpers.x".into())
		);
		assert_eq!(
			r.resolve("src/pages/p.tsx", "@/utils/helpers", &known(&["src/utils/helpers.ts"])),
			Some("src/utils/helpers.ts".into())
		);
	}

	#[test]
	fn bare_specifiers_never_resolve() {
		let r = ImportResolver::default();
		let set = known(&["some-external-package.ts", "node_modules/some-external-package/index.js"]);
		assert_eq!(r.resolve("src/a.ts", "some-external-package", &set), None);
		assert_eq!(r.resolve("src/a.ts", "react", &known(&[])), None);
	}

	#[test]
	fn priority_order() {
		let r = ImportResolver::default();
		let set = known(&["src/ui", "src/ui.ts", "src/ui/index.ts", "lib/src/ui.tsx"]);
		assert_eq!(r.resolve("src/a.ts", "./ui", &set), Some("src/ui".into()));

		let set = known(&["src/ui.ts", "src/ui/index.ts"]);
		assert_eq!(r.resolve("src/a.ts", "./ui", &set), Some("src/ui.ts".into()));

		let set = known(&["src/ui/index.tsx", "app/src/ui.js"]);
		assert_eq!(r.resolve("src/a.ts", "./ui", &set), Some("src/ui/index.tsx".into()));
	}

	#[test]
	fn absolute_and_root_prefixed() {
		let r = ImportResolver::default();
		let set = known(&["src/lib/db.ts"]);
		assert_eq!(r.resolve("x.ts", "/src/lib/db", &set), Some("src/lib/db.ts".into()));
		assert_eq!(r.resolve("x.ts", "src/lib/db", &set), Some("src/lib/db.ts".into()));
	}

	#[test]
	fn fallback_recovers_extra_ancestor_and_prefers_boundaries() {
		let r = ImportResolver::default();
		let set = known(&["project/src/utils/format.ts"]);
		assert_eq!(
			r.resolve("project/src/pages/a.tsx", "@/utils/format", &set),
			Some("project/src/utils/format.ts".into())
		);

		let set = known(&["src/abc.ts", "src/ab.ts"]);
		assert_eq!(r.resolve("x.ts", "src/ab.md", &set), None);
		let set = known(&["src/a/btn-old.ts", "z/src/a/btn.md"]);
		assert_eq!(r.resolve("src/a/x.ts", "./btn", &set), Some("z/src/a/btn.md".into()));
	}

	#[test]
	fn dot_segments_and_popping_past_root() {
		let r = ImportResolver::default();
		let set = known(&["src/a/c.ts", "top.ts"]);
		assert_eq!(r.resolve("src/a/b/d.ts", ".././c", &set), Some("src/a/c.ts".into()));
		assert_eq!(r.resolve("src/a.ts", "../../../top", &set), Some("top.ts".into()));
	}

	#[test]
	fn directory_import_from_root() {
		let r = ImportResolver::default();
		assert_eq!(
			r.resolve("main.ts", "./", &known(&["index.ts"])),
			Some("index.ts".into())
		);
		assert_eq!(r.resolve("main.ts", "./", &known(&["other.ts"])), None);
	}
}
