//! Path-based file role classification.
//!
//! Rules run in a fixed precedence order and the first match wins. The order
//! matters: a `*.test.tsx` file is not a component (rule 3 excludes test names)
//! and ends up in `Tests` further down the chain.

use super::types::{Category, file_name};

const ROUTING_DIRS: &[&str] = &["pages", "app", "routes"];
const SERVICE_DIRS: &[&str] = &["services", "api"];
const MARKUP_EXTENSIONS: &[&str] = &["tsx", "jsx", "vue", "svelte"];
const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less"];
const SETTINGS_EXTENSIONS: &[&str] = &["json", "yaml", "yml", "toml", "ini", "env"];
const VENDOR_DIRS: &[&str] = &["node_modules", "vendor", "bower_components", ".git", ".svn", ".hg"];

/// Category and importance of one file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
	/// Architectural role.
	pub category: Category,
	/// Centrality score (1-9).
	pub importance: u8,
}

impl From<Category> for Classification {
	fn from(category: Category) -> Self {
		Self {
			category,
			importance: category.importance(),
		}
	}
}

/// Classify a batch-relative path.
pub fn classify(path: &str) -> Classification {
	let path = path.replace('\\', "/");
	let name = file_name(&path).to_ascii_lowercase();
	let dirs: Vec<String> = path
		.split('/')
		.rev()
		.skip(1)
		.map(str::to_ascii_lowercase)
		.collect();
	let ext = extension(&name);

	let in_dir = |set: &[&str]| dirs.iter().any(|d| set.contains(&d.as_str()));
	let name_has = |words: &[&str]| words.iter().any(|w| name.contains(w));
	let is_test_name = name_has(&["test", "spec"]);

	let category = if in_dir(ROUTING_DIRS) || name_has(&["page", "route"]) {
		Category::Page
	} else if in_dir(SERVICE_DIRS) || name_has(&["service", "api"]) {
		Category::Service
	} else if MARKUP_EXTENSIONS.contains(&ext) && !is_test_name {
		Category::Component
	} else if name_has(&["hook", "use", "util", "helper", "lib"]) {
		Category::Utility
	} else if name_has(&["type", "interface"]) || name.ends_with(".d.ts") {
		Category::Types
	} else if STYLE_EXTENSIONS.contains(&ext) || name.contains("style") {
		Category::Styles
	} else if name_has(&["config", "setting"]) || SETTINGS_EXTENSIONS.contains(&ext) {
		Category::Config
	} else if in_dir(VENDOR_DIRS) {
		Category::Dependencies
	} else if is_test_name {
		Category::Tests
	} else {
		Category::Other
	};

	category.into()
}

/// Extension without the dot; dotfiles like `.env` count as their own extension.
fn extension(name: &str) -> &str {
	match name.rfind('.') {
		Some(idx) => &name[idx + 1..],
		None => "",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn category(path: &str) -> Category {
		classify(path).category
	}

	#[test]
	fn routing_and_services() {
		assert_eq!(category("src/pages/Home.tsx"), Category::Page);
		assert_eq!(category("src/checkout-route.ts"), Category::Page);
		assert_eq!(category("src/services/auth.ts"), Category::Service);
		assert_eq!(category("src/lib/apiClient.ts"), Category::Service);
		assert_eq!(classify("src/pages/Home.tsx").importance, 9);
		assert_eq!(classify("src/services/auth.ts").importance, 8);
	}

	#[test]
	fn components_and_utilities() {
		assert_eq!(category("src/components/Button.tsx"), Category::Component);
		assert_eq!(category("src/widgets/Card.vue"), Category::Component);
		assert_eq!(category("src/hooks/useAuth.ts"), Category::Utility);
		assert_eq!(category("src/helpers.js"), Category::Utility);
	}

	#[test]
	fn declarations_styles_config() {
		assert_eq!(category("src/models/types.ts"), Category::Types);
		assert_eq!(category("src/global.d.ts"), Category::Types);
		assert_eq!(category("src/main.scss"), Category::Styles);
		assert_eq!(category("tailwind.config.js"), Category::Config);
		assert_eq!(category("package.json"), Category::Config);
		assert_eq!(category(".env"), Category::Config);
	}

	#[test]
	fn vendor_tests_and_fallback() {
		assert_eq!(category("node_modules/left-pad/index.js"), Category::Dependencies);
		assert_eq!(category(".git/HEAD"), Category::Dependencies);
		assert_eq!(category("src/math.test.ts"), Category::Tests);
		assert_eq!(category("README.md"), Category::Other);
		assert_eq!(classify("README.md").importance, 3);
	}

	#[test]
	fn test_named_component_lands_in_tests() {
		let result = classify("src/components/Button.test.tsx");
		assert_eq!(result.category, Category::Tests);
		assert_eq!(result.importance, 3);
		assert_eq!(category("src/widgets/Card.spec.jsx"), Category::Tests);
	}

	#[test]
	fn directory_match_ignores_file_name() {
		// `pages.md` is a file, not a routing directory, but its name contains "page".
		assert_eq!(category("docs/pages.md"), Category::Page);
		assert_eq!(category("src/app.ts"), Category::Other);
	}

	#[test]
	fn classification_is_deterministic() {
		for path in ["src/pages/a.tsx", "x/y/z.css", "node_modules/q/r.js"] {
			assert_eq!(classify(path), classify(path));
		}
	}
}
