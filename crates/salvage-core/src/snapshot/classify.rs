use std::fmt;

/// Destination subdirectory for a recovered source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ViewModels,
    Views,
    App,
    Authentication,
    Models,
    Services,
    Utils,
}

impl Category {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::ViewModels => "ViewModels",
            Category::Views => "Views",
            Category::App => "App",
            Category::Authentication => "Authentication",
            Category::Models => "Models",
            Category::Services => "Services",
            Category::Utils => "Utils",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A name matches when it contains any of `any_of` and none of `none_of`.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: Category,
    pub any_of: &'static [&'static str],
    pub none_of: &'static [&'static str],
}

impl CategoryRule {
    pub fn matches(&self, file_name: &str) -> bool {
        self.any_of.iter().any(|s| file_name.contains(s))
            && !self.none_of.iter().any(|s| file_name.contains(s))
    }
}

/// Evaluated top to bottom; the first matching rule wins.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::ViewModels,
        any_of: &["ViewModel"],
        none_of: &[],
    },
    CategoryRule {
        category: Category::Views,
        any_of: &["View", "Screen"],
        none_of: &[],
    },
    CategoryRule {
        category: Category::App,
        any_of: &["App"],
        none_of: &[],
    },
    CategoryRule {
        category: Category::Authentication,
        any_of: &["Auth"],
        none_of: &["View"],
    },
    CategoryRule {
        category: Category::Models,
        any_of: &["Type", "Model", "Pin"],
        none_of: &[],
    },
    CategoryRule {
        category: Category::Services,
        any_of: &["Manager", "Service", "State"],
        none_of: &[],
    },
];

pub const FALLBACK_CATEGORY: Category = Category::Utils;

pub fn classify_with(rules: &[CategoryRule], file_name: &str) -> Category {
    rules
        .iter()
        .find(|rule| rule.matches(file_name))
        .map(|rule| rule.category)
        .unwrap_or(FALLBACK_CATEGORY)
}

pub fn classify_filename(file_name: &str) -> Category {
    classify_with(CATEGORY_RULES, file_name)
}
