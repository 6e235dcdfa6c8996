//! The animation category catalog.
//!
//! Each category pairs an inclusion selector list with exclusions that carve
//! out regions owned by other choreography (hero, footer, CTA, navbar, menu
//! overlay). Exclusions always win. The selector strings are the site's
//! actual class vocabulary; discovery compiles them once at engine
//! construction.

use std::fmt;

use serde::{Deserialize, Serialize};

use limen_stage_core::{SelectorSet, StageError};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Heading,
    Paragraph,
    Button,
    Footer,
    DropdownArrow,
    Separator,
    Lightbox,
    MediaReveal,
    SocialIconGroup,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Heading,
        Category::Paragraph,
        Category::Button,
        Category::Footer,
        Category::DropdownArrow,
        Category::Separator,
        Category::Lightbox,
        Category::MediaReveal,
        Category::SocialIconGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Heading => "heading",
            Category::Paragraph => "paragraph",
            Category::Button => "button",
            Category::Footer => "footer",
            Category::DropdownArrow => "dropdown-arrow",
            Category::Separator => "separator",
            Category::Lightbox => "lightbox",
            Category::MediaReveal => "media-reveal",
            Category::SocialIconGroup => "social-icons",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog row: what to select and what to carve out.
#[derive(Copy, Clone, Debug)]
pub struct CategoryRule {
    pub category: Category,
    pub include: &'static str,
    pub exclude: &'static [&'static str],
}

/// The full catalog, in registration order.
pub fn catalog() -> [CategoryRule; 9] {
    [
        CategoryRule {
            category: Category::Heading,
            include: ".text-block .heading",
            exclude: &[
                ".section.hero .heading",
                ".section.footer .heading",
                ".cta-block .heading",
                ".menu-overlay-block .heading",
            ],
        },
        CategoryRule {
            category: Category::Paragraph,
            include: ".text-block .text, .text.w-richtext p",
            exclude: &[
                ".text.w-richtext",
                ".section.hero .text",
                ".section.hero .text.w-richtext p",
                ".section.footer .text",
                ".cta-block .text",
                ".button-block .text",
                ".form-wrapper .text",
                ".menu-overlay-block .text",
            ],
        },
        CategoryRule {
            category: Category::Button,
            include: ".button-block",
            exclude: &[
                ".section.hero .button-block",
                ".navbar-block .button-block",
                ".cta-block .button-block",
                ".section.footer .button-block",
                ".back-to-top-wrapper .button-block",
                ".menu-overlay-block .button-block",
            ],
        },
        CategoryRule {
            category: Category::Footer,
            include: ".section.footer",
            exclude: &[],
        },
        CategoryRule {
            category: Category::DropdownArrow,
            include: ".dropdown-arrow-block",
            exclude: &[],
        },
        CategoryRule {
            category: Category::Separator,
            include: ".separator-line",
            exclude: &[
                ".section.hero .separator-line",
                ".navbar-block .separator-line",
            ],
        },
        CategoryRule {
            category: Category::Lightbox,
            include: ".showreel-lightbox-wrapper",
            exclude: &[".menu-overlay-block .showreel-lightbox-wrapper"],
        },
        CategoryRule {
            category: Category::MediaReveal,
            include: ".image-block .image, .video-block",
            exclude: &[],
        },
        CategoryRule {
            category: Category::SocialIconGroup,
            include: ".social-link-list",
            exclude: &[
                ".menu-overlay-block .social-link-list",
                ".section.footer .social-link-list",
            ],
        },
    ]
}

/// Compile the catalog into selector sets, in catalog order.
pub fn compile_catalog() -> Result<Vec<(Category, SelectorSet)>, StageError> {
    catalog()
        .iter()
        .map(|rule| Ok((rule.category, SelectorSet::parse(rule.include, rule.exclude)?)))
        .collect()
}
