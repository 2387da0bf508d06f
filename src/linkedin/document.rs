// src/linkedin/document.rs
//! Read-only view over a rendered profile page snapshot.

use super::experience::Fragment;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

const HEADLINE_SELECTOR: &str = ".text-body-medium.break-words";
const DETAILS_ITEMS_SELECTOR: &str = ".scaffold-finite-scroll__content > ul > li";
const EXPERIENCE_ANCHOR_SELECTOR: &str = "#experience";
const EXPERIENCE_CARD_SELECTOR: &str = r#"[data-view-name="profile-card"][aria-label*="Experience"]"#;
const SUB_COMPONENTS_SELECTOR: &str = ".pvs-entity__sub-components";
const BOLD_HEADER_SELECTOR: &str =
    r#"div.display-flex.align-items-center.mr1.hoverable-link-text.t-bold > span[aria-hidden="true"]"#;
const CAPTION_SELECTOR: &str = ".pvs-entity__caption-wrapper";
const VISIBLE_SPAN_SELECTOR: &str = r#"span[aria-hidden="true"]"#;
const POSITION_DESCRIPTION_SELECTOR: &str = ".inline-show-more-text";
const ENTITY_CONTENT_SELECTOR: &str = r#"[data-view-name="profile-component-entity-content"]"#;

pub struct ProfileDocument {
    location: String,
    html: Html,
}

impl ProfileDocument {
    pub fn parse(location: &str, html: &str) -> Self {
        Self {
            location: location.to_string(),
            html: Html::parse_document(html),
        }
    }

    /// URL the snapshot was taken from
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_experience_details_page(&self) -> bool {
        self.location.contains("/details/experience/")
    }

    /// Trimmed text of every `h1`, in document order
    pub fn headings(&self) -> Vec<String> {
        self.select_texts(self.html.root_element(), "h1")
    }

    /// Text of the `<title>` element
    pub fn title(&self) -> Option<String> {
        self.first_text(self.html.root_element(), "title")
    }

    pub fn headline(&self) -> Option<String> {
        self.first_text(self.html.root_element(), HEADLINE_SELECTOR)
    }

    /// One fragment per experience list item, in document order
    pub fn experience_fragments(&self) -> Vec<Fragment> {
        let items = if self.is_experience_details_page() {
            self.details_items()
        } else {
            self.main_page_items()
        };
        debug!("Found {} experience items", items.len());
        items.into_iter().map(|item| self.fragment_from(item)).collect()
    }

    fn details_items(&self) -> Vec<ElementRef<'_>> {
        let Some(selector) = parse_selector(DETAILS_ITEMS_SELECTOR) else {
            return Vec::new();
        };
        let items = self
            .html
            .select(&selector)
            .filter(|item| !element_text(*item).is_empty())
            .collect();
        items
    }

    fn main_page_items(&self) -> Vec<ElementRef<'_>> {
        let Some(section) = self.experience_section() else {
            warn!("No experience section found on {}", self.location);
            return Vec::new();
        };

        // direct `ul > li` and `div > ul > li` below the section
        let mut items = Vec::new();
        for child in child_elements(section) {
            match child.value().name() {
                "ul" => items.extend(child_elements_named(child, "li")),
                "div" => {
                    for list in child_elements_named(child, "ul") {
                        items.extend(child_elements_named(list, "li"));
                    }
                }
                _ => {}
            }
        }
        items
    }

    fn experience_section(&self) -> Option<ElementRef<'_>> {
        let anchored = parse_selector(EXPERIENCE_ANCHOR_SELECTOR).and_then(|selector| {
            let anchor = self.html.select(&selector).next()?;
            // outermost enclosing section, as a document-order `section:has(#experience)` would find
            (*anchor)
                .ancestors()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "section")
                .last()
        });

        anchored.or_else(|| {
            let selector = parse_selector(EXPERIENCE_CARD_SELECTOR)?;
            let card = self.html.select(&selector).next();
            card
        })
    }

    fn fragment_from(&self, item: ElementRef<'_>) -> Fragment {
        let sub_positions = self
            .first_element(item, SUB_COMPONENTS_SELECTOR)
            .map(|sub_components| {
                child_elements_named(sub_components, "ul")
                    .flat_map(|list| child_elements_named(list, "li"))
                    .map(|position| Fragment {
                        header: self.first_text(position, BOLD_HEADER_SELECTOR),
                        caption: self.first_text(position, CAPTION_SELECTOR),
                        spans: self.select_texts(position, VISIBLE_SPAN_SELECTOR),
                        description: self.first_text(position, POSITION_DESCRIPTION_SELECTOR),
                        sub_positions: None,
                    })
                    .collect()
            });

        Fragment {
            header: self.first_text(item, BOLD_HEADER_SELECTOR),
            caption: self.first_text(item, CAPTION_SELECTOR),
            spans: self.select_texts(item, VISIBLE_SPAN_SELECTOR),
            description: self.first_text(item, ENTITY_CONTENT_SELECTOR),
            sub_positions,
        }
    }

    fn first_element<'a>(&self, scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
        let selector = parse_selector(css)?;
        let found = scope.select(&selector).next();
        found
    }

    fn first_text(&self, scope: ElementRef<'_>, css: &str) -> Option<String> {
        self.first_element(scope, css).map(element_text)
    }

    fn select_texts(&self, scope: ElementRef<'_>, css: &str) -> Vec<String> {
        let Some(selector) = parse_selector(css) else {
            return Vec::new();
        };
        let texts = scope
            .select(&selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect();
        texts
    }
}

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Invalid selector {}: {:?}", css, e);
            None
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn child_elements(parent: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    (*parent).children().filter_map(ElementRef::wrap)
}

fn child_elements_named<'a>(
    parent: ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    child_elements(parent).filter(move |el| el.value().name() == name)
}
