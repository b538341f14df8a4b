//! Attribute extraction from detail-page content blocks.
//!
//! A detail page carries an ordered run of `.locationAttribute` blocks.
//! Each block's meaning comes from an explicit `.label` marker when one
//! exists; otherwise position decides — the first block is taken as the
//! address, the second as the description. Pages that have neither an
//! address nor a description block (some outdoor spots are pure prose)
//! fall back to treating the whole page's paragraphs as the description.

use crate::models::{Accessibility, Attributes, Link};
use crate::scrapers::element_text;
use scraper::{ElementRef, Selector};

/// Extract the semantic fields from a detail page's attribute blocks.
///
/// Blocks with labels outside the recognized set are ignored. The label
/// for each block is resolved exactly once, before dispatch, so the
/// positional defaults cannot leak between blocks.
pub fn extract(blocks: &[ElementRef]) -> Attributes {
    let label_selector = Selector::parse(".label").unwrap();
    let item_selector = Selector::parse(".buildingAttributes li").unwrap();
    let floor_selector = Selector::parse(".buildingFloors a").unwrap();
    let link_selector = Selector::parse(".buildingAttributes a").unwrap();
    let paragraph_selector = Selector::parse("p").unwrap();

    let mut attrs = Attributes::default();

    for (index, block) in blocks.iter().enumerate() {
        let label = match block.select(&label_selector).next() {
            Some(marker) => element_text(&marker)
                .to_lowercase()
                .trim_matches(':')
                .to_string(),
            None => match index {
                0 => "address".to_string(),
                1 => "description".to_string(),
                _ => continue,
            },
        };

        match label.as_str() {
            "address" => {
                let items: Vec<ElementRef> = block.select(&item_selector).collect();
                attrs.address = items.first().map(element_text);
                // A second list item, when present, states accessibility.
                if items.len() == 2 {
                    attrs.accessibility = Accessibility::from_label(&element_text(&items[1]));
                }
            }
            "floors" => attrs.floors = links(block, &floor_selector),
            "offices" => attrs.offices = links(block, &link_selector),
            "departments" => attrs.departments = links(block, &link_selector),
            "description" => attrs.description = paragraphs(block, &paragraph_selector),
            _ => {}
        }
    }

    if attrs.address.is_none() && attrs.description.is_empty() {
        attrs.description = blocks
            .iter()
            .flat_map(|block| {
                block
                    .select(&paragraph_selector)
                    .map(|p| element_text(&p))
                    .collect::<Vec<String>>()
            })
            .collect::<Vec<String>>()
            .join("\n\n");
    }

    attrs
}

fn links(block: &ElementRef, selector: &Selector) -> Vec<Link> {
    block
        .select(selector)
        .map(|anchor| Link {
            label: element_text(&anchor),
            href: anchor.value().attr("href").unwrap_or_default().to_string(),
        })
        .collect()
}

fn paragraphs(block: &ElementRef, selector: &Selector) -> String {
    block
        .select(selector)
        .map(|p| element_text(&p))
        .collect::<Vec<String>>()
        .join("\n\n")
}
