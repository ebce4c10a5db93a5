//! Block addressing over the raw body tree
//!
//! The extractor and the reinjector must agree on block IDs exactly, so both
//! derive them from the same walk: every element child of `w:body` advances the
//! block index, every `w:tbl` advances the table ordinal, and table cells are
//! addressed per grid position.

use crate::error::{Error, Result};
use crate::ooxml::XmlElement;

use super::models::BlockAddress;
use super::parsing::table::{CellPosition, build_grid};

/// Where an addressed block lives relative to `w:body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockLocation {
    /// `child` is the 0-based index among the body's element children
    Paragraph { child: usize },
    Cell { child: usize, position: CellPosition },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AddressedBlock {
    pub address: BlockAddress,
    pub location: BlockLocation,
}

pub(crate) fn document_body(root: &XmlElement) -> Result<&XmlElement> {
    root.child("w:body")
        .ok_or_else(|| Error::InvalidPackage("document has no w:body".to_string()))
}

pub(crate) fn document_body_mut(root: &mut XmlElement) -> Result<&mut XmlElement> {
    root.child_mut("w:body")
        .ok_or_else(|| Error::InvalidPackage("document has no w:body".to_string()))
}

/// Address every paragraph and every table grid position of the body.
pub(crate) fn address_blocks(body: &XmlElement) -> Vec<AddressedBlock> {
    let mut blocks = Vec::new();
    let mut table_ordinal = 0;

    for (child, element) in body.elements().enumerate() {
        match element.name.as_str() {
            "w:p" => blocks.push(AddressedBlock {
                address: BlockAddress::Paragraph {
                    block_index: child + 1,
                },
                location: BlockLocation::Paragraph { child },
            }),
            "w:tbl" => {
                table_ordinal += 1;
                let grid = build_grid(element);
                for (row, slots) in grid.rows.iter().enumerate() {
                    for (col, slot) in slots.iter().enumerate() {
                        let Some(position) = slot else { continue };
                        blocks.push(AddressedBlock {
                            address: BlockAddress::Cell {
                                table: table_ordinal,
                                row: row + 1,
                                col: col + 1,
                            },
                            location: BlockLocation::Cell {
                                child,
                                position: *position,
                            },
                        });
                    }
                }
            }
            _ => {}
        }
    }

    blocks
}

/// Resolve a location to the `w:p` or `w:tc` element it names.
pub(crate) fn resolve_mut(body: &mut XmlElement, location: BlockLocation) -> Option<&mut XmlElement> {
    match location {
        BlockLocation::Paragraph { child } => body.elements_mut().nth(child),
        BlockLocation::Cell { child, position } => body
            .elements_mut()
            .nth(child)?
            .nth_child_named_mut("w:tr", position.row)?
            .nth_child_named_mut("w:tc", position.cell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::XmlDocument;

    #[test]
    fn test_every_body_child_advances_the_index() {
        let body = XmlDocument::parse(
            "<w:body><w:p/><w:bookmarkStart/><w:p/>\
             <w:tbl><w:tr><w:tc><w:p/></w:tc><w:tc><w:p/></w:tc></w:tr></w:tbl>\
             <w:p/><w:sectPr/></w:body>",
        )
        .unwrap()
        .root;

        let ids: Vec<String> = address_blocks(&body)
            .iter()
            .map(|block| block.address.to_string())
            .collect();
        assert_eq!(ids, ["p:1", "p:3", "t1:r1:c1", "t1:r1:c2", "p:5"]);
    }

    #[test]
    fn test_resolve_cell_location() {
        let mut body = XmlDocument::parse(
            "<w:body><w:tbl><w:tr><w:tc><w:p/></w:tc><w:tc x=\"second\"/></w:tr></w:tbl></w:body>",
        )
        .unwrap()
        .root;

        let target = address_blocks(&body)
            .into_iter()
            .find(|block| block.address.to_string() == "t1:r1:c2")
            .unwrap();
        let cell = resolve_mut(&mut body, target.location).unwrap();
        assert_eq!(cell.attr("x"), Some("second"));
    }
}
