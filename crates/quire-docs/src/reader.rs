//! Flattening a content tree into linear text.

use crate::tree::{Block, ContentTree, TableRow};

const TABLE_OPEN: &str = "[TABLE]";
const TABLE_CLOSE: &str = "[/TABLE]";
const CELL_SEPARATOR: &str = " | ";

/// Flatten a content tree into a single string.
///
/// Paragraph runs are concatenated with no separator. Tables become a
/// `[TABLE]` line, one line per row with cells joined by ` | `, and a
/// closing `[/TABLE]` line. The result is trimmed.
pub fn extract_text(tree: &ContentTree) -> String {
    let mut out = String::new();
    walk_blocks(&tree.blocks, &mut out);
    out.trim().to_string()
}

fn walk_blocks(blocks: &[Block], out: &mut String) {
    for block in blocks {
        match block {
            Block::SectionBreak { .. } => {}
            Block::Paragraph(paragraph) => {
                for run in &paragraph.runs {
                    out.push_str(&run.text);
                }
            }
            Block::Table(table) => {
                start_line(out);
                out.push_str(TABLE_OPEN);
                out.push('\n');
                for row in &table.rows {
                    out.push_str(&row_text(row));
                    out.push('\n');
                }
                out.push_str(TABLE_CLOSE);
                out.push('\n');
            }
        }
    }
}

fn row_text(row: &TableRow) -> String {
    row.cells
        .iter()
        .map(|cell| {
            let mut text = String::new();
            walk_blocks(&cell.content, &mut text);
            text.trim().to_string()
        })
        .collect::<Vec<_>>()
        .join(CELL_SEPARATOR)
}

// Markers always begin on a fresh line.
fn start_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Paragraph, Run, Table, TableCell};

    fn table(rows: &[&[&str]]) -> Block {
        Block::Table(Table {
            rows: rows
                .iter()
                .map(|cells| TableRow {
                    cells: cells.iter().map(|c| TableCell::text(*c)).collect(),
                })
                .collect(),
            end_index: 0,
        })
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(extract_text(&ContentTree::default()), "");
    }

    #[test]
    fn test_runs_join_without_separator() {
        let para = Paragraph {
            runs: vec![Run::new("Hel"), Run::new("lo "), Run::new("world\n")],
            end_index: 13,
            ..Paragraph::default()
        };
        let tree = ContentTree::new(vec![
            Block::SectionBreak { end_index: 1 },
            Block::Paragraph(para),
        ]);
        assert_eq!(extract_text(&tree), "Hello world");
    }

    #[test]
    fn test_table_flattening() {
        let tree = ContentTree::new(vec![table(&[&["a", "b"], &["c", "d"]])]);
        assert_eq!(extract_text(&tree), ["[TABLE]", "a | b", "c | d", "[/TABLE]"].join("\n"));
    }

    #[test]
    fn test_table_between_paragraphs() {
        let tree = ContentTree::new(vec![
            Block::Paragraph(Paragraph::plain("Intro", 6)),
            table(&[&["x", "y"]]),
            Block::Paragraph(Paragraph::plain("Outro\n", 30)),
        ]);
        assert_eq!(extract_text(&tree), "Intro\n[TABLE]\nx | y\n[/TABLE]\nOutro");
    }

    #[test]
    fn test_cell_text_is_trimmed_and_recursive() {
        let inner = table(&[&["deep"]]);
        let cell = TableCell {
            content: vec![
                Block::Paragraph(Paragraph::plain("  padded  \n", 0)),
                inner,
            ],
        };
        let tree = ContentTree::new(vec![Block::Table(Table {
            rows: vec![TableRow { cells: vec![cell, TableCell::text("z")] }],
            end_index: 0,
        })]);
        let text = extract_text(&tree);
        assert!(text.starts_with("[TABLE]\npadded  \n[TABLE]\ndeep\n[/TABLE] | z"));
        assert!(text.ends_with("[/TABLE]"));
    }

    #[test]
    fn test_empty_cells_and_rows() {
        let tree = ContentTree::new(vec![Block::Table(Table {
            rows: vec![
                TableRow { cells: vec![TableCell::default(), TableCell::text("b")] },
                TableRow::default(),
            ],
            end_index: 0,
        })]);
        assert_eq!(extract_text(&tree), "[TABLE]\n | b\n\n[/TABLE]");
    }
}
