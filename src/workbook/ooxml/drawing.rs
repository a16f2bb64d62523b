/*!
 * DrawingML shapes of a worksheet drawing part.
 *
 * Shapes are numbered from 1 in anchor order, which is the order the
 * spreadsheet application lists them in. Each shape maps the five text
 * representations onto its XML:
 *
 * - text frames and WordArt live in `xdr:txBody`
 * - alternative text is the `descr` attribute of `cNvPr`
 * - embedded object text is not stored in the drawing part
 */

use crate::errors::ShapeTextError;
use crate::workbook::{Shape, TextRepresentation};
use super::xml_tree::{Element, Node};

const ANCHORS: [&str; 3] = ["twoCellAnchor", "oneCellAnchor", "absoluteAnchor"];
const SHAPE_KINDS: [&str; 6] = ["sp", "grpSp", "graphicFrame", "cxnSp", "pic", "contentPart"];

/// Child-index paths from the drawing root to each shape, in index order
pub fn shape_paths(root: &Element) -> Vec<Vec<usize>> {
    let mut paths = Vec::new();
    for (i, node) in root.children.iter().enumerate() {
        if let Node::Element(element) = node {
            collect_anchor(element, vec![i], &mut paths);
        }
    }
    paths
}

fn collect_anchor(element: &Element, path: Vec<usize>, paths: &mut Vec<Vec<usize>>) {
    let local = element.local_name();
    if ANCHORS.contains(&local) {
        if let Some(shape_path) = find_shape(element, &path) {
            paths.push(shape_path);
        }
    } else if local == "AlternateContent" {
        if let Some((choice_idx, choice)) = first_choice(element) {
            for (i, node) in choice.children.iter().enumerate() {
                if let Node::Element(inner) = node {
                    let mut inner_path = path.clone();
                    inner_path.extend([choice_idx, i]);
                    collect_anchor(inner, inner_path, paths);
                }
            }
        }
    }
}

/// Path to the shape element held by an anchor
fn find_shape(anchor: &Element, path: &[usize]) -> Option<Vec<usize>> {
    for (i, node) in anchor.children.iter().enumerate() {
        let Node::Element(child) = node else { continue };
        let local = child.local_name();
        if SHAPE_KINDS.contains(&local) {
            let mut found = path.to_vec();
            found.push(i);
            return Some(found);
        }
        if local == "AlternateContent" {
            let (choice_idx, choice) = first_choice(child)?;
            let mut choice_path = path.to_vec();
            choice_path.extend([i, choice_idx]);
            return find_shape(choice, &choice_path);
        }
    }
    None
}

fn first_choice(alternate: &Element) -> Option<(usize, &Element)> {
    alternate.children.iter().enumerate().find_map(|(i, node)| match node {
        Node::Element(e) if e.local_name() == "Choice" => Some((i, e)),
        _ => None,
    })
}

/// Text of a `txBody`: runs and fields joined per paragraph, paragraphs joined by newlines
pub fn body_text(body: &Element) -> String {
    body.elements()
        .filter(|e| e.local_name() == "p")
        .map(|p| {
            let mut line = String::new();
            for item in p.elements() {
                match item.local_name() {
                    "r" | "fld" => {
                        if let Some(t) = item.child("t") {
                            line.push_str(&t.text());
                        }
                    }
                    "br" => line.push('\n'),
                    _ => {}
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace the text of a `txBody`, keeping paragraph and run properties of the
/// first paragraph and run. Each line of `text` becomes one paragraph.
pub fn set_body_text(body: &mut Element, text: &str) {
    let prefix = body.elements()
        .find(|e| e.local_name() == "bodyPr")
        .map(|e| e.prefix().to_string())
        .unwrap_or_else(|| "a:".to_string());

    let first_para = body.children.iter().position(|n| matches!(n, Node::Element(e) if e.local_name() == "p"));
    let template = match first_para {
        Some(idx) => match &body.children[idx] {
            Node::Element(e) => e.clone(),
            _ => Element::new(format!("{}p", prefix)),
        },
        None => Element::new(format!("{}p", prefix)),
    };

    let run_template = template.elements()
        .find(|e| e.local_name() == "r")
        .cloned()
        .unwrap_or_else(|| Element::new(format!("{}r", prefix)));

    let paragraphs: Vec<Node> = text.split('\n')
        .map(|line| {
            let mut para = template.clone();
            para.children.retain(|n| !matches!(n, Node::Element(e) if matches!(e.local_name(), "r" | "fld" | "br")));

            let mut run = run_template.clone();
            match run.child_mut("t") {
                Some(t) => t.set_text(line),
                None => run.children.push(Node::Element(Element::new(format!("{}t", prefix)).with_text(line))),
            }

            let insert_at = para.children.iter()
                .position(|n| matches!(n, Node::Element(e) if e.local_name() == "endParaRPr"))
                .unwrap_or(para.children.len());
            para.children.insert(insert_at, Node::Element(run));
            Node::Element(para)
        })
        .collect();

    let insert_at = first_para.unwrap_or(body.children.len());
    body.children.retain(|n| !matches!(n, Node::Element(e) if e.local_name() == "p"));
    let insert_at = insert_at.min(body.children.len());
    body.children.splice(insert_at..insert_at, paragraphs);
}

/// Live view of one shape element
pub struct DrawingShape<'a> {
    pub(super) element: &'a mut Element,
    pub(super) dirty: &'a mut bool,
    pub(super) index: usize,
}

impl DrawingShape<'_> {
    fn non_visual(&self) -> Option<&Element> {
        self.element.elements()
            .find(|e| e.local_name().starts_with("nv"))
            .and_then(|nv| nv.child("cNvPr"))
    }

    fn non_visual_mut(&mut self) -> Option<&mut Element> {
        self.element.elements_mut()
            .find(|e| e.local_name().starts_with("nv"))
            .and_then(|nv| nv.child_mut("cNvPr"))
    }

    /// Text body of an auto shape
    fn body(&self) -> Option<&Element> {
        if self.element.local_name() != "sp" {
            return None;
        }
        self.element.child("txBody")
    }

    fn body_mut(&mut self) -> Option<&mut Element> {
        if self.element.local_name() != "sp" {
            return None;
        }
        self.element.child_mut("txBody")
    }

    fn is_word_art(&self) -> bool {
        self.body()
            .and_then(|b| b.child("bodyPr"))
            .is_some_and(|pr| pr.child("prstTxWarp").is_some())
    }
}

impl Shape for DrawingShape<'_> {
    fn name(&self) -> String {
        self.non_visual()
            .and_then(|pr| pr.attr("name"))
            .map(|n| n.to_string())
            .unwrap_or_else(|| format!("Shape {}", self.index))
    }

    fn read_text(&self, repr: TextRepresentation) -> Result<String, ShapeTextError> {
        match repr {
            TextRepresentation::RichTextFrame | TextRepresentation::ExtendedTextFrame => {
                self.body().map(body_text).ok_or(ShapeTextError::Absent)
            }
            TextRepresentation::AlternativeText => {
                let pr = self.non_visual().ok_or(ShapeTextError::Absent)?;
                Ok(pr.attr("descr").unwrap_or_default().to_string())
            }
            TextRepresentation::EmbeddedObject => Err(ShapeTextError::Unsupported(
                "embedded object text is not stored in drawing parts".to_string(),
            )),
            TextRepresentation::TextEffect => {
                if !self.is_word_art() {
                    return Err(ShapeTextError::Absent);
                }
                self.body().map(body_text).ok_or(ShapeTextError::Absent)
            }
        }
    }

    fn write_text(&mut self, repr: TextRepresentation, text: &str) -> Result<(), ShapeTextError> {
        match repr {
            TextRepresentation::RichTextFrame => {
                // Classic frames only accept text when they already have some
                let has_text = self.body().map(|b| !body_text(b).is_empty()).ok_or(ShapeTextError::Absent)?;
                if !has_text {
                    return Err(ShapeTextError::NoText);
                }
                let body = self.body_mut().ok_or(ShapeTextError::Absent)?;
                set_body_text(body, text);
            }
            TextRepresentation::ExtendedTextFrame => {
                let body = self.body_mut().ok_or(ShapeTextError::Absent)?;
                set_body_text(body, text);
            }
            TextRepresentation::AlternativeText => {
                let pr = self.non_visual_mut().ok_or(ShapeTextError::Absent)?;
                pr.set_attr("descr", text);
            }
            TextRepresentation::EmbeddedObject => {
                return Err(ShapeTextError::Unsupported(
                    "embedded object text is not stored in drawing parts".to_string(),
                ));
            }
            TextRepresentation::TextEffect => {
                if !self.is_word_art() {
                    return Err(ShapeTextError::Absent);
                }
                let body = self.body_mut().ok_or(ShapeTextError::Absent)?;
                set_body_text(body, text);
            }
        }
        *self.dirty = true;
        Ok(())
    }
}
