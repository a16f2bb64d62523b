/*!
 * Common test utilities for the sheetwai test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

use sheetwai::app_config::Config;
use sheetwai::providers::mock::MockProvider;
use sheetwai::translation::{SystemPrompt, TranslationService};
use sheetwai::workbook::{CellAddress, HostFactory};
use sheetwai::Controller;

/// Route library logs through the test harness; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Config whose input and output directories live under `root`
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.input_dir = root.join("input");
    config.output_dir = root.join("output");
    config.translation.common.system_prompt_file = root.join("prompt.txt");
    config
}

/// Controller wired to a mock provider and the given host factory
pub fn mock_controller(config: Config, mock: MockProvider, hosts: Arc<dyn HostFactory>) -> Controller {
    let translator = TranslationService::with_mock(mock, SystemPrompt::default());
    Controller::new(config, translator, hosts)
}

/// A cell of a generated worksheet
#[derive(Debug, Clone)]
pub enum FixtureCell {
    /// Shared string with a bold style index
    Text(&'static str),
    Number(f64),
    /// Formula with its cached result
    Formula(&'static str, f64),
}

#[derive(Debug, Clone)]
struct FixtureSheet {
    name: String,
    cells: Vec<(CellAddress, FixtureCell)>,
    drawing: Option<String>,
}

/// Minimal `.xlsx` writer: workbook, shared strings, worksheets and optional drawings
#[derive(Debug, Clone, Default)]
pub struct XlsxBuilder {
    sheets: Vec<FixtureSheet>,
}

impl XlsxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet; cells are given in A1 notation
    pub fn sheet(mut self, name: &str, cells: &[(&str, FixtureCell)]) -> Self {
        let mut parsed: Vec<(CellAddress, FixtureCell)> = cells.iter()
            .map(|(address, cell)| (address.parse().expect("valid fixture address"), cell.clone()))
            .collect();
        parsed.sort_by_key(|(address, _)| *address);
        self.sheets.push(FixtureSheet {
            name: name.to_string(),
            cells: parsed,
            drawing: None,
        });
        self
    }

    /// Attach a drawing with the given anchors to the last sheet
    pub fn drawing(mut self, anchors: &[String]) -> Self {
        if let Some(sheet) = self.sheets.last_mut() {
            sheet.drawing = Some(drawing_xml(anchors));
        }
        self
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut shared: Vec<&'static str> = Vec::new();
        let mut zip = ZipWriter::new(File::create(path)?);
        let options = FileOptions::default();

        let mut content_types = String::from(concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
        ));
        let mut workbook_sheets = String::new();
        let mut workbook_rels = String::new();

        for (i, sheet) in self.sheets.iter().enumerate() {
            let n = i + 1;
            content_types.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            ));
            workbook_sheets.push_str(&format!(r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#, sheet.name));
            workbook_rels.push_str(&format!(
                r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
            ));

            let sheet_xml = worksheet_xml(sheet, &mut shared);
            zip.start_file(format!("xl/worksheets/sheet{n}.xml"), options)?;
            zip.write_all(sheet_xml.as_bytes())?;

            if let Some(drawing) = &sheet.drawing {
                content_types.push_str(&format!(
                    r#"<Override PartName="/xl/drawings/drawing{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/>"#
                ));
                zip.start_file(format!("xl/worksheets/_rels/sheet{n}.xml.rels"), options)?;
                zip.write_all(relationships_xml(&format!(
                    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing{n}.xml"/>"#
                )).as_bytes())?;
                zip.start_file(format!("xl/drawings/drawing{n}.xml"), options)?;
                zip.write_all(drawing.as_bytes())?;
            }
        }
        content_types.push_str("</Types>");

        let shared_rel_id = self.sheets.len() + 1;
        workbook_rels.push_str(&format!(
            r#"<Relationship Id="rId{shared_rel_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#
        ));

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(content_types.as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(relationships_xml(
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
        ).as_bytes())?;

        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
                r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
                "<sheets>{}</sheets></workbook>"
            ),
            workbook_sheets
        ).as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(relationships_xml(&workbook_rels).as_bytes())?;

        let items: String = shared.iter().map(|s| format!("<si><t>{}</t></si>", s)).collect();
        zip.start_file("xl/sharedStrings.xml", options)?;
        zip.write_all(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{1}</sst>"#,
            shared.len(),
            items
        ).as_bytes())?;

        zip.finish()?;
        Ok(())
    }
}

fn relationships_xml(entries: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        entries
    )
}

fn worksheet_xml(sheet: &FixtureSheet, shared: &mut Vec<&'static str>) -> String {
    let mut rows = String::new();
    let mut current_row: Option<u32> = None;
    for (address, cell) in &sheet.cells {
        if current_row != Some(address.row) {
            if current_row.is_some() {
                rows.push_str("</row>");
            }
            rows.push_str(&format!(r#"<row r="{}">"#, address.row + 1));
            current_row = Some(address.row);
        }
        match cell {
            FixtureCell::Text(text) => {
                shared.push(*text);
                rows.push_str(&format!(r#"<c r="{}" s="1" t="s"><v>{}</v></c>"#, address, shared.len() - 1));
            }
            FixtureCell::Number(n) => rows.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, address, n)),
            FixtureCell::Formula(f, cached) => {
                rows.push_str(&format!(r#"<c r="{}"><f>{}</f><v>{}</v></c>"#, address, f, cached))
            }
        }
    }
    if current_row.is_some() {
        rows.push_str("</row>");
    }

    let drawing = if sheet.drawing.is_some() { r#"<drawing r:id="rId1"/>"# } else { "" };
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            "<sheetData>{}</sheetData>{}</worksheet>"
        ),
        rows, drawing
    )
}

fn drawing_xml(anchors: &[String]) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" "#,
            r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">{}</xdr:wsDr>"#
        ),
        anchors.concat()
    )
}

fn anchor(body: &str) -> String {
    format!(
        concat!(
            "<xdr:twoCellAnchor>",
            "<xdr:from><xdr:col>1</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>1</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>",
            "<xdr:to><xdr:col>4</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>6</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to>",
            "{}<xdr:clientData/></xdr:twoCellAnchor>"
        ),
        body
    )
}

/// Text box anchor whose single run is bold and centred
pub fn text_box(id: u32, name: &str, text: &str) -> String {
    anchor(&format!(
        concat!(
            r#"<xdr:sp macro="" textlink=""><xdr:nvSpPr><xdr:cNvPr id="{}" name="{}"/><xdr:cNvSpPr txBox="1"/></xdr:nvSpPr>"#,
            "<xdr:spPr/><xdr:txBody><a:bodyPr/><a:lstStyle/>",
            r#"<a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="vi-VN" b="1"/><a:t>{}</a:t></a:r></a:p>"#,
            "</xdr:txBody></xdr:sp>"
        ),
        id, name, text
    ))
}

/// Picture anchor that carries only alternative text
pub fn picture(id: u32, name: &str, descr: &str) -> String {
    anchor(&format!(
        concat!(
            r#"<xdr:pic><xdr:nvPicPr><xdr:cNvPr id="{}" name="{}" descr="{}"/><xdr:cNvPicPr/></xdr:nvPicPr>"#,
            "<xdr:blipFill/><xdr:spPr/></xdr:pic>"
        ),
        id, name, descr
    ))
}

/// Raw bytes of one entry of a ZIP package
pub fn read_part(path: &Path, name: &str) -> Result<String> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut entry = archive.by_name(name)?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(content)
}

/// Names of every entry of a ZIP package, sorted
pub fn part_names(path: &Path) -> Result<Vec<String>> {
    let archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut names: Vec<String> = archive.file_names().map(|n| n.to_string()).collect();
    names.sort();
    Ok(names)
}
